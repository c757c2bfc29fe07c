// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spectroscopic channel edges, for annotating the 2D light curve.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    #[error("Mismatched shapes: {low} lower wavelength bounds but {hi} upper wavelength bounds")]
    MismatchedShape { low: usize, hi: usize },
}

/// The sorted, deduplicated union of all channel wavelength bounds. With a
/// single channel there are no subdivisions to show, so this is empty.
/// Non-finite bounds can't be drawn and are dropped.
pub fn channel_edge_ticks(wave_low: &[f64], wave_hi: &[f64]) -> Result<Vec<f64>, TickError> {
    if wave_low.len() != wave_hi.len() {
        return Err(TickError::MismatchedShape {
            low: wave_low.len(),
            hi: wave_hi.len(),
        });
    }
    if wave_low.len() <= 1 {
        return Ok(vec![]);
    }

    let mut ticks = wave_low
        .iter()
        .chain(wave_hi)
        .copied()
        .filter(|w| w.is_finite())
        .collect::<Vec<_>>();
    ticks.sort_unstable_by(f64::total_cmp);
    ticks.dedup();
    Ok(ticks)
}
