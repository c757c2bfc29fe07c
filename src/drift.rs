// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splitting spectral drift values into measured and interpolated frames.

use thiserror::Error;

/// One frame's drift value.
pub type DriftPoint = (usize, f64);

/// Drift values split by the drift mask. Both halves keep frame order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftPartition {
    /// Frames where the drift was measured directly (mask is `false`).
    pub good: Vec<DriftPoint>,

    /// Frames where the drift was interpolated or flagged (mask is `true`).
    pub interpolated: Vec<DriftPoint>,
}

impl DriftPartition {
    /// The total number of frames.
    pub fn len(&self) -> usize {
        self.good.len() + self.interpolated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.good.is_empty() && self.interpolated.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriftError {
    #[error("Mismatched shapes: the drift mask has {mask} elements, but there are {drift} drift values")]
    MismatchedShape { drift: usize, mask: usize },
}

/// Split `drift1d` into good and interpolated frames according to
/// `driftmask`.
pub fn partition_drift(drift1d: &[f64], driftmask: &[bool]) -> Result<DriftPartition, DriftError> {
    if drift1d.len() != driftmask.len() {
        return Err(DriftError::MismatchedShape {
            drift: drift1d.len(),
            mask: driftmask.len(),
        });
    }

    let (interpolated, good): (Vec<_>, Vec<_>) = drift1d
        .iter()
        .zip(driftmask)
        .enumerate()
        .partition(|(_, (_, masked))| **masked);
    let strip = |v: Vec<(usize, (&f64, &bool))>| {
        v.into_iter()
            .map(|(i, (&d, _))| (i, d))
            .collect::<Vec<DriftPoint>>()
    };

    Ok(DriftPartition {
        good: strip(good),
        interpolated: strip(interpolated),
    })
}
