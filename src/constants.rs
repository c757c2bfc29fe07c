// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All flux-related constants *must* be double precision; derived metrics are
computed in `f64` before anything is handed to a plotting backend.
 */

/// Figure category code for the 1D drift plot.
pub const DRIFT_CATEGORY: u8 = 41;

/// Figure category code for the drift-corrected 2D light curve.
pub const LC_2D_CATEGORY: u8 = 42;

/// Figure category code for the per-bandpass 1D light curve.
pub const LC_1D_CATEGORY: u8 = 43;

/// Figure category code for the cross-correlation spectrum comparison.
pub const CC_SPEC_CATEGORY: u8 = 44;

/// Figure category code for the cross-correlation strength plot.
pub const CC_VALS_CATEGORY: u8 = 45;

/// The name of the sub-directory of the output directory that all figures are
/// written into.
pub const FIGS_DIR: &str = "figs";

/// The extension of all figure files.
pub const FIG_EXTENSION: &str = "png";

/// Normalised residuals are scaled by this factor to give parts-per-million.
pub const PPM: f64 = 1e6;

/// Lower colour limit of the normalised 2D light curve.
pub const FLUX_MAP_VMIN: f64 = 0.97;

/// Upper colour limit of the normalised 2D light curve.
pub const FLUX_MAP_VMAX: f64 = 1.03;

/// The default number of pixels per "inch" of figure size. Figure sizes are
/// kept in inches so that the aspect ratio of each category is obvious.
pub const DEFAULT_DPI: u32 = 100;

/// The default cross-correlation drift range [pixels].
pub const DEFAULT_DRIFT_RANGE: usize = 10;
