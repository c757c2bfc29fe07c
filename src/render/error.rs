// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::artifact::ArtifactError;

#[derive(Error, Debug)]
pub enum DrawError {
    #[cfg(not(feature = "plotting"))]
    #[error("lc_diagnostics was not compiled with the \"plotting\" feature.\nYou need to compile lc_diagnostics from source with this feature to draw figures.")]
    NoPlottingFeature,

    #[error("Figure {handle} is too large to draw at {dpi} pixels per inch")]
    CanvasTooLarge { handle: u64, dpi: u32 },

    #[error("Error from the plotters library: {0}")]
    Plotters(String),

    #[error(transparent)]
    Handle(#[from] ArtifactError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
