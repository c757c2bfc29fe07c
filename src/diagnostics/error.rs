// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{
    artifact::ArtifactError, drift::DriftError, inputs::InputError, render::DrawError,
    stats::StatsError, ticks::TickError,
};

/// Why a single diagnostic figure couldn't be made. None of these stop the
/// rest of a diagnostic pass.
#[derive(Error, Debug)]
pub enum DiagnosticError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error(transparent)]
    Ticks(#[from] TickError),

    #[error(transparent)]
    Draw(#[from] DrawError),
}
