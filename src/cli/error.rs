// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all lc-diagnostics-related errors. This should be the *only*
//! error enum that is publicly visible from the command-line interface.

use thiserror::Error;

use super::plot::PlotArgsError;
use crate::{
    artifact::ArtifactError, context::ContextError, diagnostics::DiagnosticError,
    drift::DriftError, inputs::InputError, render::DrawError, stats::StatsError,
    ticks::TickError,
};

/// The *only* publicly visible error from the lc-diagnostics binary.
#[derive(Error, Debug)]
pub enum LcDiagnosticsError {
    /// An error related to argument files.
    #[error("{0}\n\nArgument files must be toml or json, and may contain any of the long-form arguments of the subcommand.")]
    ArgFile(String),

    /// An error related to the diagnostic inputs.
    #[error("{0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv).")]
    Inputs(String),

    /// An error related to the arguments of a run.
    #[error("{0}")]
    Args(String),

    /// An error related to naming or drawing figures.
    #[error("{0}")]
    Plot(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<PlotArgsError> for LcDiagnosticsError {
    fn from(e: PlotArgsError) -> Self {
        match e {
            PlotArgsError::NoInputs
            | PlotArgsError::CountMismatch { .. }
            | PlotArgsError::ZeroDpi => Self::Args(e.to_string()),
            PlotArgsError::Context(e) => Self::from(e),
            PlotArgsError::AllFailed { .. } => Self::Plot(e.to_string()),
            PlotArgsError::Input(e) => Self::from(e),
        }
    }
}

impl From<InputError> for LcDiagnosticsError {
    fn from(e: InputError) -> Self {
        let s = e.to_string();
        match e {
            InputError::UnrecognisedExtension(_) | InputError::Decode { .. } => Self::ArgFile(s),
            InputError::IO(_) => Self::Generic(s),
            _ => Self::Inputs(s),
        }
    }
}

impl From<ContextError> for LcDiagnosticsError {
    fn from(e: ContextError) -> Self {
        Self::Inputs(e.to_string())
    }
}

impl From<StatsError> for LcDiagnosticsError {
    fn from(e: StatsError) -> Self {
        Self::Inputs(e.to_string())
    }
}

impl From<DriftError> for LcDiagnosticsError {
    fn from(e: DriftError) -> Self {
        Self::Inputs(e.to_string())
    }
}

impl From<TickError> for LcDiagnosticsError {
    fn from(e: TickError) -> Self {
        Self::Inputs(e.to_string())
    }
}

impl From<ArtifactError> for LcDiagnosticsError {
    fn from(e: ArtifactError) -> Self {
        Self::Plot(e.to_string())
    }
}

impl From<DrawError> for LcDiagnosticsError {
    fn from(e: DrawError) -> Self {
        let s = e.to_string();
        match e {
            DrawError::IO(_) => Self::Generic(s),
            _ => Self::Plot(s),
        }
    }
}

impl From<DiagnosticError> for LcDiagnosticsError {
    fn from(e: DiagnosticError) -> Self {
        match e {
            DiagnosticError::Artifact(e) => Self::from(e),
            DiagnosticError::Input(e) => Self::from(e),
            DiagnosticError::Stats(e) => Self::from(e),
            DiagnosticError::Drift(e) => Self::from(e),
            DiagnosticError::Ticks(e) => Self::from(e),
            DiagnosticError::Draw(e) => Self::from(e),
        }
    }
}

impl From<std::io::Error> for LcDiagnosticsError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
