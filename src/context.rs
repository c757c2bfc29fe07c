// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run-wide configuration of a diagnostic pass.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    artifact::{ArtifactError, ArtifactId, Category, IndexDomain},
    constants::FIGS_DIR,
};

/// Configuration that is fixed for a whole pipeline run.
#[derive(Debug, Clone)]
pub struct RunContext {
    nspecchan: usize,
    n_int: usize,
    output_dir: PathBuf,
    hide_plots: bool,
    drift_range: usize,
}

impl RunContext {
    pub fn new(
        nspecchan: usize,
        n_int: usize,
        output_dir: PathBuf,
        hide_plots: bool,
        drift_range: usize,
    ) -> Result<RunContext, ContextError> {
        if nspecchan == 0 {
            return Err(ContextError::NoChannels);
        }
        if n_int == 0 {
            return Err(ContextError::NoIntegrations);
        }

        Ok(RunContext {
            nspecchan,
            n_int,
            output_dir,
            hide_plots,
            drift_range,
        })
    }

    pub fn nspecchan(&self) -> usize {
        self.nspecchan
    }

    pub fn n_int(&self) -> usize {
        self.n_int
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn hide_plots(&self) -> bool {
        self.hide_plots
    }

    pub fn drift_range(&self) -> usize {
        self.drift_range
    }

    pub fn figs_dir(&self) -> PathBuf {
        self.output_dir.join(FIGS_DIR)
    }

    /// The identifier of figure `index` of `category`. Channel figures are
    /// padded according to `nspecchan`, integration figures according to
    /// `n_int`.
    pub fn artifact(&self, category: Category, index: usize) -> Result<ArtifactId, ArtifactError> {
        let count = match category.index_domain() {
            IndexDomain::Channel => self.nspecchan,
            IndexDomain::Integration => self.n_int,
        };
        ArtifactId::new(category, index, count)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("There are no spectroscopic channels; nspecchan must be positive")]
    NoChannels,

    #[error("There are no integrations; n_int must be positive")]
    NoIntegrations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_width_follows_index_domain() {
        let ctx = RunContext::new(5, 250, PathBuf::from("out"), true, 10).unwrap();
        assert_eq!(
            ctx.artifact(Category::LightCurve1D, 3).unwrap().file_name(),
            "Fig433-1D_LC.png"
        );
        assert_eq!(
            ctx.artifact(Category::CcValues, 3).unwrap().file_name(),
            "Fig45003-CC_Vals.png"
        );
        // Channel 5 doesn't exist, but integration 5 does.
        assert!(ctx.artifact(Category::LightCurve1D, 5).is_err());
        assert!(ctx.artifact(Category::CcSpectrum, 5).is_ok());
        assert_eq!(ctx.figs_dir(), PathBuf::from("out/figs"));
    }

    #[test]
    fn test_empty_runs_are_rejected() {
        assert_eq!(
            RunContext::new(0, 1, PathBuf::new(), true, 0).unwrap_err(),
            ContextError::NoChannels
        );
        assert_eq!(
            RunContext::new(1, 0, PathBuf::new(), true, 0).unwrap_err(),
            ContextError::NoIntegrations
        );
    }
}
