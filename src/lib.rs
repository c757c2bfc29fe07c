// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Diagnostic figures and derived metrics for spectroscopic light-curve
extraction.

Every figure is named by an [`artifact::ArtifactId`]: a category code and a
zero-padded index, such that all figures sort by category and then by index.
The metrics behind the figures (median normalisation, the median absolute
deviation of light curves, drift partitioning and flux-map normalisation) are
pure functions that don't need a plotting backend.
 */

pub mod artifact;
mod cli;
pub mod constants;
pub mod context;
pub mod diagnostics;
pub mod drift;
pub mod inputs;
pub mod render;
pub mod stats;
pub mod ticks;

use crossbeam_utils::atomic::AtomicCell;

/// Should we display progress bars? This is set by the binary; library users
/// don't get progress bars unless they ask for them.
pub static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use artifact::{ArtifactId, Category, FigureHandle};
pub use cli::{LcDiagnostics, LcDiagnosticsError};
pub use context::RunContext;
pub use diagnostics::{Diagnostics, DiagnosticsReport};
pub use inputs::DiagnosticInputs;
pub use render::{DiagnosticRenderer, DryRunRenderer};
pub use stats::Mad;

#[cfg(feature = "plotting")]
pub use render::BitmapRenderer;
