// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{ARG_FILE_HELP, DPI_HELP, DRIFT_RANGE_HELP};
use crate::{
    constants::{DEFAULT_DPI, DEFAULT_DRIFT_RANGE},
    context::RunContext,
    diagnostics::{Diagnostics, DiagnosticsReport},
    inputs::DiagnosticInputs,
    render::DryRunRenderer,
    LcDiagnosticsError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PlotArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// Path to the diagnostic inputs (toml or json): channel wavelength
    /// edges, times, light curves and optionally drifts, spectra and
    /// cross-correlation products.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) inputs: Option<PathBuf>,

    /// The directory to write into. Figures are written to its "figs"
    /// sub-directory, which is created if necessary. Default: the current
    /// directory.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output_dir: Option<PathBuf>,

    /// Log written figures at the debug level rather than the info level.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) hide_plots: bool,

    #[clap(long, help = DPI_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) dpi: Option<u32>,

    /// The number of spectroscopic channels. Not required; if given, it must
    /// match the inputs.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    pub(super) nspecchan: Option<usize>,

    /// The number of integrations. Not required; if given, it must match the
    /// inputs.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    pub(super) n_int: Option<usize>,

    #[clap(long, help = DRIFT_RANGE_HELP.as_str(), help_heading = "DIAGNOSTICS")]
    pub(super) drift_range: Option<usize>,

    /// Don't make the cross-correlation figures, even if cross-correlation
    /// products are available.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    #[serde(default)]
    pub(super) skip_cross_correlation: bool,
}

/// Everything needed to make diagnostics, after the arguments have been
/// checked.
pub(super) struct PlotParams {
    pub(super) ctx: RunContext,
    pub(super) inputs: DiagnosticInputs,
    pub(super) skip_cross_correlation: bool,
    pub(super) dpi: u32,
}

impl PlotArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct. Where applicable, it will prefer CLI parameters
    /// over those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<PlotArgs, LcDiagnosticsError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let PlotArgs {
                args_file: _,
                inputs,
                output_dir,
                hide_plots,
                dpi,
                nspecchan,
                n_int,
                drift_range,
                skip_cross_correlation,
            } = unpack_arg_file!(arg_file);

            Ok(PlotArgs {
                args_file: None,
                inputs: cli_args.inputs.or(inputs),
                output_dir: cli_args.output_dir.or(output_dir),
                hide_plots: cli_args.hide_plots || hide_plots,
                dpi: cli_args.dpi.or(dpi),
                nspecchan: cli_args.nspecchan.or(nspecchan),
                n_int: cli_args.n_int.or(n_int),
                drift_range: cli_args.drift_range.or(drift_range),
                skip_cross_correlation: cli_args.skip_cross_correlation
                    || skip_cross_correlation,
            })
        } else {
            Ok(cli_args)
        }
    }

    /// Read the inputs and check them against the arguments.
    pub(super) fn parse(self) -> Result<PlotParams, PlotArgsError> {
        debug!("{:#?}", self);

        let PlotArgs {
            args_file: _,
            inputs,
            output_dir,
            hide_plots,
            dpi,
            nspecchan,
            n_int,
            drift_range,
            skip_cross_correlation,
        } = self;

        let inputs_file = inputs.ok_or(PlotArgsError::NoInputs)?;
        let inputs = DiagnosticInputs::read(&inputs_file)?;
        trace!("Read inputs from {}", inputs_file.display());

        let found_nspecchan = inputs.nspecchan();
        if let Some(expected) = nspecchan {
            if expected != found_nspecchan {
                return Err(PlotArgsError::CountMismatch {
                    what: "nspecchan",
                    expected,
                    found: found_nspecchan,
                });
            }
        }
        let found_n_int = inputs.n_int();
        if let Some(expected) = n_int {
            if expected != found_n_int {
                return Err(PlotArgsError::CountMismatch {
                    what: "n_int",
                    expected,
                    found: found_n_int,
                });
            }
        }

        let dpi = dpi.unwrap_or(DEFAULT_DPI);
        if dpi == 0 {
            return Err(PlotArgsError::ZeroDpi);
        }

        let ctx = RunContext::new(
            found_nspecchan,
            found_n_int,
            output_dir.unwrap_or_else(|| PathBuf::from(".")),
            hide_plots,
            drift_range.unwrap_or(DEFAULT_DRIFT_RANGE),
        )?;

        Ok(PlotParams {
            ctx,
            inputs,
            skip_cross_correlation,
            dpi,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), LcDiagnosticsError> {
        debug!("Converting arguments into parameters");
        let params = self.parse()?;
        let PlotParams {
            ctx,
            inputs,
            skip_cross_correlation,
            dpi,
        } = params;

        info!("Input summary:");
        info!("  {} spectroscopic channels", ctx.nspecchan());
        info!("  {} integrations", ctx.n_int());
        info!(
            "  {} cross-correlated integrations",
            inputs.cross_correlation.len()
        );
        info!("Writing figures into {}", ctx.figs_dir().display());

        let report = if dry_run {
            let report =
                Diagnostics::new(&ctx, DryRunRenderer).run_all(&inputs, skip_cross_correlation);
            info!("Dry run -- no figures were written.");
            report
        } else {
            render(&ctx, &inputs, skip_cross_correlation, dpi)?
        };

        check_report(&report)
    }
}

#[cfg(feature = "plotting")]
fn render(
    ctx: &RunContext,
    inputs: &DiagnosticInputs,
    skip_cross_correlation: bool,
    dpi: u32,
) -> Result<DiagnosticsReport, LcDiagnosticsError> {
    use crate::render::BitmapRenderer;

    let renderer = BitmapRenderer::new(ctx.hide_plots()).with_dpi(dpi);
    Ok(Diagnostics::new(ctx, renderer).run_all(inputs, skip_cross_correlation))
}

#[cfg(not(feature = "plotting"))]
fn render(
    _ctx: &RunContext,
    _inputs: &DiagnosticInputs,
    _skip_cross_correlation: bool,
    _dpi: u32,
) -> Result<DiagnosticsReport, LcDiagnosticsError> {
    Err(crate::render::DrawError::NoPlottingFeature.into())
}

/// A run fails only if nothing could be made.
fn check_report(report: &DiagnosticsReport) -> Result<(), LcDiagnosticsError> {
    if !report.failures.is_empty() {
        warn!(
            "{} of {} diagnostics failed",
            report.failures.len(),
            report.num_attempted()
        );
    }
    if report.written.is_empty() && !report.failures.is_empty() {
        return Err(PlotArgsError::AllFailed {
            num: report.failures.len(),
        }
        .into());
    }
    Ok(())
}

#[derive(Error, Debug)]
pub(super) enum PlotArgsError {
    #[error("No diagnostic inputs were supplied")]
    NoInputs,

    #[error("{what} was given as {expected}, but the inputs have {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("The DPI must be positive")]
    ZeroDpi,

    #[error(transparent)]
    Context(#[from] crate::context::ContextError),

    #[error("All {num} diagnostics failed; see the warnings above")]
    AllFailed { num: usize },

    #[error(transparent)]
    Input(#[from] crate::inputs::InputError),
}
