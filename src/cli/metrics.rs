// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print (and optionally write out) the derived metrics of each channel
//! without drawing anything.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use console::style;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    inputs::{Channel, DiagnosticInputs},
    stats::{mad_ppm, normalize_series, Mad},
    LcDiagnosticsError,
};

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct MetricsArgs {
    /// Path to the diagnostic inputs (toml or json).
    #[clap(name = "INPUTS", parse(from_os_str))]
    inputs: PathBuf,

    /// Also write the metrics into this json file.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

/// The derived metrics of a single channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(super) struct ChannelMetrics {
    pub(super) index: usize,
    pub(super) wave_low: f64,
    pub(super) wave_hi: f64,

    /// The median flux; `None` if there was no usable median.
    pub(super) center: Option<f64>,

    /// `None` if the MAD is undefined.
    pub(super) mad_ppm: Option<i64>,
}

pub(super) fn channel_metrics(
    inputs: &DiagnosticInputs,
    channel: &Channel,
) -> Result<ChannelMetrics, LcDiagnosticsError> {
    let lc = inputs.light_curve(channel.index)?;
    lc.check()?;
    let norm = normalize_series(lc.data.view(), lc.err.view())?;
    let mad = mad_ppm(norm.data.view());
    Ok(ChannelMetrics {
        index: channel.index,
        wave_low: channel.wave_low,
        wave_hi: channel.wave_hi,
        center: Some(norm.center).filter(|c| c.is_finite()),
        mad_ppm: mad.ppm(),
    })
}

impl MetricsArgs {
    pub(super) fn run(self) -> Result<(), LcDiagnosticsError> {
        let inputs = DiagnosticInputs::read(&self.inputs)?;
        let channels = inputs.channels()?;
        info!(
            "{} ({} channels, {} integrations)",
            style("Channel metrics").bold(),
            channels.len(),
            inputs.n_int()
        );

        let mut all_metrics = Vec::with_capacity(channels.len());
        for channel in &channels {
            match channel_metrics(&inputs, channel) {
                Ok(m) => {
                    let mad = m.mad_ppm.map(Mad::Ppm).unwrap_or(Mad::Undefined);
                    let center = match m.center {
                        Some(c) => format!("{c:.6e}"),
                        None => style("undefined").yellow().to_string(),
                    };
                    info!(
                        "  {:>4} [{:.3} - {:.3}]: median {center}, MAD {mad}",
                        m.index, m.wave_low, m.wave_hi
                    );
                    all_metrics.push(m);
                }
                Err(e) => warn!("Channel {}: {e}", channel.index),
            }
        }

        if let Some(mad_s4) = inputs.mad_s4 {
            info!("  Whole dataset: MAD {}", Mad::from_ppm(mad_s4));
        }

        if let Some(output) = self.output {
            debug!("Writing metrics to {}", output.display());
            let mut f = BufWriter::new(File::create(&output)?);
            serde_json::to_writer_pretty(&mut f, &all_metrics)
                .map_err(|e| LcDiagnosticsError::Generic(e.to_string()))?;
            f.flush()?;
            info!("Wrote {}", output.display());
        }

        Ok(())
    }
}
