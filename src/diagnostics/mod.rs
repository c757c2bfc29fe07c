// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagnostic figures of a light-curve extraction.
//!
//! Each diagnostic derives its values (normalised fluxes, MADs, drift
//! partitions, channel edges), works out which artifact it belongs to, and
//! hands both to a [`DiagnosticRenderer`]. A failure in one channel or
//! integration is logged and recorded, and the pass carries on.

mod error;

pub use error::DiagnosticError;

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};

use crate::{
    artifact::Category,
    constants::{FLUX_MAP_VMAX, FLUX_MAP_VMIN},
    context::RunContext,
    drift::partition_drift,
    inputs::{
        Channel, CrossCorrelationProfile, DiagnosticInputs, DriftSeries, FluxMap,
        LightCurveSeries, SpectrumPair,
    },
    render::{
        CcSpectrumFigure, CcValuesFigure, DiagnosticRenderer, DriftFigure, Figure,
        FluxMapFigure, LightCurveFigure,
    },
    stats::{mad_ppm, normalize_columns, normalize_series, time_offset, Mad},
    ticks::channel_edge_ticks,
    PROGRESS_BARS,
};

/// Fig 41.
pub fn drift_figure(drift: &DriftSeries, n_int: usize) -> Result<Figure, DiagnosticError> {
    drift.check(n_int)?;
    let partition = partition_drift(&drift.drift1d, &drift.driftmask)?;
    Ok(Figure::Drift(DriftFigure { partition, n_int }))
}

/// Fig 42. `mad` is the MAD of the whole dataset, which isn't recomputed
/// here.
pub fn flux_map_figure(
    flux_map: &FluxMap,
    n_int: usize,
    mad: Mad,
    channels: &[Channel],
) -> Result<Figure, DiagnosticError> {
    flux_map.check(n_int)?;
    let (wave_min, wave_max) = flux_map.wave_extent()?;
    let (normspec, _) = normalize_columns(flux_map.optspec.view());

    let wave_low = channels.iter().map(|c| c.wave_low).collect::<Vec<_>>();
    let wave_hi = channels.iter().map(|c| c.wave_hi).collect::<Vec<_>>();
    let edge_ticks = channel_edge_ticks(&wave_low, &wave_hi)?;

    Ok(Figure::FluxMap(FluxMapFigure {
        title: format!("MAD = {mad}"),
        normspec,
        wave_min,
        wave_max,
        vmin: FLUX_MAP_VMIN,
        vmax: FLUX_MAP_VMAX,
        edge_ticks,
    }))
}

/// Fig 43.
pub fn light_curve_figure(
    lc: &LightCurveSeries,
    channel: &Channel,
) -> Result<Figure, DiagnosticError> {
    lc.check()?;
    let offset = time_offset(lc.time.view())?;
    let norm = normalize_series(lc.data.view(), lc.err.view())?;
    if norm.is_degenerate() {
        warn!(
            "Channel {} has no usable normalisation; its light curve is all NaN",
            channel.index
        );
    }
    let mad = mad_ppm(norm.data.view());

    Ok(Figure::LightCurve(LightCurveFigure {
        title: format!(
            "Bandpass {}: {:.3} - {:.3}",
            channel.index, channel.wave_low, channel.wave_hi
        ),
        channel: *channel,
        time: lc.time.mapv(|t| t - offset),
        time_offset: offset,
        x_label: format!("Time [{} - {offset}]", lc.time_units),
        norm,
        mad,
    }))
}

/// Fig 44.
pub fn cc_spectrum_figure(
    pair: &SpectrumPair,
    n: usize,
    drift_range: usize,
) -> Result<Figure, DiagnosticError> {
    pair.check(drift_range)?;
    Ok(Figure::CcSpectrum(CcSpectrumFigure {
        title: format!("Cross Correlation - Spectrum {n}"),
        ref_spec: pair.ref_spec.clone(),
        fit_spec: pair.fit_spec.clone(),
        fit_offset: drift_range,
    }))
}

/// Fig 45.
pub fn cc_values_figure(
    profile: &CrossCorrelationProfile,
    n: usize,
    drift_range: usize,
) -> Result<Figure, DiagnosticError> {
    profile.check(drift_range)?;
    Ok(Figure::CcValues(CcValuesFigure {
        title: format!("Cross Correlation - Values {n}"),
        lags: CrossCorrelationProfile::lags(drift_range)?.collect(),
        vals: profile.vals.clone(),
    }))
}

/// A diagnostic that couldn't be made.
#[derive(Debug)]
pub struct DiagnosticFailure {
    pub category: Category,
    pub index: usize,
    pub error: DiagnosticError,
}

/// The outcome of a whole diagnostic pass.
#[derive(Debug, Default)]
pub struct DiagnosticsReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<DiagnosticFailure>,
}

impl DiagnosticsReport {
    fn record(&mut self, category: Category, index: usize, result: Result<PathBuf, DiagnosticError>) {
        match result {
            Ok(path) => self.written.push(path),
            Err(error) => {
                warn!("Couldn't make the {category} figure for index {index}: {error}");
                self.failures.push(DiagnosticFailure {
                    category,
                    index,
                    error,
                });
            }
        }
    }

    pub fn num_attempted(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Makes diagnostic figures for one pipeline run.
pub struct Diagnostics<'a, R: DiagnosticRenderer> {
    ctx: &'a RunContext,
    renderer: R,
}

impl<'a, R: DiagnosticRenderer> Diagnostics<'a, R> {
    pub fn new(ctx: &'a RunContext, renderer: R) -> Diagnostics<'a, R> {
        Diagnostics { ctx, renderer }
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn emit(
        &mut self,
        category: Category,
        index: usize,
        figure: Figure,
    ) -> Result<PathBuf, DiagnosticError> {
        let id = self.ctx.artifact(category, index)?;
        let path = id.path(self.ctx.output_dir());
        debug!("{id}: {}", figure.summary());
        self.renderer.render(&id, &path, &figure)?;
        Ok(path)
    }

    /// Plot the 1D drift (Fig 41).
    pub fn drift1d(&mut self, drift: &DriftSeries) -> Result<PathBuf, DiagnosticError> {
        let figure = drift_figure(drift, self.ctx.n_int())?;
        self.emit(Category::Drift, 0, figure)
    }

    /// Plot the normalised 2D light curve (Fig 42).
    pub fn lc_driftcorr(
        &mut self,
        flux_map: &FluxMap,
        mad: Mad,
        channels: &[Channel],
    ) -> Result<PathBuf, DiagnosticError> {
        let figure = flux_map_figure(flux_map, self.ctx.n_int(), mad, channels)?;
        self.emit(Category::LightCurve2D, 0, figure)
    }

    /// Plot one channel's normalised light curve (Fig 43).
    pub fn binned_lightcurve(
        &mut self,
        lc: &LightCurveSeries,
        channel: &Channel,
    ) -> Result<PathBuf, DiagnosticError> {
        // Check the index before doing any work.
        self.ctx.artifact(Category::LightCurve1D, channel.index)?;
        let figure = light_curve_figure(lc, channel)?;
        self.emit(Category::LightCurve1D, channel.index, figure)
    }

    /// Compare the cross-correlation reference spectrum with integration
    /// `n`'s spectrum (Fig 44).
    pub fn cc_spec(&mut self, pair: &SpectrumPair, n: usize) -> Result<PathBuf, DiagnosticError> {
        let figure = cc_spectrum_figure(pair, n, self.ctx.drift_range())?;
        self.emit(Category::CcSpectrum, n, figure)
    }

    /// Plot the cross-correlation strength of integration `n` (Fig 45).
    pub fn cc_vals(
        &mut self,
        profile: &CrossCorrelationProfile,
        n: usize,
    ) -> Result<PathBuf, DiagnosticError> {
        let figure = cc_values_figure(profile, n, self.ctx.drift_range())?;
        self.emit(Category::CcValues, n, figure)
    }

    /// Make every diagnostic the inputs allow.
    pub fn run_all(&mut self, inputs: &DiagnosticInputs, skip_cross_correlation: bool) -> DiagnosticsReport {
        let mut report = DiagnosticsReport::default();

        let channels = match inputs.channels() {
            Ok(c) => c,
            Err(e) => {
                // Without channels, there's nothing per-channel to do, but the
                // drift can still be plotted.
                report.record(Category::LightCurve1D, 0, Err(e.into()));
                vec![]
            }
        };

        if let Some(drift) = inputs.drift() {
            let result = self.drift1d(&drift);
            report.record(Category::Drift, 0, result);
        }

        if let Some(flux_map) = inputs.flux_map() {
            let mad = inputs.mad_s4.map(Mad::from_ppm).unwrap_or(Mad::Undefined);
            let result = flux_map.map_err(DiagnosticError::from).and_then(|flux_map| {
                self.lc_driftcorr(&flux_map, mad, &channels)
            });
            report.record(Category::LightCurve2D, 0, result);
        }

        let pb = progress_bar(channels.len(), "Light curves", "channels");
        for channel in &channels {
            let result = inputs
                .light_curve(channel.index)
                .map_err(DiagnosticError::from)
                .and_then(|lc| self.binned_lightcurve(&lc, channel));
            report.record(Category::LightCurve1D, channel.index, result);
            pb.inc(1);
        }
        pb.finish();

        if skip_cross_correlation {
            debug!("Not plotting cross-correlation diagnostics");
        } else {
            let pb = progress_bar(
                inputs.cross_correlation.len(),
                "Cross correlation",
                "integrations",
            );
            for cc in &inputs.cross_correlation {
                let result = self.cc_spec(&cc.spectrum_pair(), cc.n);
                report.record(Category::CcSpectrum, cc.n, result);
                let result = self.cc_vals(&cc.profile(), cc.n);
                report.record(Category::CcValues, cc.n, result);
                pb.inc(1);
            }
            pb.finish();
        }

        info!(
            "Made {} of {} diagnostic figures",
            report.written.len(),
            report.num_attempted()
        );
        report
    }
}

fn progress_bar(len: usize, message: &'static str, units: &str) -> ProgressBar {
    let draw_target = if PROGRESS_BARS.load() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    };
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{msg:17}}: [{{wide_bar:.blue}}] {{pos:2}}/{{len:2}} {units} ({{elapsed_precise}}<{{eta_precise}})"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::with_draw_target(Some(len as u64), draw_target)
        .with_style(style)
        .with_position(0)
        .with_message(message)
}
