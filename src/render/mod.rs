// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Descriptions of diagnostic figures, and the things that draw them.
//!
//! A [`Figure`] holds everything a figure shows, already computed. Renderers
//! only lay it out; they never compute a metric.

mod error;
#[cfg(feature = "plotting")]
mod plotting;

pub use error::DrawError;
#[cfg(feature = "plotting")]
pub use plotting::BitmapRenderer;

use std::path::Path;

use log::info;
use ndarray::prelude::*;

use crate::{
    artifact::{ArtifactId, Category},
    drift::DriftPartition,
    inputs::Channel,
    stats::{Mad, NormalizedSeries},
};

/// Fig 41: drift along the dispersion direction for every frame.
#[derive(Debug, Clone)]
pub struct DriftFigure {
    pub partition: DriftPartition,
    pub n_int: usize,
}

/// Fig 42: the normalised 2D light curve, integrations against wavelength.
#[derive(Debug, Clone)]
pub struct FluxMapFigure {
    pub title: String,

    /// `(n_int, nx)`; expected to cluster around 1.
    pub normspec: Array2<f64>,
    pub wave_min: f64,
    pub wave_max: f64,
    pub vmin: f64,
    pub vmax: f64,

    /// Channel boundaries. Empty with a single channel.
    pub edge_ticks: Vec<f64>,
}

/// Fig 43: one channel's normalised light curve.
#[derive(Debug, Clone)]
pub struct LightCurveFigure {
    pub title: String,
    pub channel: Channel,

    /// Times with `time_offset` subtracted.
    pub time: Array1<f64>,
    pub time_offset: f64,
    pub x_label: String,
    pub norm: NormalizedSeries,
    pub mad: Mad,
}

impl LightCurveFigure {
    pub fn mad_label(&self) -> String {
        format!("MAD = {}", self.mad)
    }
}

/// Fig 44: the cross-correlation reference spectrum and one integration's
/// spectrum.
#[derive(Debug, Clone)]
pub struct CcSpectrumFigure {
    pub title: String,
    pub ref_spec: Array1<f64>,
    pub fit_spec: Array1<f64>,

    /// The x position of the first fit spectrum sample (the drift range).
    pub fit_offset: usize,
}

/// Fig 45: cross-correlation strength against lag.
#[derive(Debug, Clone)]
pub struct CcValuesFigure {
    pub title: String,
    pub lags: Vec<i64>,
    pub vals: Array1<f64>,
}

#[derive(Debug, Clone)]
pub enum Figure {
    Drift(DriftFigure),
    FluxMap(FluxMapFigure),
    LightCurve(LightCurveFigure),
    CcSpectrum(CcSpectrumFigure),
    CcValues(CcValuesFigure),
}

impl Figure {
    pub fn category(&self) -> Category {
        match self {
            Figure::Drift(_) => Category::Drift,
            Figure::FluxMap(_) => Category::LightCurve2D,
            Figure::LightCurve(_) => Category::LightCurve1D,
            Figure::CcSpectrum(_) => Category::CcSpectrum,
            Figure::CcValues(_) => Category::CcValues,
        }
    }

    /// A one-line summary of the figure's derived values.
    pub fn summary(&self) -> String {
        match self {
            Figure::Drift(f) => format!(
                "{} good and {} interpolated drift points",
                f.partition.good.len(),
                f.partition.interpolated.len()
            ),
            Figure::FluxMap(f) => format!(
                "{}; {} x {} normalised spectra; {} channel edges",
                f.title,
                f.normspec.nrows(),
                f.normspec.ncols(),
                f.edge_ticks.len()
            ),
            Figure::LightCurve(f) => format!("{}; {}", f.title, f.mad_label()),
            Figure::CcSpectrum(f) => f.title.clone(),
            Figure::CcValues(f) => f.title.clone(),
        }
    }
}

/// Something that turns a [`Figure`] into an artifact at `path`.
///
/// Figures of one category share a figure handle
/// ([`ArtifactId::figure_handle`]); a renderer that keeps canvases around
/// should reuse (and clear) one canvas per handle.
pub trait DiagnosticRenderer {
    fn render(&mut self, id: &ArtifactId, path: &Path, figure: &Figure) -> Result<(), DrawError>;
}

/// A renderer that only reports what would be drawn.
#[derive(Debug, Default)]
pub struct DryRunRenderer;

impl DiagnosticRenderer for DryRunRenderer {
    fn render(&mut self, id: &ArtifactId, path: &Path, figure: &Figure) -> Result<(), DrawError> {
        info!("{id}: {} (would write {})", figure.summary(), path.display());
        Ok(())
    }
}
