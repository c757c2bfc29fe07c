// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drawing diagnostic figures to PNG files with `plotters`.

use std::{
    collections::{hash_map::Entry, HashMap},
    ops::Range,
    path::Path,
};

use log::{debug, info, trace};
use plotters::{coord::Shift, prelude::*, style::FontTransform};

use super::*;
use crate::{artifact::FigureHandle, constants::DEFAULT_DPI};

/// The width of the colour bar next to the 2D light curve [pixels].
const COLOUR_BAR_WIDTH: u32 = 110;

/// Channel edges on the 2D light curve.
const EDGE_GREY: RGBColor = RGBColor(77, 77, 77);

/// The number of dashes used to draw a channel edge.
const NUM_DASHES: usize = 40;

/// A reversed red-yellow-blue diverging colour map; low values are blue.
const RDYLBU_R: [RGBColor; 5] = [
    RGBColor(49, 54, 149),
    RGBColor(116, 173, 209),
    RGBColor(255, 255, 191),
    RGBColor(244, 109, 67),
    RGBColor(165, 0, 38),
];

/// Figure sizes [inches].
fn figure_size(category: Category) -> (u32, u32) {
    match category {
        Category::Drift => (8, 4),
        Category::LightCurve1D => (8, 6),
        Category::LightCurve2D | Category::CcSpectrum | Category::CcValues => (8, 8),
    }
}

/// The registry entry for a figure handle. Only the pixel size is kept; each
/// figure of the handle is drawn on a new backend of this size that is filled
/// white first, so nothing of an earlier figure carries over.
#[derive(Debug)]
struct Canvas {
    size: (u32, u32),
    uses: usize,
}

/// Draws figures as PNG files. Figures sharing a figure handle share one
/// registry entry, and therefore one canvas size.
#[derive(Debug)]
pub struct BitmapRenderer {
    canvases: HashMap<FigureHandle, Canvas>,
    hide_plots: bool,
    dpi: u32,
}

impl BitmapRenderer {
    pub fn new(hide_plots: bool) -> BitmapRenderer {
        BitmapRenderer {
            canvases: HashMap::new(),
            hide_plots,
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> BitmapRenderer {
        self.dpi = dpi;
        self
    }

    /// Get the size of the canvas for this artifact, registering it if this
    /// is the first figure of its category.
    fn canvas(&mut self, id: &ArtifactId) -> Result<(u32, u32), DrawError> {
        let handle = id.figure_handle()?;
        let canvas = match self.canvases.entry(handle) {
            Entry::Occupied(e) => {
                trace!("Reusing figure {handle} for {id}");
                e.into_mut()
            }
            Entry::Vacant(e) => {
                let (w, h) = figure_size(id.category());
                let size = w
                    .checked_mul(self.dpi)
                    .zip(h.checked_mul(self.dpi))
                    .ok_or(DrawError::CanvasTooLarge {
                        handle: handle.0,
                        dpi: self.dpi,
                    })?;
                trace!("Creating figure {handle}");
                e.insert(Canvas { size, uses: 0 })
            }
        };
        canvas.uses += 1;
        Ok(canvas.size)
    }
}

impl DiagnosticRenderer for BitmapRenderer {
    fn render(&mut self, id: &ArtifactId, path: &Path, figure: &Figure) -> Result<(), DrawError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let size = self.canvas(id)?;

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(plotters_err)?;
        match figure {
            Figure::Drift(f) => draw_drift(&root, f)?,
            Figure::FluxMap(f) => draw_flux_map(&root, f)?,
            Figure::LightCurve(f) => draw_light_curve(&root, f)?,
            Figure::CcSpectrum(f) => draw_cc_spectrum(&root, f)?,
            Figure::CcValues(f) => draw_cc_values(&root, f)?,
        }
        root.present().map_err(plotters_err)?;

        // There's no interactive display; "showing" a plot means telling the
        // user about it.
        if self.hide_plots {
            debug!("Wrote {}", path.display());
        } else {
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

fn plotters_err<E: std::fmt::Display>(e: E) -> DrawError {
    DrawError::Plotters(e.to_string())
}

/// The smallest and largest finite values.
fn finite_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Pad a range by 5% on either side, falling back to `default` if there was
/// no finite data.
fn padded(range: Option<(f64, f64)>, default: (f64, f64)) -> Range<f64> {
    let (lo, hi) = range.unwrap_or(default);
    let pad = if hi > lo { 0.05 * (hi - lo) } else { 0.5 };
    (lo - pad)..(hi + pad)
}

/// Map a fraction in [0, 1] onto the diverging colour map.
fn diverging_colour(frac: f64) -> RGBColor {
    let frac = if frac.is_finite() {
        frac.clamp(0.0, 1.0)
    } else {
        0.5
    };
    let scaled = frac * (RDYLBU_R.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(RDYLBU_R.len() - 2);
    let t = scaled - i as f64;
    let (a, b) = (RDYLBU_R[i], RDYLBU_R[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn draw_drift<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &DriftFigure,
) -> Result<(), DrawError> {
    let y_range = padded(
        finite_range(
            fig.partition
                .good
                .iter()
                .chain(fig.partition.interpolated.iter())
                .map(|(_, d)| *d),
        ),
        (-1.0, 1.0),
    );
    let mut cc = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(fig.n_int as f64 - 0.5), y_range)
        .map_err(plotters_err)?;
    cc.configure_mesh()
        .x_desc("Frame Number")
        .y_desc("Spectrum Drift Along x")
        .draw()
        .map_err(plotters_err)?;

    for (points, label, colour) in [
        (&fig.partition.good, "Good Drift Points", BLUE),
        (&fig.partition.interpolated, "Interpolated Drift Points", RED),
    ] {
        cc.draw_series(
            points
                .iter()
                .filter(|(_, d)| d.is_finite())
                .map(move |&(i, d)| Circle::new((i as f64, d), 3, colour.filled())),
        )
        .map_err(plotters_err)?
        .label(label)
        .legend(move |(x, y)| Circle::new((x, y), 3, colour.filled()));
    }
    cc.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plotters_err)?;

    Ok(())
}

fn draw_flux_map<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &FluxMapFigure,
) -> Result<(), DrawError> {
    let (n_int, nx) = fig.normspec.dim();
    let (width, _) = area.dim_in_pixel();
    let (map_area, bar_area) = area.split_horizontally(width.saturating_sub(COLOUR_BAR_WIDTH));

    let (x0, x1) = if fig.wave_max > fig.wave_min {
        (fig.wave_min, fig.wave_max)
    } else {
        (fig.wave_min - 0.5, fig.wave_max + 0.5)
    };
    let dw = (x1 - x0) / nx.max(1) as f64;
    let y1 = n_int.max(1) as f64;

    let mut cc = ChartBuilder::on(&map_area)
        .caption(&fig.title, ("sans-serif", 24))
        .margin(15)
        .margin_top(60)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, 0.0..y1)
        .map_err(plotters_err)?;
    cc.configure_mesh()
        .disable_mesh()
        .x_desc("Wavelength (μm)")
        .y_desc("Integration Number")
        .draw()
        .map_err(plotters_err)?;

    let span = fig.vmax - fig.vmin;
    cc.draw_series(
        fig.normspec
            .indexed_iter()
            .filter(|(_, v)| v.is_finite())
            .map(|((i, j), &v)| {
                Rectangle::new(
                    [
                        (x0 + j as f64 * dw, i as f64),
                        (x0 + (j + 1) as f64 * dw, (i + 1) as f64),
                    ],
                    diverging_colour((v - fig.vmin) / span).filled(),
                )
            }),
    )
    .map_err(plotters_err)?;

    // Dashed channel edges, labelled along the top.
    let dash = y1 / NUM_DASHES as f64;
    for &tick in &fig.edge_ticks {
        cc.draw_series((0..NUM_DASHES).step_by(2).map(|k| {
            PathElement::new(
                vec![(tick, k as f64 * dash), (tick, (k + 1) as f64 * dash)],
                EDGE_GREY.stroke_width(1),
            )
        }))
        .map_err(plotters_err)?;
        cc.draw_series(std::iter::once(Text::new(
            format!("{tick:.3}"),
            (tick, y1),
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate270),
        )))
        .map_err(plotters_err)?;
    }

    // Colour bar.
    let (_, bar_height) = bar_area.dim_in_pixel();
    let top = 75_i32;
    let bottom = 60_i32;
    let usable = bar_height as i32 - top - bottom;
    let x_start = 10_i32;
    if usable > 1 {
        for k in 0..usable {
            let frac = 1.0 - k as f64 / (usable - 1) as f64;
            bar_area
                .draw(&Rectangle::new(
                    [(x_start, top + k), (x_start + 25, top + k + 1)],
                    diverging_colour(frac).filled(),
                ))
                .map_err(plotters_err)?;
        }
        let num_labels = 5;
        for l in 0..num_labels {
            let frac = l as f64 / (num_labels - 1) as f64;
            let value = fig.vmax - span * frac;
            let y = top + (frac * (usable - 1) as f64) as i32;
            bar_area
                .draw_text(
                    &format!("{value:.3}"),
                    &("sans-serif", 14).into_font().color(&BLACK),
                    (x_start + 30, y - 7),
                )
                .map_err(plotters_err)?;
        }
        bar_area
            .draw_text(
                "Normalized Flux",
                &("sans-serif", 16)
                    .into_font()
                    .transform(FontTransform::Rotate270)
                    .color(&BLACK),
                (x_start + 85, top + usable / 2 + 50),
            )
            .map_err(plotters_err)?;
    }

    Ok(())
}

fn draw_light_curve<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &LightCurveFigure,
) -> Result<(), DrawError> {
    let points = fig
        .time
        .iter()
        .zip(fig.norm.data.iter())
        .zip(fig.norm.err.iter())
        .filter(|((t, d), _)| t.is_finite() && d.is_finite())
        .map(|((&t, &d), &e)| (t, d, if e.is_finite() { e.abs() } else { 0.0 }))
        .collect::<Vec<_>>();

    let x_range = padded(finite_range(points.iter().map(|p| p.0)), (0.0, 1.0));
    let y_range = padded(
        finite_range(points.iter().flat_map(|&(_, d, e)| [d - e, d + e])),
        (0.9, 1.1),
    );
    let colour = Palette99::pick(fig.channel.index).mix(0.2);

    let mut cc = ChartBuilder::on(area)
        .caption(&fig.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(plotters_err)?;
    cc.configure_mesh()
        .x_desc(&fig.x_label)
        .y_desc("Normalized Flux")
        .draw()
        .map_err(plotters_err)?;

    cc.draw_series(
        points
            .iter()
            .map(|&(t, d, e)| ErrorBar::new_vertical(t, d - e, d, d + e, colour.filled(), 6)),
    )
    .map_err(plotters_err)?;

    let text_pos = (
        x_range.start + 0.05 * (x_range.end - x_range.start),
        y_range.start + 0.1 * (y_range.end - y_range.start),
    );
    cc.draw_series(std::iter::once(Text::new(
        fig.mad_label(),
        text_pos,
        ("sans-serif", 18).into_font(),
    )))
    .map_err(plotters_err)?;

    Ok(())
}

fn draw_cc_spectrum<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &CcSpectrumFigure,
) -> Result<(), DrawError> {
    let nx = fig.ref_spec.len();
    let y_range = padded(
        finite_range(fig.ref_spec.iter().chain(fig.fit_spec.iter()).copied()),
        (0.0, 1.0),
    );
    let x_max = (nx as f64 - 1.0).max(1.0);

    let mut cc = ChartBuilder::on(area)
        .caption(&fig.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, y_range)
        .map_err(plotters_err)?;
    cc.configure_mesh().draw().map_err(plotters_err)?;

    for (spec, offset, label, colour) in [
        (&fig.ref_spec, 0, "Reference Spectrum", BLUE),
        (&fig.fit_spec, fig.fit_offset, "Current Spectrum", RED),
    ] {
        cc.draw_series(LineSeries::new(
            spec.iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| ((i + offset) as f64, v)),
            colour.stroke_width(2),
        ))
        .map_err(plotters_err)?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));
    }
    cc.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plotters_err)?;

    Ok(())
}

fn draw_cc_values<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &CcValuesFigure,
) -> Result<(), DrawError> {
    let x_range = padded(
        finite_range(fig.lags.iter().map(|&l| l as f64)),
        (-1.0, 1.0),
    );
    let y_range = padded(finite_range(fig.vals.iter().copied()), (0.0, 1.0));

    let mut cc = ChartBuilder::on(area)
        .caption(&fig.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plotters_err)?;
    cc.configure_mesh().draw().map_err(plotters_err)?;

    cc.draw_series(
        fig.lags
            .iter()
            .zip(fig.vals.iter())
            .filter(|(_, v)| v.is_finite())
            .map(|(&lag, &v)| Circle::new((lag as f64, v), 3, BLUE.filled())),
    )
    .map_err(plotters_err)?;

    Ok(())
}
