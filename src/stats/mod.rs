// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Derived metrics of light curves and spectra.
//!
//! Any non-finite sample (NaN or infinity) is considered invalid and is
//! ignored when computing a statistic. A statistic without any valid input is
//! NaN; these NaNs are expected to flow through to the plots rather than stop
//! a diagnostic pass.

mod error;

pub use error::StatsError;

use ndarray::prelude::*;

use crate::constants::PPM;

/// Sort the valid values of an iterator.
fn sorted_valid<I: IntoIterator<Item = f64>>(values: I) -> Vec<f64> {
    let mut valid = values
        .into_iter()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    valid.sort_unstable_by(f64::total_cmp);
    valid
}

/// The median of all finite values. An even number of values gives the mean
/// of the middle two. NaN if there are no finite values.
pub fn nan_median<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let valid = sorted_valid(values);
    let n = valid.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => valid[n / 2],
        _ => (valid[n / 2 - 1] + valid[n / 2]) / 2.0,
    }
}

/// The mean of all finite values. NaN if there are no finite values.
pub fn nan_mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// A normalisation centre of 0 can only produce garbage; treat it as though
/// there was no valid data.
fn usable_center(center: f64) -> f64 {
    if center == 0.0 {
        f64::NAN
    } else {
        center
    }
}

/// A light curve divided by its own median.
#[derive(Debug, Clone)]
pub struct NormalizedSeries {
    pub data: Array1<f64>,
    pub err: Array1<f64>,

    /// The median of the input data over time. NaN if the data had no valid
    /// samples (or a median of 0), in which case all of `data` and `err` are
    /// NaN too.
    pub center: f64,
}

impl NormalizedSeries {
    /// Did normalisation fail to find a usable centre?
    pub fn is_degenerate(&self) -> bool {
        !self.center.is_finite()
    }
}

/// Normalise a light curve and its uncertainties by the median of the light
/// curve over time.
pub fn normalize_series(
    data: ArrayView1<f64>,
    err: ArrayView1<f64>,
) -> Result<NormalizedSeries, StatsError> {
    if err.len() != data.len() {
        return Err(StatsError::MismatchedShape {
            what: "err",
            expected: data.len(),
            got: err.len(),
        });
    }

    let center = usable_center(nan_median(data.iter().copied()));
    Ok(NormalizedSeries {
        data: data.mapv(|d| d / center),
        err: err.mapv(|e| e / center),
        center,
    })
}

/// A median absolute deviation in parts per million.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mad {
    Ppm(i64),

    /// There was nothing to take a median of.
    Undefined,
}

impl Mad {
    /// Round a raw ppm value (half to even). Non-finite values are undefined.
    pub fn from_ppm(ppm: f64) -> Mad {
        if ppm.is_finite() {
            Mad::Ppm(ppm.round_ties_even() as i64)
        } else {
            Mad::Undefined
        }
    }

    pub fn ppm(self) -> Option<i64> {
        match self {
            Mad::Ppm(v) => Some(v),
            Mad::Undefined => None,
        }
    }
}

impl std::fmt::Display for Mad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mad::Ppm(v) => write!(f, "{v} ppm"),
            Mad::Undefined => write!(f, "undefined"),
        }
    }
}

/// The median of the absolute point-to-point differences of a normalised
/// series, in ppm. Differences involving an invalid sample are ignored.
pub fn mad_ppm(norm_data: ArrayView1<f64>) -> Mad {
    let diffs = norm_data
        .iter()
        .zip(norm_data.iter().skip(1))
        .map(|(a, b)| (b - a).abs());
    Mad::from_ppm(PPM * nan_median(diffs))
}

/// Normalise each column (wavelength) of a 2D `(n_int, nx)` spectrum by its
/// mean over integrations. Returns the normalised spectrum and the per-column
/// centres. Columns without any valid samples are entirely NaN.
pub fn normalize_columns(optspec: ArrayView2<f64>) -> (Array2<f64>, Array1<f64>) {
    let centers = optspec
        .axis_iter(Axis(1))
        .map(|column| usable_center(nan_mean(column.iter().copied())))
        .collect::<Array1<f64>>();
    let normspec = &optspec / &centers;
    (normspec, centers)
}

/// The whole part of the first time, which is subtracted from all times on
/// light-curve plots.
pub fn time_offset(time: ArrayView1<f64>) -> Result<f64, StatsError> {
    time.first()
        .map(|t| t.floor())
        .ok_or(StatsError::EmptyTimes)
}
