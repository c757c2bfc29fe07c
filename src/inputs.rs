// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Data handed to us by the upstream extraction, drift-fitting and
//! cross-correlation stages.
//!
//! Everything here is read-only. Shapes are not checked on construction;
//! each diagnostic checks the shapes it relies on so that one malformed
//! channel or integration doesn't prevent the others from being plotted.

use std::{
    fs::File,
    io::Read,
    ops::RangeInclusive,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

lazy_static::lazy_static! {
    pub static ref INPUT_FILE_TYPES_COMMA_SEPARATED: String = InputFileType::iter().join(", ");
}

/// One spectroscopic bandpass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub index: usize,
    pub wave_low: f64,
    pub wave_hi: f64,
}

/// A single channel's light curve.
#[derive(Debug, Clone)]
pub struct LightCurveSeries {
    pub time: Array1<f64>,
    pub data: Array1<f64>,
    pub err: Array1<f64>,
    pub time_units: String,
}

impl LightCurveSeries {
    pub fn check(&self) -> Result<(), InputError> {
        check_len("light-curve data", self.time.len(), self.data.len())?;
        check_len("light-curve uncertainties", self.time.len(), self.err.len())
    }
}

/// Per-integration drift of the spectral trace.
#[derive(Debug, Clone)]
pub struct DriftSeries {
    pub drift1d: Vec<f64>,

    /// `true` where the drift was interpolated rather than measured.
    pub driftmask: Vec<bool>,
}

impl DriftSeries {
    /// There must be one drift value per integration.
    pub fn check(&self, n_int: usize) -> Result<(), InputError> {
        check_len("drift1d", n_int, self.drift1d.len())
    }
}

/// The optimally extracted spectra of all integrations, `(n_int, nx)`.
#[derive(Debug, Clone)]
pub struct FluxMap {
    pub wave_1d: Array1<f64>,
    pub optspec: Array2<f64>,
}

impl FluxMap {
    pub fn check(&self, n_int: usize) -> Result<(), InputError> {
        let (rows, nx) = self.optspec.dim();
        check_len("optspec integrations", n_int, rows)?;
        check_len("wave_1d", nx, self.wave_1d.len())
    }

    /// The smallest and largest finite wavelengths.
    pub fn wave_extent(&self) -> Result<(f64, f64), InputError> {
        match self
            .wave_1d
            .iter()
            .copied()
            .filter(|w| w.is_finite())
            .minmax_by(f64::total_cmp)
        {
            itertools::MinMaxResult::NoElements => Err(InputError::NoValidWavelengths),
            itertools::MinMaxResult::OneElement(w) => Ok((w, w)),
            itertools::MinMaxResult::MinMax(min, max) => Ok((min, max)),
        }
    }
}

/// The reference spectrum used for cross-correlation and one integration's
/// spectrum, trimmed by the drift range on both ends.
#[derive(Debug, Clone)]
pub struct SpectrumPair {
    pub ref_spec: Array1<f64>,
    pub fit_spec: Array1<f64>,
}

impl SpectrumPair {
    pub fn check(&self, drift_range: usize) -> Result<(), InputError> {
        let nx = self.ref_spec.len();
        let expected = drift_range
            .checked_mul(2)
            .and_then(|trimmed| nx.checked_sub(trimmed))
            .ok_or(InputError::DriftRangeTooLarge { drift_range, nx })?;
        check_len("fit spectrum", expected, self.fit_spec.len())
    }
}

/// Cross-correlation strength for each lag in `-drift_range..=drift_range`.
#[derive(Debug, Clone)]
pub struct CrossCorrelationProfile {
    pub vals: Array1<f64>,
}

impl CrossCorrelationProfile {
    pub fn check(&self, drift_range: usize) -> Result<(), InputError> {
        let expected = drift_range
            .checked_mul(2)
            .and_then(|n| n.checked_add(1))
            .ok_or(InputError::DriftRangeOverflow { drift_range })?;
        check_len("cross-correlation values", expected, self.vals.len())
    }

    pub fn lags(drift_range: usize) -> Result<RangeInclusive<i64>, InputError> {
        let r = i64::try_from(drift_range)
            .map_err(|_| InputError::DriftRangeOverflow { drift_range })?;
        Ok(-r..=r)
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), InputError> {
    if expected == got {
        Ok(())
    } else {
        Err(InputError::MismatchedShape { what, expected, got })
    }
}

/// Cross-correlation products for one integration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrossCorrelationInput {
    /// The integration index.
    pub n: usize,

    #[serde(deserialize_with = "nullable_vec")]
    pub ref_spec: Vec<f64>,

    #[serde(deserialize_with = "nullable_vec")]
    pub fit_spec: Vec<f64>,

    #[serde(deserialize_with = "nullable_vec")]
    pub vals: Vec<f64>,
}

impl CrossCorrelationInput {
    pub fn spectrum_pair(&self) -> SpectrumPair {
        SpectrumPair {
            ref_spec: Array1::from(self.ref_spec.clone()),
            fit_spec: Array1::from(self.fit_spec.clone()),
        }
    }

    pub fn profile(&self) -> CrossCorrelationProfile {
        CrossCorrelationProfile {
            vals: Array1::from(self.vals.clone()),
        }
    }
}

/// Everything needed for a diagnostic pass, as read from a file. Light-curve
/// `data` and `err` are indexed `[channel][time]`, `optspec` is indexed
/// `[integration][wavelength]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiagnosticInputs {
    pub wave_low: Vec<f64>,
    pub wave_hi: Vec<f64>,

    #[serde(deserialize_with = "nullable_vec")]
    pub time: Vec<f64>,

    #[serde(default = "default_time_units")]
    pub time_units: String,

    #[serde(deserialize_with = "nullable_vec_vec")]
    pub data: Vec<Vec<f64>>,

    #[serde(deserialize_with = "nullable_vec_vec")]
    pub err: Vec<Vec<f64>>,

    #[serde(default, deserialize_with = "nullable_opt_vec")]
    pub drift1d: Option<Vec<f64>>,

    #[serde(default)]
    pub driftmask: Option<Vec<bool>>,

    #[serde(default, deserialize_with = "nullable_opt_vec")]
    pub wave_1d: Option<Vec<f64>>,

    #[serde(default, deserialize_with = "nullable_opt_vec_vec")]
    pub optspec: Option<Vec<Vec<f64>>>,

    /// The MAD of the whole dataset [ppm], computed upstream.
    #[serde(default)]
    pub mad_s4: Option<f64>,

    #[serde(default)]
    pub cross_correlation: Vec<CrossCorrelationInput>,
}

fn default_time_units() -> String {
    "BMJD_TDB".to_string()
}

impl DiagnosticInputs {
    /// Read inputs from a toml or json file.
    pub fn read(file: &Path) -> Result<DiagnosticInputs, InputError> {
        debug!("Attempting to read diagnostic inputs from {}", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| InputFileType::from_str(&e).ok())
            .ok_or_else(|| InputError::UnrecognisedExtension(file.to_path_buf()))?;

        let mut contents = String::new();
        File::open(file)?.read_to_string(&mut contents)?;
        match file_type {
            InputFileType::Toml => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|e| InputError::Decode {
                    file: file.to_path_buf(),
                    err: e.to_string(),
                })
            }
            InputFileType::Json => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|e| InputError::Decode {
                    file: file.to_path_buf(),
                    err: e.to_string(),
                })
            }
        }
    }

    pub fn nspecchan(&self) -> usize {
        self.wave_low.len()
    }

    pub fn n_int(&self) -> usize {
        self.time.len()
    }

    pub fn channels(&self) -> Result<Vec<Channel>, InputError> {
        let nspecchan = self.wave_low.len();
        check_len("wave_hi", nspecchan, self.wave_hi.len())?;
        check_len("light-curve data channels", nspecchan, self.data.len())?;
        check_len("light-curve uncertainty channels", nspecchan, self.err.len())?;
        Ok(self
            .wave_low
            .iter()
            .zip(self.wave_hi.iter())
            .enumerate()
            .map(|(index, (&wave_low, &wave_hi))| Channel {
                index,
                wave_low,
                wave_hi,
            })
            .collect())
    }

    /// The light curve of channel `i`.
    pub fn light_curve(&self, i: usize) -> Result<LightCurveSeries, InputError> {
        let data = self.data.get(i).ok_or(InputError::MissingChannel {
            what: "data",
            index: i,
        })?;
        let err = self.err.get(i).ok_or(InputError::MissingChannel {
            what: "err",
            index: i,
        })?;
        Ok(LightCurveSeries {
            time: Array1::from(self.time.clone()),
            data: Array1::from(data.clone()),
            err: Array1::from(err.clone()),
            time_units: self.time_units.clone(),
        })
    }

    /// The drift series, if drift values were supplied. A missing mask means
    /// every drift value was measured.
    pub fn drift(&self) -> Option<DriftSeries> {
        self.drift1d.as_ref().map(|drift1d| DriftSeries {
            drift1d: drift1d.clone(),
            driftmask: self
                .driftmask
                .clone()
                .unwrap_or_else(|| vec![false; drift1d.len()]),
        })
    }

    /// The 2D flux map, if spectra were supplied.
    pub fn flux_map(&self) -> Option<Result<FluxMap, InputError>> {
        let optspec = self.optspec.as_ref()?;
        let wave_1d = self.wave_1d.clone().unwrap_or_default();
        Some(rows_to_array2(optspec).map(|optspec| FluxMap {
            wave_1d: Array1::from(wave_1d),
            optspec,
        }))
    }
}

fn rows_to_array2(rows: &[Vec<f64>]) -> Result<Array2<f64>, InputError> {
    let nx = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != nx) {
        return Err(InputError::RaggedRows {
            row,
            expected: nx,
            got: r.len(),
        });
    }
    Array2::from_shape_vec((rows.len(), nx), rows.concat()).map_err(|e| InputError::Shape(e.to_string()))
}

// JSON can't represent NaN; serde_json writes it as null. Read nulls back as
// NaN.
fn nullable_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    let v: Vec<Option<f64>> = Deserialize::deserialize(d)?;
    Ok(v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
}

fn nullable_vec_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
    let v: Vec<Vec<Option<f64>>> = Deserialize::deserialize(d)?;
    Ok(v.into_iter()
        .map(|r| r.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
        .collect())
}

fn nullable_opt_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<f64>>, D::Error> {
    let v: Option<Vec<Option<f64>>> = Deserialize::deserialize(d)?;
    Ok(v.map(|v| v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect()))
}

fn nullable_opt_vec_vec<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<Vec<Vec<f64>>>, D::Error> {
    let v: Option<Vec<Vec<Option<f64>>>> = Deserialize::deserialize(d)?;
    Ok(v.map(|v| {
        v.into_iter()
            .map(|r| r.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
            .collect()
    }))
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub enum InputFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Mismatched shapes: {what} has {got} elements, expected {expected}")]
    MismatchedShape {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Row {row} of optspec has {got} elements, but the first row has {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("There is no {what} for channel {index}")]
    MissingChannel { what: &'static str, index: usize },

    #[error("The drift range ({drift_range}) is too large for a reference spectrum with {nx} elements")]
    DriftRangeTooLarge { drift_range: usize, nx: usize },

    #[error("The drift range ({drift_range}) is too large to count lags with")]
    DriftRangeOverflow { drift_range: usize },

    #[error("There are no valid wavelengths in wave_1d")]
    NoValidWavelengths,

    #[error("{0}")]
    Shape(String),

    #[error("Input file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .0.display(), *INPUT_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedExtension(PathBuf),

    #[error("Couldn't decode inputs from {}:\n{err}", .file.display())]
    Decode { file: PathBuf, err: String },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_abs_diff_eq;
    use indoc::indoc;
    use tempfile::Builder;

    use super::*;

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut f = Builder::new().suffix(ext).tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_json_with_nulls() {
        let f = write_temp(
            ".json",
            indoc! {r#"
                {
                    "wave_low": [1.0, 2.0],
                    "wave_hi": [2.0, 3.0],
                    "time": [59000.1, 59000.2, 59000.3],
                    "data": [[10.0, null, 12.0], [1.0, 1.0, 1.0]],
                    "err": [[1.0, 1.0, 1.0], [0.1, 0.1, 0.1]],
                    "drift1d": [0.1, null, 0.3],
                    "driftmask": [false, true, false]
                }
            "#},
        );
        let inputs = DiagnosticInputs::read(f.path()).unwrap();
        assert_eq!(inputs.nspecchan(), 2);
        assert_eq!(inputs.n_int(), 3);
        assert_eq!(inputs.time_units, "BMJD_TDB");
        assert!(inputs.data[0][1].is_nan());

        let drift = inputs.drift().unwrap();
        assert!(drift.drift1d[1].is_nan());
        assert_eq!(drift.driftmask, vec![false, true, false]);
        assert!(inputs.flux_map().is_none());
        assert!(inputs.cross_correlation.is_empty());
    }

    #[test]
    fn test_read_toml() {
        let f = write_temp(
            ".toml",
            indoc! {r#"
                wave_low = [1.0]
                wave_hi = [2.0]
                time = [0.5, 1.5]
                time_units = "BJD_TDB"
                data = [[2.0, nan]]
                err = [[0.1, 0.1]]
                wave_1d = [1.0, 1.5, 2.0]
                optspec = [[1.0, 2.0, 3.0], [1.1, 2.1, 3.1]]
                mad_s4 = 812.4

                [[cross_correlation]]
                n = 1
                ref_spec = [1.0, 2.0, 3.0, 4.0]
                fit_spec = [2.0, 3.0]
                vals = [0.1, 0.9, 0.2]
            "#},
        );
        let inputs = DiagnosticInputs::read(f.path()).unwrap();
        assert_eq!(inputs.time_units, "BJD_TDB");
        assert!(inputs.data[0][1].is_nan());
        assert_abs_diff_eq!(inputs.mad_s4.unwrap(), 812.4);

        let flux_map = inputs.flux_map().unwrap().unwrap();
        assert_eq!(flux_map.optspec.dim(), (2, 3));
        assert_abs_diff_eq!(flux_map.optspec[(1, 2)], 3.1);
        flux_map.check(2).unwrap();

        let cc = &inputs.cross_correlation[0];
        assert_eq!(cc.n, 1);
        cc.spectrum_pair().check(1).unwrap();
        cc.profile().check(1).unwrap();
    }

    #[test]
    fn test_unrecognised_extension() {
        let f = write_temp(".yaml", "wave_low: []");
        assert!(matches!(
            DiagnosticInputs::read(f.path()),
            Err(InputError::UnrecognisedExtension(_))
        ));
    }

    #[test]
    fn test_ragged_optspec() {
        let inputs = DiagnosticInputs {
            optspec: Some(vec![vec![1.0, 2.0], vec![1.0]]),
            ..Default::default()
        };
        assert!(matches!(
            inputs.flux_map(),
            Some(Err(InputError::RaggedRows {
                row: 1,
                expected: 2,
                got: 1
            }))
        ));
    }

    #[test]
    fn test_light_curve_shapes() {
        let lc = LightCurveSeries {
            time: Array1::zeros(4),
            data: Array1::zeros(4),
            err: Array1::zeros(3),
            time_units: String::new(),
        };
        assert!(matches!(
            lc.check(),
            Err(InputError::MismatchedShape {
                expected: 4,
                got: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_spectrum_pair_shapes() {
        let pair = SpectrumPair {
            ref_spec: Array1::zeros(20),
            fit_spec: Array1::zeros(10),
        };
        pair.check(5).unwrap();
        assert!(pair.check(4).is_err());
        assert!(matches!(
            pair.check(11),
            Err(InputError::DriftRangeTooLarge { .. })
        ));
        // Doubling this range doesn't fit in a usize.
        assert!(matches!(
            pair.check(usize::MAX / 2 + 1),
            Err(InputError::DriftRangeTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_drift_ranges_are_errors() {
        let profile = CrossCorrelationProfile {
            vals: Array1::zeros(5),
        };
        profile.check(2).unwrap();
        assert!(matches!(
            profile.check(usize::MAX / 2 + 1),
            Err(InputError::DriftRangeOverflow { .. })
        ));
        // The largest range whose lag count still fits.
        assert!(matches!(
            profile.check(usize::MAX / 2),
            Err(InputError::MismatchedShape { .. })
        ));
        assert!(matches!(
            CrossCorrelationProfile::lags(usize::MAX),
            Err(InputError::DriftRangeOverflow { .. })
        ));
    }

    #[test]
    fn test_drift_series_length() {
        let drift = DriftSeries {
            drift1d: vec![0.0; 8],
            driftmask: vec![false; 8],
        };
        drift.check(8).unwrap();
        assert!(matches!(
            drift.check(5),
            Err(InputError::MismatchedShape {
                what: "drift1d",
                expected: 5,
                got: 8
            })
        ));
    }

    #[test]
    fn test_channel_rows_must_match_channels() {
        let mut inputs = DiagnosticInputs {
            wave_low: vec![1.0, 2.0],
            wave_hi: vec![2.0, 3.0],
            time: vec![0.0, 1.0],
            data: vec![vec![1.0, 1.0]; 3],
            err: vec![vec![0.1, 0.1]; 2],
            ..Default::default()
        };
        assert!(matches!(
            inputs.channels(),
            Err(InputError::MismatchedShape {
                expected: 2,
                got: 3,
                ..
            })
        ));

        inputs.data.pop();
        assert_eq!(inputs.channels().unwrap().len(), 2);
        inputs.err.push(vec![0.1, 0.1]);
        assert!(inputs.channels().is_err());
    }

    #[test]
    fn test_lags() {
        assert_eq!(
            CrossCorrelationProfile::lags(2).unwrap().collect::<Vec<_>>(),
            vec![-2, -1, 0, 1, 2]
        );
    }

    #[test]
    fn test_wave_extent() {
        let flux_map = FluxMap {
            wave_1d: ndarray::array![1.2, f64::NAN, 0.8, 2.5],
            optspec: Array2::zeros((1, 4)),
        };
        assert_eq!(flux_map.wave_extent().unwrap(), (0.8, 2.5));

        let flux_map = FluxMap {
            wave_1d: Array1::zeros(0),
            optspec: Array2::zeros((1, 0)),
        };
        assert!(matches!(
            flux_map.wave_extent(),
            Err(InputError::NoValidWavelengths)
        ));
    }
}
