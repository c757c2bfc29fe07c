// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Deterministic identifiers for diagnostic figures and their files.
//!
//! Every figure belongs to a [`Category`] (a two-digit code, e.g. 43 for the
//! 1D light curves). The index of the channel or integration a figure
//! describes is zero padded to a width derived from the total count of that
//! index, so that sorting the output files by name also sorts them by index.
//! All figures of one category share a single figure handle (the index field
//! is always zero); it's up to the renderer to reuse that canvas.

mod error;
#[cfg(test)]
mod tests;

pub use error::ArtifactError;

use std::path::{Path, PathBuf};

use strum_macros::{Display, EnumIter};

use crate::constants::*;

/// What the index of a figure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDomain {
    /// Spectroscopic channels (bandpasses); counted by `nspecchan`.
    Channel,

    /// Integrations; counted by `n_int`.
    Integration,
}

/// The kinds of diagnostic figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Category {
    #[strum(serialize = "drift")]
    Drift,

    #[strum(serialize = "2D light curve")]
    LightCurve2D,

    #[strum(serialize = "1D light curve")]
    LightCurve1D,

    #[strum(serialize = "cross-correlation spectrum")]
    CcSpectrum,

    #[strum(serialize = "cross-correlation values")]
    CcValues,
}

impl Category {
    /// The two-digit code that prefixes every identifier of this category.
    pub fn code(self) -> u8 {
        match self {
            Category::Drift => DRIFT_CATEGORY,
            Category::LightCurve2D => LC_2D_CATEGORY,
            Category::LightCurve1D => LC_1D_CATEGORY,
            Category::CcSpectrum => CC_SPEC_CATEGORY,
            Category::CcValues => CC_VALS_CATEGORY,
        }
    }

    /// The short tag appended to file names of this category.
    pub fn description(self) -> &'static str {
        match self {
            Category::Drift => "Drift",
            Category::LightCurve2D => "2D_LC",
            Category::LightCurve1D => "1D_LC",
            Category::CcSpectrum => "CC_Spec",
            Category::CcValues => "CC_Vals",
        }
    }

    pub fn index_domain(self) -> IndexDomain {
        match self {
            Category::Drift | Category::LightCurve2D | Category::LightCurve1D => {
                IndexDomain::Channel
            }
            Category::CcSpectrum | Category::CcValues => IndexDomain::Integration,
        }
    }

    fn name(self) -> &'static str {
        match self.index_domain() {
            IndexDomain::Channel => "Channel",
            IndexDomain::Integration => "Integration",
        }
    }
}

/// The number of digits used to print any index in `0..count`. This is
/// `max(1, ceil(log10(count)))`, i.e. the number of digits of `count - 1`.
pub fn index_width(count: usize) -> Option<usize> {
    match count {
        0 => None,
        c => Some((c - 1).checked_ilog10().map_or(1, |d| d as usize + 1)),
    }
}

/// Zero pad `index` to the width implied by `count`.
pub fn zero_padded(index: usize, count: usize) -> Option<String> {
    if index >= count {
        return None;
    }
    let width = index_width(count)?;
    Some(format!("{index:0width$}"))
}

/// The shared, resident figure slot for all figures of a category. Formed by
/// appending `width` zeros to the category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureHandle(pub u64);

impl std::fmt::Display for FigureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifier of a single diagnostic artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId {
    category: Category,
    index: usize,
    width: usize,
}

impl ArtifactId {
    /// Create a new identifier for figure `index` of `category`, where `count`
    /// is the total number of channels or integrations (depending on the
    /// category's [`IndexDomain`]).
    pub fn new(category: Category, index: usize, count: usize) -> Result<ArtifactId, ArtifactError> {
        let width = index_width(count).ok_or(ArtifactError::ZeroCount {
            category: category.name(),
        })?;
        if index >= count {
            return Err(ArtifactError::IndexOutOfRange {
                category: category.name(),
                index,
                count,
            });
        }

        Ok(ArtifactId {
            category,
            index,
            width,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The zero-padded index, e.g. "007".
    pub fn padded_index(&self) -> String {
        format!("{:0width$}", self.index, width = self.width)
    }

    /// The figure handle shared by every index of this category. Numerically,
    /// this is `code * 10^width`.
    pub fn figure_handle(&self) -> Result<FigureHandle, ArtifactError> {
        let code = self.category.code();
        u32::try_from(self.width)
            .ok()
            .and_then(|w| 10_u64.checked_pow(w))
            .and_then(|p| u64::from(code).checked_mul(p))
            .map(FigureHandle)
            .ok_or(ArtifactError::HandleOverflow {
                code,
                width: self.width,
            })
    }

    /// e.g. "Fig43007-1D_LC.png".
    pub fn file_name(&self) -> String {
        format!(
            "Fig{}{}-{}.{FIG_EXTENSION}",
            self.category.code(),
            self.padded_index(),
            self.category.description()
        )
    }

    /// The full path of this artifact underneath an output directory.
    pub fn path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(FIGS_DIR).join(self.file_name())
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fig{}{}", self.category.code(), self.padded_index())
    }
}
