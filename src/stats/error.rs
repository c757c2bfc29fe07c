// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Mismatched shapes: {what} has {got} elements, expected {expected}")]
    MismatchedShape {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Cannot derive a time offset from an empty time series")]
    EmptyTimes,
}
