// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors from deriving artifact identifiers. All of these mean that the
/// caller supplied an invalid index range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("The total count governing {category} indices is 0; it must be positive")]
    ZeroCount { category: &'static str },

    #[error("{category} index {index} is out of range; the total count is {count}")]
    IndexOutOfRange {
        category: &'static str,
        index: usize,
        count: usize,
    },

    #[error("The figure handle for category {code} with a {width}-digit index field doesn't fit in 64 bits")]
    HandleOverflow { code: u8, width: usize },
}
