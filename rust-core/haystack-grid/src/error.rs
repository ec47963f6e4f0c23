// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Haystack Bridge - Grid decoding error types
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Only grid-level structure can fail. Individual cells never do: a cell the
// scalar decoder does not understand degrades to its raw text.

use thiserror::Error;

/// Errors raised while turning a response body into a [`Grid`](crate::Grid).
#[derive(Debug, Error)]
pub enum GridError {
    /// The body is structurally not a grid (e.g. a Zinc body without both a
    /// version line and a header line, or JSON that is not an object).
    #[error("Invalid grid format: {0}")]
    InvalidFormat(String),

    /// A body declared as JSON did not parse.
    #[error("Invalid JSON grid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for grid decoding results.
pub type GridResult<T> = Result<T, GridError>;
