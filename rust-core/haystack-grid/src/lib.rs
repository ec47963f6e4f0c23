// SPDX-License-Identifier: PMPL-1.0-or-later
//! Haystack Grid
//!
//! Decoding of Haystack operation responses into one normalized [`Grid`].
//! Controllers answer either in JSON or in Zinc, a compact comma-separated
//! text format where strings are double-quoted and URIs backticked; both end
//! up as the same column/row structure of [`Scalar`] cells.
//!
//! ## Modules
//!
//! - [`scalar`]: the cell value enum and the prefix-driven cell decoder.
//! - [`grid`]: the grid type and its row/column invariant.
//! - [`zinc`]: Zinc text decoding.
//! - [`json`]: JSON grid decoding (Haystack JSON v3 strings and v4 kind objects).
//! - [`error`]: [`GridError`].

pub mod error;
pub mod grid;
pub mod json;
pub mod scalar;
mod tokenize;
pub mod zinc;

pub use error::{GridError, GridResult};
pub use grid::{Grid, Meta, Row, HEADER_META_KEY};
pub use json::{decode_json_grid, decode_json_str, decode_json_value};
pub use scalar::{decode as decode_scalar, Scalar};
pub use zinc::decode_zinc;

/// Wire formats a response body can be decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Zinc,
}

impl WireFormat {
    /// Pick the decoder for a response.
    ///
    /// A JSON content type wins; otherwise a Zinc content type or a body that
    /// starts with `ver:` selects Zinc. `None` means the body is neither.
    pub fn detect(content_type: Option<&str>, body: &str) -> Option<Self> {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
        if content_type.contains("json") {
            Some(WireFormat::Json)
        } else if content_type.contains("zinc") || body.trim_start().starts_with("ver:") {
            Some(WireFormat::Zinc)
        } else {
            None
        }
    }

    /// Decode `body` in this format.
    ///
    /// # Errors
    ///
    /// Propagates the format decoder's [`GridError`].
    pub fn decode(self, body: &str) -> GridResult<Grid> {
        match self {
            WireFormat::Json => decode_json_str(body),
            WireFormat::Zinc => decode_zinc(body),
        }
    }
}
