// SPDX-License-Identifier: PMPL-1.0-or-later
//! Zinc text grid decoding.
//!
//! Only the flat subset controllers actually send is handled: one version
//! line (optionally carrying meta tags), one header line of column names, and
//! any number of comma-separated data rows. Nested grids and column meta are
//! out of scope.

use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::grid::{Grid, Meta, Row, HEADER_META_KEY};
use crate::scalar::{self, Scalar};
use crate::tokenize::{split_fields, Quoting};

/// Decode a Zinc body into a [`Grid`].
///
/// Blank lines are ignored anywhere in the body. The first remaining line is
/// the version line, the second the header.
///
/// # Errors
///
/// Returns [`GridError::InvalidFormat`] if fewer than two non-blank lines are
/// present.
pub fn decode_zinc(body: &str) -> GridResult<Grid> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());

    let (Some(version_line), Some(header_line)) = (lines.next(), lines.next()) else {
        return Err(GridError::InvalidFormat(
            "zinc grid needs a version line and a header line".to_string(),
        ));
    };

    let meta = decode_meta(version_line.trim());
    let headers: Vec<&str> = split_fields(header_line, ',', Quoting::Quotes);

    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    for name in &headers {
        if !columns.iter().any(|c| c == name) {
            columns.push((*name).to_string());
        }
    }

    let rows: Vec<Row> = lines.map(|line| decode_row(&headers, line)).collect();

    debug!(
        columns = columns.len(),
        rows = rows.len(),
        "Decoded zinc grid"
    );

    Ok(Grid::from_parts(columns, rows, meta))
}

/// Zip header names with decoded cells. Missing trailing cells become `Null`,
/// surplus cells are dropped, and a later duplicate header overwrites an
/// earlier one.
fn decode_row(headers: &[&str], line: &str) -> Row {
    let cells = split_fields(line, ',', Quoting::QuotesAndBackticks);
    let mut row = Row::new();
    for (idx, name) in headers.iter().enumerate() {
        let value = cells.get(idx).map_or(Scalar::Null, |cell| scalar::decode(cell));
        row.insert((*name).to_string(), value);
    }
    row
}

/// Keep the version line verbatim and also expose its `name:value` tags,
/// e.g. `ver:"3.0" watchId:"w-1"` yields `ver = 3.0` and `watchId = w-1`.
/// A bare tag name is a marker and is stored as `m:`.
fn decode_meta(version_line: &str) -> Meta {
    let mut meta = Meta::new();
    meta.insert(HEADER_META_KEY.to_string(), version_line.to_string());

    for token in split_fields(version_line, ' ', Quoting::Quotes) {
        if token.is_empty() {
            continue;
        }
        match token.split_once(':') {
            Some((name, value)) if !name.is_empty() => {
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                meta.insert(name.to_string(), value.to_string());
            }
            _ => {
                meta.insert(token.to_string(), "m:".to_string());
            }
        }
    }
    meta
}
