// SPDX-License-Identifier: PMPL-1.0-or-later
//! Row projection helpers shared by the tool methods.

use haystack_grid::{decode_scalar, Grid, Row, Scalar};

/// Bare entity id from a ref-like cell.
///
/// `r:p1 Zone Temp`, `@p1 "Zone Temp"` and `p1` all give `p1`.
pub(crate) fn entity_id(row: &Row, column: &str) -> String {
    row.get(column).map(bare_id).unwrap_or_default()
}

pub(crate) fn bare_id(value: &Scalar) -> String {
    let text = match value {
        Scalar::Null => return String::new(),
        other => other.to_string(),
    };
    let text = text.trim();
    let text = text
        .strip_prefix("r:")
        .or_else(|| text.strip_prefix('@'))
        .unwrap_or(text);
    text.split_whitespace().next().unwrap_or_default().to_string()
}

/// Display text of a non-null cell.
pub(crate) fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}

/// Cell value, `Null` when absent.
pub(crate) fn cell(row: &Row, column: &str) -> Scalar {
    row.get(column).cloned().unwrap_or(Scalar::Null)
}

/// Names of the non-null cells of `row` that are not in `exclude`.
pub(crate) fn tags(row: &Row, exclude: &[&str]) -> Vec<String> {
    row.iter()
        .filter(|(name, value)| !value.is_null() && !exclude.contains(&name.as_str()))
        .map(|(name, _)| name.clone())
        .collect()
}

/// Text of a meta entry, decoded like a cell so `s:w-1` reads as `w-1`.
pub(crate) fn meta_text(grid: &Grid, name: &str) -> Option<String> {
    grid.meta_value(name)
        .map(|raw| decode_scalar(raw.trim()))
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
}
