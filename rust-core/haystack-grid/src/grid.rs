// SPDX-License-Identifier: PMPL-1.0-or-later
//! The normalized grid every operation response decodes into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// One grid row: column name to cell value.
pub type Row = BTreeMap<String, Scalar>;

/// Free-form header information (format version line, meta tags).
pub type Meta = BTreeMap<String, String>;

/// Meta key under which the Zinc version line is stored verbatim.
pub const HEADER_META_KEY: &str = "header";

/// A decoded grid.
///
/// Every row holds exactly the columns listed in [`Grid::columns`]; cells
/// with no value are [`Scalar::Null`]. Constructors enforce this, so fields
/// are only reachable through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    columns: Vec<String>,
    rows: Vec<Row>,
    meta: Meta,
}

impl Grid {
    /// Build a grid, normalizing rows to the column set.
    ///
    /// Duplicate column names keep their first position. Row keys that are
    /// not columns are appended as new columns (in first-appearance order)
    /// and every row is padded with `Null` for the columns it lacks.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>, meta: Meta) -> Self {
        let row_keys: Vec<String> = rows.iter().flat_map(|row| row.keys().cloned()).collect();
        let mut ordered: Vec<String> = Vec::with_capacity(columns.len());
        for name in columns.into_iter().chain(row_keys) {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                for name in &ordered {
                    row.entry(name.clone()).or_insert(Scalar::Null);
                }
                row
            })
            .collect();

        Self {
            columns: ordered,
            rows,
            meta,
        }
    }

    /// Column names in order of first appearance.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Look up one meta entry by name.
    pub fn meta_value(&self, name: &str) -> Option<&str> {
        self.meta.get(name).map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any. Single-record operations such as `about` answer
    /// with one row.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Consume the grid and return its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
