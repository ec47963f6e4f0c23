// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Point reads and writes.
//!
//! Filters are passed through to the controller untouched; this crate does
//! not parse Haystack filter syntax.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::{HaystackError, Result};
use crate::project::{cell, entity_id, tags, text};
use crate::types::{BatchPoint, BatchReadResult, FilterResult, PointSummary, PointsResult, WriteAck};

/// Priority levels accepted by `pointWrite`.
pub const WRITE_LEVELS: std::ops::RangeInclusive<u8> = 1..=17;

/// Level used by operators for manual overrides.
pub const DEFAULT_WRITE_LEVEL: u8 = 16;

impl HaystackClient {
    /// Read the points matching `filter`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Haystack filter, e.g. `point and temp and sensor`.
    /// * `limit`  - Maximum number of rows the controller should return.
    pub async fn read_points(&self, filter: &str, limit: Option<usize>) -> Result<PointsResult> {
        let mut params = Params::new().with("filter", filter);
        if let Some(limit) = limit {
            params.insert("limit", limit);
        }

        let grid = self.execute_operation("read", Some(&params)).await?;
        let points: Vec<PointSummary> = grid
            .rows()
            .iter()
            .map(|row| PointSummary {
                id: entity_id(row, "id"),
                dis: text(row, "dis"),
                cur_val: cell(row, "curVal"),
                unit: text(row, "unit"),
                tags: tags(row, &["id", "dis", "curVal", "unit"]),
            })
            .collect();

        Ok(PointsResult {
            filter: filter.to_string(),
            count: points.len(),
            points,
        })
    }

    /// Read several points in one request, keyed by bare id.
    ///
    /// Ids may be given with or without the `@` prefix.
    ///
    /// # Errors
    ///
    /// [`HaystackError::InvalidParameter`] if `ids` is empty.
    pub async fn batch_read<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchReadResult> {
        if ids.is_empty() {
            return Err(HaystackError::InvalidParameter(
                "batch read needs at least one point id".to_string(),
            ));
        }

        let filter = ids
            .iter()
            .map(|id| format!("id==@{}", id.as_ref().trim().trim_start_matches('@')))
            .collect::<Vec<_>>()
            .join(" or ");
        let params = Params::new().with("filter", filter);
        let grid = self.execute_operation("read", Some(&params)).await?;

        let points: BTreeMap<String, BatchPoint> = grid
            .rows()
            .iter()
            .map(|row| {
                let point = BatchPoint {
                    dis: text(row, "dis"),
                    cur_val: cell(row, "curVal"),
                    unit: text(row, "unit"),
                    cur_status: text(row, "curStatus").unwrap_or_else(|| "ok".to_string()),
                };
                (entity_id(row, "id"), point)
            })
            .collect();

        Ok(BatchReadResult {
            requested: ids.len(),
            found: points.len(),
            points,
        })
    }

    /// Run an arbitrary filter and return at most `limit` raw rows.
    pub async fn custom_filter(&self, filter: &str, limit: usize) -> Result<FilterResult> {
        let params = Params::new().with("filter", filter).with("limit", limit);
        let grid = self.execute_operation("read", Some(&params)).await?;
        let count = grid.len();
        let results = grid.into_rows().into_iter().take(limit).collect();

        Ok(FilterResult {
            filter: filter.to_string(),
            count,
            results,
        })
    }

    /// Write `value` to a writable point at priority `level`.
    ///
    /// # Arguments
    ///
    /// * `point_id`         - Point reference as the controller expects it.
    /// * `value`            - Value to write; `null` releases the level.
    /// * `level`            - Priority array level, 1 (highest) to 17.
    /// * `duration_minutes` - Optional override duration.
    ///
    /// # Errors
    ///
    /// [`HaystackError::InvalidParameter`] if `level` is outside 1..=17.
    pub async fn write_point(
        &self,
        point_id: &str,
        value: impl Into<Value>,
        level: u8,
        duration_minutes: Option<u32>,
    ) -> Result<WriteAck> {
        if !WRITE_LEVELS.contains(&level) {
            return Err(HaystackError::InvalidParameter(format!(
                "write level {level} is outside 1..=17"
            )));
        }

        let value = value.into();
        let duration = duration_minutes.map(|n| format!("{n}min"));
        let mut params = Params::new()
            .with("id", point_id)
            .with("level", level)
            .with("val", value.clone());
        if let Some(duration) = &duration {
            params.insert("duration", duration.as_str());
        }

        self.execute_operation("pointWrite", Some(&params)).await?;
        info!(point = point_id, level, "Point written");

        Ok(WriteAck {
            point_id: point_id.to_string(),
            value,
            level,
            duration,
        })
    }
}
