// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Historical trend reads.

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::Result;
use crate::project::cell;
use crate::types::{HistoryResult, HistorySample};

impl HaystackClient {
    /// Read the history of one point.
    ///
    /// `range` is passed through verbatim: `today`, `yesterday`, a single date
    /// or a `start,end` pair.
    ///
    /// # Errors
    ///
    /// [`HaystackError::MissingParameter`](crate::HaystackError::MissingParameter)
    /// when `point_id` or `range` is blank on a direct connection.
    pub async fn read_history(&self, point_id: &str, range: &str) -> Result<HistoryResult> {
        let params = Params::new().with("id", point_id).with("range", range);
        let grid = self.execute_operation("hisRead", Some(&params)).await?;

        let data: Vec<HistorySample> = grid
            .rows()
            .iter()
            .map(|row| HistorySample {
                ts: cell(row, "ts"),
                val: cell(row, "val"),
            })
            .collect();

        Ok(HistoryResult {
            point_id: point_id.to_string(),
            range: range.to_string(),
            count: data.len(),
            data,
        })
    }
}
