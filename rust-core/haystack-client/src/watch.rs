// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Watch subscriptions: subscribe, poll for changes, unsubscribe.

use haystack_grid::GridError;
use tracing::debug;

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::{HaystackError, Result};
use crate::project::{cell, entity_id, meta_text, text};
use crate::types::{WatchPollResult, WatchSubscription, WatchUpdate};

impl HaystackClient {
    /// Open a watch on the points matching `filter`.
    ///
    /// The watch id is taken from the response meta, falling back to a
    /// `watchId` column on the first row.
    ///
    /// # Errors
    ///
    /// [`HaystackError::InvalidGrid`] if the response names no watch id.
    pub async fn watch_subscribe(
        &self,
        filter: &str,
        lease_minutes: u32,
    ) -> Result<WatchSubscription> {
        let params = Params::new()
            .with("filter", filter)
            .with("lease", format!("{lease_minutes}min"));
        let grid = self.execute_operation("watchSub", Some(&params)).await?;

        let watch_id = meta_text(&grid, "watchId")
            .or_else(|| grid.first().and_then(|row| text(row, "watchId")))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                HaystackError::InvalidGrid(GridError::InvalidFormat(
                    "watchSub response carries no watchId".to_string(),
                ))
            })?;
        debug!(watch_id = %watch_id, lease_minutes, "Watch opened");

        Ok(WatchSubscription {
            watch_id,
            filter: filter.to_string(),
            lease_minutes,
        })
    }

    /// Fetch the points of a watch that changed since the last poll.
    pub async fn watch_poll(&self, watch_id: &str) -> Result<WatchPollResult> {
        let params = Params::new().with("watchId", watch_id);
        let grid = self.execute_operation("watchPoll", Some(&params)).await?;

        let updates: Vec<WatchUpdate> = grid
            .rows()
            .iter()
            .map(|row| WatchUpdate {
                id: entity_id(row, "id"),
                cur_val: cell(row, "curVal"),
                cur_status: text(row, "curStatus"),
            })
            .collect();

        Ok(WatchPollResult {
            watch_id: watch_id.to_string(),
            count: updates.len(),
            updates,
        })
    }

    /// Close a watch.
    pub async fn watch_unsubscribe(&self, watch_id: &str) -> Result<()> {
        let params = Params::new().with("watchId", watch_id).with("close", "m:");
        self.execute_operation("watchUnsub", Some(&params)).await?;
        debug!(watch_id, "Watch closed");
        Ok(())
    }
}
