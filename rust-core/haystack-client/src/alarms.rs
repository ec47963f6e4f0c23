// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Alarm listing.

use haystack_grid::{Row, Scalar};

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::Result;
use crate::project::{entity_id, text};
use crate::types::{AlarmReport, AlarmSummary};

/// Sort key for alarms without a priority.
const UNRANKED_PRIORITY: f64 = 999.0;

impl HaystackClient {
    /// Read alarms matching `filter`, unacknowledged first, then by priority.
    ///
    /// With `include_acked == false` the filter is narrowed by `and not acked`.
    pub async fn alarms(&self, filter: &str, include_acked: bool) -> Result<AlarmReport> {
        let filter = if include_acked {
            filter.to_string()
        } else {
            format!("{filter} and not acked")
        };
        let params = Params::new().with("filter", filter);
        let grid = self.execute_operation("read", Some(&params)).await?;

        let mut alarms: Vec<AlarmSummary> = grid.rows().iter().map(alarm_summary).collect();
        sort_alarms(&mut alarms);

        Ok(AlarmReport {
            count: alarms.len(),
            active_count: alarms.iter().filter(|a| !a.acked).count(),
            alarms,
        })
    }
}

fn alarm_summary(row: &Row) -> AlarmSummary {
    let equipment = entity_id(row, "equipRef");
    AlarmSummary {
        id: entity_id(row, "id"),
        dis: text(row, "dis"),
        alarm_class: text(row, "alarmClass"),
        priority: row.get("priority").and_then(priority_of),
        acked: row.get("acked").is_some_and(is_set),
        normal_time: text(row, "normalTime"),
        ack_time: text(row, "ackTime"),
        equipment: (!equipment.is_empty()).then_some(equipment),
    }
}

fn priority_of(value: &Scalar) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_text().and_then(|t| t.trim().parse().ok()))
}

/// Markers, `true` and the text `true` all count as acknowledged.
fn is_set(value: &Scalar) -> bool {
    value.is_truthy() || value.as_text().is_some_and(|t| t.eq_ignore_ascii_case("true"))
}

fn sort_alarms(alarms: &mut [AlarmSummary]) {
    alarms.sort_by(|a, b| {
        a.acked.cmp(&b.acked).then_with(|| {
            a.priority
                .unwrap_or(UNRANKED_PRIORITY)
                .total_cmp(&b.priority.unwrap_or(UNRANKED_PRIORITY))
        })
    });
}
