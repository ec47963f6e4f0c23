// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Equipment listing with a preview of each equipment's points.

use futures::stream::{self, StreamExt, TryStreamExt};
use haystack_grid::Row;

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::Result;
use crate::project::{cell, entity_id, tags, text};
use crate::types::{EquipmentReport, EquipmentSummary, PointPreview};

/// Points read per equipment.
const POINTS_PER_EQUIP: usize = 10;

/// Points kept in each preview.
const PREVIEW_LEN: usize = 5;

/// Point reads allowed in flight at once.
const CONCURRENT_POINT_READS: usize = 8;

impl HaystackClient {
    /// Read equipment matching `filter`.
    ///
    /// With `include_points`, each equipment's points are read
    /// (`point and equipRef==@<id>`) with at most `CONCURRENT_POINT_READS`
    /// reads in flight; any failing read fails the whole call.
    pub async fn equipment(&self, filter: &str, include_points: bool) -> Result<EquipmentReport> {
        let params = Params::new().with("filter", filter);
        let grid = self.execute_operation("read", Some(&params)).await?;

        let mut equipment: Vec<EquipmentSummary> = grid
            .rows()
            .iter()
            .map(|row| EquipmentSummary {
                id: entity_id(row, "id"),
                dis: text(row, "dis"),
                site_ref: text(row, "siteRef"),
                tags: tags(row, &["id", "dis", "siteRef"]),
                point_count: None,
                points: Vec::new(),
            })
            .collect();

        if include_points {
            let reads = equipment
                .iter()
                .filter(|equip| !equip.id.is_empty())
                .map(|equip| self.equipment_points(&equip.id));
            let previews: Vec<Vec<Row>> = stream::iter(reads)
                .buffered(CONCURRENT_POINT_READS)
                .try_collect()
                .await?;
            let mut previews = previews.into_iter();

            for equip in equipment.iter_mut().filter(|equip| !equip.id.is_empty()) {
                if let Some(rows) = previews.next() {
                    equip.point_count = Some(rows.len());
                    equip.points = rows.iter().take(PREVIEW_LEN).map(point_preview).collect();
                }
            }
        }

        Ok(EquipmentReport {
            count: equipment.len(),
            equipment,
        })
    }

    async fn equipment_points(&self, equip_id: &str) -> Result<Vec<Row>> {
        let params = Params::new()
            .with("filter", format!("point and equipRef==@{equip_id}"))
            .with("limit", POINTS_PER_EQUIP);
        let grid = self.execute_operation("read", Some(&params)).await?;
        Ok(grid.into_rows())
    }
}

fn point_preview(row: &Row) -> PointPreview {
    PointPreview {
        id: entity_id(row, "id"),
        dis: text(row, "dis"),
        cur_val: cell(row, "curVal"),
    }
}
