// SPDX-License-Identifier: PMPL-1.0-or-later
//! Navigation tree browsing.

use crate::client::HaystackClient;
use crate::dispatch::Params;
use crate::error::Result;
use crate::project::{tags, text};
use crate::types::{NavItem, NavResult};

impl HaystackClient {
    /// List the children of `nav_id`, or the roots when `None`.
    pub async fn nav(&self, nav_id: Option<&str>) -> Result<NavResult> {
        let params = nav_id.map(|id| Params::new().with("navId", id));
        let grid = self.execute_operation("nav", params.as_ref()).await?;

        let items: Vec<NavItem> = grid
            .rows()
            .iter()
            .map(|row| NavItem {
                nav_id: text(row, "navId"),
                dis: text(row, "dis"),
                tags: tags(row, &["navId", "dis"]),
            })
            .collect();

        Ok(NavResult {
            current_nav_id: nav_id.unwrap_or("root").to_string(),
            count: items.len(),
            items,
        })
    }
}
