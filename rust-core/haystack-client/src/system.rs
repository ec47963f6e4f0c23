// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Server identity, operation listing and connection probing.

use crate::client::HaystackClient;
use crate::error::Result;
use crate::project::text;
use crate::transport::Route;
use crate::types::{AboutInfo, ConnectionInfo};

impl HaystackClient {
    /// Server identity from the `about` operation.
    pub async fn about(&self) -> Result<AboutInfo> {
        let grid = self.execute_operation("about", None).await?;
        let Some(row) = grid.first() else {
            return Ok(AboutInfo::default());
        };
        Ok(AboutInfo {
            haystack_version: text(row, "haystackVersion"),
            server_name: text(row, "serverName"),
            vendor_name: text(row, "vendorName"),
            product_name: text(row, "productName"),
            product_version: text(row, "productVersion"),
        })
    }

    /// Names of the operations the server supports.
    pub async fn ops(&self) -> Result<Vec<String>> {
        let grid = self.execute_operation("ops", None).await?;
        Ok(grid.rows().iter().filter_map(|row| text(row, "name")).collect())
    }

    /// Probe the server and report how the client is connected.
    ///
    /// Never fails: a failed probe is reported in `status`. In hybrid mode the
    /// probe may itself trigger the switch to relay, which `mode` reflects.
    pub async fn connection_info(&self) -> ConnectionInfo {
        let (status, available_ops) = match self.execute_operation("about", None).await {
            Ok(_) => ("connected".to_string(), self.ops().await.unwrap_or_default()),
            Err(err) => (format!("error: {err}"), Vec::new()),
        };

        let endpoint = self.endpoint();
        ConnectionInfo {
            mode: self.mode(),
            tls_enabled: endpoint.base_url.starts_with("https://"),
            using_relay: endpoint.route == Route::Relay,
            endpoint: endpoint.base_url,
            status,
            available_ops,
        }
    }
}
