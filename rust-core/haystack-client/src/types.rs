// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Summary types returned by the typed tool methods.
//!
//! Each type is a projection of one or more grids onto the handful of tags a
//! caller usually wants. Cell values keep their decoded [`Scalar`] form so no
//! information is lost; identifiers are reduced to bare ids (`p1`, not
//! `r:p1 Zone Temp`). Everything serializes to camelCase JSON.

use std::collections::BTreeMap;

use haystack_grid::{Row, Scalar};
use serde::Serialize;
use serde_json::Value;

use crate::config::DeploymentMode;

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Server identity from the `about` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub haystack_version: Option<String>,
    pub server_name: Option<String>,
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
}

/// Connection status as seen by a probe of the `about` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Mode in effect after the probe (a hybrid probe may have switched it).
    pub mode: DeploymentMode,
    pub endpoint: String,
    /// `connected`, or `error: <message>`.
    pub status: String,
    pub available_ops: Vec<String>,
    pub using_relay: bool,
    pub tls_enabled: bool,
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// One point from a `read`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSummary {
    pub id: String,
    pub dis: Option<String>,
    pub cur_val: Scalar,
    pub unit: Option<String>,
    /// Remaining non-null tag names.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResult {
    pub filter: String,
    pub count: usize,
    pub points: Vec<PointSummary>,
}

/// Acknowledgement of a `pointWrite`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    pub point_id: String,
    pub value: Value,
    pub level: u8,
    /// Override duration as sent, e.g. `30min`.
    pub duration: Option<String>,
}

/// Current values for one id of a batch read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPoint {
    pub dis: Option<String>,
    pub cur_val: Scalar,
    pub unit: Option<String>,
    /// `ok` when the controller reports no status.
    pub cur_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReadResult {
    pub requested: usize,
    pub found: usize,
    pub points: BTreeMap<String, BatchPoint>,
}

/// Rows of an arbitrary filter, undecorated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    pub filter: String,
    /// Rows the controller returned, before truncation.
    pub count: usize,
    pub results: Vec<Row>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySample {
    pub ts: Scalar,
    pub val: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResult {
    pub point_id: String,
    pub range: String,
    pub count: usize,
    pub data: Vec<HistorySample>,
}

// ---------------------------------------------------------------------------
// Watches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSubscription {
    pub watch_id: String,
    pub filter: String,
    pub lease_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchUpdate {
    pub id: String,
    pub cur_val: Scalar,
    pub cur_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchPollResult {
    pub watch_id: String,
    pub count: usize,
    pub updates: Vec<WatchUpdate>,
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    /// Absent for leaves that cannot be navigated further.
    pub nav_id: Option<String>,
    pub dis: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavResult {
    /// The requested nav id, or `root`.
    pub current_nav_id: String,
    pub count: usize,
    pub items: Vec<NavItem>,
}

// ---------------------------------------------------------------------------
// Alarms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSummary {
    pub id: String,
    pub dis: Option<String>,
    pub alarm_class: Option<String>,
    /// Lower is more urgent.
    pub priority: Option<f64>,
    pub acked: bool,
    pub normal_time: Option<String>,
    pub ack_time: Option<String>,
    /// Id of the equipment the alarm belongs to.
    pub equipment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmReport {
    pub count: usize,
    pub active_count: usize,
    /// Unacknowledged first, then by ascending priority.
    pub alarms: Vec<AlarmSummary>,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointPreview {
    pub id: String,
    pub dis: Option<String>,
    pub cur_val: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub id: String,
    pub dis: Option<String>,
    pub site_ref: Option<String>,
    pub tags: Vec<String>,
    /// Points read for this equipment, when points were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<PointPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentReport {
    pub count: usize,
    pub equipment: Vec<EquipmentSummary>,
}
