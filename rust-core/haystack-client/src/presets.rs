// SPDX-License-Identifier: PMPL-1.0-or-later
//! Catalogue of commonly used Haystack filters.

use std::collections::BTreeMap;

use crate::client::HaystackClient;

/// Filter presets grouped by category.
pub type FilterPresets = BTreeMap<&'static str, BTreeMap<&'static str, &'static str>>;

const PRESETS: &[(&str, &[(&str, &str)])] = &[
    (
        "basic_queries",
        &[
            ("all_points", "point"),
            ("sensor_points", "point and sensor"),
            ("writable_points", "point and writable"),
            ("command_points", "point and cmd"),
        ],
    ),
    (
        "sensor_types",
        &[
            ("temperature", "point and temp and sensor"),
            ("humidity", "point and humidity and sensor"),
            ("pressure", "point and pressure and sensor"),
            ("co2", "point and co2 and sensor"),
            ("occupancy", "point and occ and sensor"),
        ],
    ),
    (
        "equipment_types",
        &[
            ("all_equipment", "equip"),
            ("vav_boxes", "equip and vav"),
            ("ahu_units", "equip and ahu"),
            ("chillers", "equip and chiller"),
            ("boilers", "equip and boiler"),
            ("meters", "equip and meter"),
        ],
    ),
    (
        "hierarchy",
        &[
            ("sites", "site"),
            ("floors", "floor"),
            ("zones", "space and zone"),
            ("rooms", "space and room"),
        ],
    ),
    (
        "system_status",
        &[
            ("alarms", "alarm"),
            ("active_alarms", "alarm and not acked"),
            ("high_priority_alarms", "alarm and priority < 3"),
            ("faults", "point and fault"),
        ],
    ),
    (
        "setpoints",
        &[
            ("zone_temps", "point and sp and temp and zone"),
            ("ahu_setpoints", "point and sp and ahu"),
            ("schedule_setpoints", "point and sp and scheduled"),
        ],
    ),
];

impl HaystackClient {
    /// Common filter expressions, for callers building queries interactively.
    pub fn filter_presets() -> FilterPresets {
        PRESETS
            .iter()
            .map(|(group, filters)| (*group, filters.iter().copied().collect()))
            .collect()
    }
}
