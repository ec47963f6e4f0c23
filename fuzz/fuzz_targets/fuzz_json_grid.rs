// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for the JSON grid decoder.
// Run with: cargo +nightly fuzz run fuzz_json_grid

#![no_main]

use haystack_grid::decode_json_grid;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(grid) = decode_json_grid(&value) {
        for row in grid.rows() {
            assert!(grid.columns().iter().all(|c| row.contains_key(c)));
        }
    }
});
