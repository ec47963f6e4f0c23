// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for the Zinc grid decoder.
// Run with: cargo +nightly fuzz run fuzz_zinc_grid
//
// Any UTF-8 body must either decode or be rejected with an error, and a
// decoded grid must hold exactly its columns in every row.

#![no_main]

use haystack_grid::decode_zinc;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        if let Ok(grid) = decode_zinc(body) {
            for row in grid.rows() {
                assert_eq!(row.len(), grid.columns().len());
            }
        }
    }
});
