//! Fuzz target for parsing and normalizing raw accident tables.
//!
//! Arbitrary bytes must never panic the parser, type inference or any
//! normalization step.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roadrisk::input::Parser;
use roadrisk::{Normalizer, Table};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    for delimiter in [b',', b'\t', b';'] {
        if let Ok(raw) = Parser::new().parse_bytes(data, delimiter) {
            let table = Table::from_raw(&raw);
            let (clean, report) = Normalizer::new().normalize(table);
            assert_eq!(clean.row_count(), report.rows_out);
        }
    }
});
