//! Fuzz target for date and time reconstruction.
//!
//! Date/time parsing must never panic, and a parsed timestamp always
//! yields a time-of-day bucket.

#![no_main]

use libfuzzer_sys::fuzz_target;
use roadrisk::normalize::temporal::{parse_date_str, parse_time_str, reconstruct, time_of_day};
use roadrisk::Value;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let (date, time) = content.split_once('|').unwrap_or((content, ""));
        let _ = parse_date_str(date);
        let _ = parse_time_str(time);

        let stamp = reconstruct(Some(&Value::text(date)), Some(&Value::text(time)));
        assert!(time_of_day(stamp.as_ref()).is_some());
    }
});
