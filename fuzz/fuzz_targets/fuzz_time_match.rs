//! Fuzz target: `is_time_match` on arbitrary strings
//!
//! Splits the input into two UTF-8 strings and checks:
//! - No panics on any input
//! - Matching is symmetric
//! - Anything that matches parses as a valid time of day
//!
//! cargo fuzz run fuzz_time_match

#![no_main]

use libfuzzer_sys::fuzz_target;
use medibox::reminder::{TimeOfDay, is_time_match};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let (a, b) = text.split_once('|').unwrap_or((text, "12:00"));

    let m = is_time_match(a, b);
    assert_eq!(m, is_time_match(b, a), "asymmetric match for {a:?} / {b:?}");
    if m {
        assert!(TimeOfDay::parse(a).is_some() && TimeOfDay::parse(b).is_some());
    }
});
