//! Fuzz target: reminder schedule payloads from the server
//!
//! Feeds arbitrary bytes through `ReminderResponse::parse`, then matches
//! every accepted schedule against a spread of times of day and renders the
//! matched message as an error notice.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A match only ever comes from an active schedule
//! - Notice lines never exceed 16 characters
//!
//! cargo fuzz run fuzz_reminder_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use medibox::display::notice;
use medibox::net::api::{AckRequest, ReminderResponse, to_body};
use medibox::reminder::{DEFAULT_TOLERANCE_MIN, TimeOfDay, find_match};

fuzz_target!(|data: &[u8]| {
    let Ok(schedule) = ReminderResponse::parse(data) else {
        return;
    };

    for hour in (0..24).step_by(3) {
        let Some(now) = TimeOfDay::new(hour, 30) else {
            continue;
        };
        if let Some((_, entry, at)) = find_match(&schedule, now, DEFAULT_TOLERANCE_MIN) {
            assert!(schedule.has_reminder, "inactive schedule produced a match");
            assert!(at.minutes_apart(now) <= DEFAULT_TOLERANCE_MIN);

            let frame = notice::error(&entry.message);
            assert!(frame.lines().all(|l| l.chars().count() <= 16));
        }
    }

    let ack = AckRequest { reminder_id: schedule.id.clone() };
    assert!(to_body(&ack).is_ok());
});
