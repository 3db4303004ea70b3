//! Reminder polling, activation, delivery acknowledgement and clearing,
//! driven through the controller against a scripted server.

use crate::mock_hw::*;
use medibox::app::events::{AppEvent, ClearReason};
use medibox::app::ports::Button;
use medibox::app::service::Controller;
use medibox::config::DeviceConfig;
use medibox::display::DisplayMode;
use medibox::error::Error;
use medibox::reminder::ReminderKind;

const SCHEDULE: &str = r#"{
    "has_reminder": true,
    "medicine_times": [{"time": "08:32", "message": "Take Aspirin"}],
    "meal_times": [{"time": "12:30", "message": "Lunch"}],
    "explanation": "daily plan",
    "_id": "r-17"
}"#;

fn reminders_url() -> String {
    format!("{BASE}/get_minimal_reminders/protobox")
}

fn ack_url() -> String {
    format!("{BASE}/acknowledge_reminder")
}

fn setup(schedule: &str) -> (Controller, MockBoard, MockNet, EventLog) {
    let mut net = MockNet::new();
    net.answer(&reminders_url(), 200, schedule);
    net.answer(&ack_url(), 200, "{}");
    (Controller::new(DeviceConfig::default(), 0), MockBoard::new(), net, EventLog::default())
}

fn activation(log: &EventLog) -> Option<(ReminderKind, String)> {
    log.0.iter().find_map(|e| match e {
        AppEvent::ReminderActivated { kind, time } => Some((*kind, time.clone())),
        _ => None,
    })
}

#[test]
fn medicine_reminder_activates_and_is_acknowledged() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert_eq!(activation(&log), Some((ReminderKind::Medicine, "08:32".into())));
    assert_eq!(c.display_mode(), DisplayMode::Reminder);

    let f = board.last_frame();
    assert_eq!(f.line(0), "!! REMINDER !!");
    assert_eq!(f.line(1), "Take Aspirin");
    assert_eq!(f.line(2), "At: 08:32");
    assert_eq!(f.line(3), "Press OK");

    let acks = net.calls_to(&ack_url());
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].method, "POST");
    assert_eq!(acks[0].body, r#"{"reminder_id":"r-17"}"#);
    assert!(log.0.contains(&AppEvent::ReminderDelivered));
    assert!(c.reminders().active().is_some_and(|r| r.acknowledged));

    // Loud two-second medicine tone.
    assert_eq!(board.buzzer_writes.iter().find(|&&(at, _)| at == 30_000), Some(&(30_000, 768)));
}

#[test]
fn icon_blinks_while_reminder_is_up() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    run_until(&mut c, &mut board, &mut net, &mut log, 32_100);

    let headers: Vec<&str> = board
        .frames
        .iter()
        .map(|f| f.line(0))
        .filter(|l| l.contains("REMINDER"))
        .collect();
    assert_eq!(headers, ["!! REMINDER !!", "   REMINDER   ", "!! REMINDER !!", "   REMINDER   ", "!! REMINDER !!"]);
}

#[test]
fn confirm_clears_reminder_with_short_buzz() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    board.press(Button::Confirm, 33_000, 400);
    run_until(&mut c, &mut board, &mut net, &mut log, 34_000);

    assert!(log.0.contains(&AppEvent::ReminderCleared(ClearReason::Confirmed)));
    assert!(!c.reminders().is_active());
    assert_eq!(c.display_mode(), DisplayMode::Clock);
    assert_eq!(board.buzzes(), vec![(30_000, 2000), (33_300, 100)]);
}

#[test]
fn unanswered_reminder_expires() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    run_until(&mut c, &mut board, &mut net, &mut log, 49_900);
    assert!(c.reminders().is_active());

    run_until(&mut c, &mut board, &mut net, &mut log, 50_100);
    assert!(log.0.contains(&AppEvent::ReminderCleared(ClearReason::Expired)));
    assert_eq!(c.display_mode(), DisplayMode::Clock);
    assert!(board.last_frame().line(0).starts_with("Time: "));
}

#[test]
fn meal_reminder_uses_default_text() {
    let schedule = r#"{"has_reminder": true, "meal_times": [{"time": "08.28"}]}"#;
    let (mut c, mut board, mut net, mut log) = setup(schedule);
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert_eq!(activation(&log), Some((ReminderKind::Meal, "08:28".into())));
    let f = board.last_frame();
    assert_eq!(f.line(0), ">> REMINDER >>");
    assert_eq!(f.line(1), "Time to eat");
    // No `_id` in the schedule: the ack still goes out with a null id.
    assert_eq!(net.calls_to(&ack_url())[0].body, r#"{"reminder_id":null}"#);
}

#[test]
fn far_away_times_do_not_match() {
    let schedule = r#"{"has_reminder": true, "medicine_times": [{"time": "08:36"}, {"time": "bogus"}]}"#;
    let (mut c, mut board, mut net, mut log) = setup(schedule);
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert_eq!(activation(&log), None);
    assert_eq!(c.display_mode(), DisplayMode::Clock);
    assert!(net.calls_to(&ack_url()).is_empty());
}

#[test]
fn inactive_schedule_is_ignored() {
    let schedule = r#"{"has_reminder": false, "medicine_times": [{"time": "08:30"}]}"#;
    let (mut c, mut board, mut net, mut log) = setup(schedule);
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);
    assert_eq!(activation(&log), None);
}

#[test]
fn no_poll_before_clock_sync() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    net.unix_time = Err(Error::TimeSyncFailure);
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert!(net.calls_to(&reminders_url()).is_empty());
    assert!(!c.clock().is_synchronized());
}

#[test]
fn unreachable_server_is_retried_then_reported() {
    let (mut c, mut board, mut net, mut log) = setup(SCHEDULE);
    net.unreachable(&reminders_url());
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert_eq!(net.calls_to(&reminders_url()).len(), 3);
    assert!(board.shown("Attempt 1/3"));
    assert!(board.shown("Attempt 2/3"));
    assert!(board.shown("Will retry later"));
    assert_eq!(activation(&log), None);
}

#[test]
fn malformed_schedule_is_not_retried() {
    let (mut c, mut board, mut net, mut log) = setup("<html>oops</html>");
    run_until(&mut c, &mut board, &mut net, &mut log, 30_100);

    assert_eq!(net.calls_to(&reminders_url()).len(), 1);
    assert!(board.shown("Invalid data"));
    assert_eq!(activation(&log), None);
}
