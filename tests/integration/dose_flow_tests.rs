//! Lid open/close cycles through the full controller: indicators, prompt,
//! dose slate and the acknowledged-publish reset.

use crate::mock_hw::*;
use medibox::app::events::AppEvent;
use medibox::app::ports::Button;
use medibox::app::service::Controller;
use medibox::config::DeviceConfig;
use medibox::display::DisplayMode;

fn setup() -> (Controller, MockBoard, MockNet, EventLog) {
    (Controller::new(DeviceConfig::default(), 0), MockBoard::new(), MockNet::new(), EventLog::default())
}

/// Open at `at`, close one second later, confirm 200 ms into the prompt.
fn take_dose(board: &mut MockBoard, at: u32) {
    board.open_lid(at, 1000);
    board.press(Button::Confirm, at + 1200, 400);
}

#[test]
fn open_shows_live_box_screen() {
    let (mut c, mut board, mut net, mut log) = setup();
    board.light_at(2000, 1200);
    run_until(&mut c, &mut board, &mut net, &mut log, 2500);

    assert_eq!(c.display_mode(), DisplayMode::Box);
    let f = board.last_frame();
    assert_eq!(f.line(0), "Temp: 24.5C");
    assert_eq!(f.line(1), "Humidity: 55%");
    assert_eq!(f.line(2), "LDR: 1200");
    assert_eq!(f.line(3), "Box: OPEN");
}

#[test]
fn five_doses_then_slate_is_full() {
    let (mut c, mut board, mut net, mut log) = setup();
    for i in 0..6 {
        take_dose(&mut board, 2000 + i * 4000);
    }
    run_until(&mut c, &mut board, &mut net, &mut log, 26_000);

    let untaken: Vec<usize> = log
        .0
        .iter()
        .filter_map(|e| match e {
            AppEvent::LidOpened { untaken } => Some(*untaken),
            _ => None,
        })
        .collect();
    assert_eq!(untaken, vec![4, 3, 2, 1, 0, 0]);

    assert_eq!(log.count(|e| matches!(e, AppEvent::DoseConfirmed { .. })), 5);
    assert_eq!(log.count(|e| *e == AppEvent::DoseSlateExhausted), 1);
    assert!(log.0.contains(&AppEvent::DoseConfirmed { slot: 4, count: 5 }));
    assert_eq!(c.slate().confirmed_count(), 5);
    assert!(board.shown("already taken"));
    // Rejected confirm gets the long buzz.
    assert_eq!(board.buzzes().last().map(|&(_, len)| len), Some(500));
    assert_eq!(c.display_mode(), DisplayMode::Clock);
}

#[test]
fn repeated_confirms_count_once_per_close() {
    let (mut c, mut board, mut net, mut log) = setup();
    board.open_lid(2000, 1000);
    for at in [3200, 5000, 8000] {
        board.press(Button::Confirm, at, 400);
    }
    run_until(&mut c, &mut board, &mut net, &mut log, 14_000);

    assert_eq!(log.count(|e| *e == AppEvent::LidClosed), 1);
    assert_eq!(log.count(|e| matches!(e, AppEvent::DoseConfirmed { .. })), 1);
    assert_eq!(c.slate().confirmed_count(), 1);
    assert!(c.slate().is_taken(0));
    assert!(!c.slate().is_taken(1));
}

#[test]
fn deny_leaves_slate_alone() {
    let (mut c, mut board, mut net, mut log) = setup();
    board.open_lid(2000, 1000);
    board.press(Button::Deny, 3200, 400);
    run_until(&mut c, &mut board, &mut net, &mut log, 6000);

    assert!(log.0.contains(&AppEvent::DoseDenied));
    assert_eq!(c.slate().confirmed_count(), 0);
    assert!(board.shown("Don't forget"));
    assert_eq!(board.buzzes(), vec![(2000, 300), (3500, 500)]);
    assert_eq!(c.display_mode(), DisplayMode::Clock);
}

#[test]
fn unanswered_prompt_times_out() {
    let (mut c, mut board, mut net, mut log) = setup();
    board.open_lid(2000, 1000);
    run_until(&mut c, &mut board, &mut net, &mut log, 14_000);

    assert!(log.0.contains(&AppEvent::PromptTimedOut));
    assert_eq!(c.slate().confirmed_count(), 0);
    assert_eq!(board.buzzes(), vec![(2000, 300)]);
    assert_eq!(c.display_mode(), DisplayMode::Clock);
    assert_eq!(board.lit(), 0);
}

#[test]
fn acknowledged_publish_resets_slate() {
    let (mut c, mut board, mut net, mut log) = setup();
    let send = format!("{BASE}/send_data");
    net.answer(&send, 200, "{\"status\":\"ok\"}");
    take_dose(&mut board, 2000);
    take_dose(&mut board, 5000);
    board.light_at(12_000, 1200);
    run_until(&mut c, &mut board, &mut net, &mut log, 12_500);

    let posts = net.calls_to(&send);
    assert_eq!(posts.len(), 1);
    assert!(posts[0].body.contains("\"medicine_taken\":true"));
    assert!(posts[0].body.contains("\"box_id\":\"protobox\""));
    assert!(log.0.contains(&AppEvent::TelemetrySent { status: 200, medicine_taken: true, acked: true }));

    assert_eq!(c.slate().confirmed_count(), 0);
    assert_eq!(board.lit(), 4);
}

#[test]
fn rejected_publish_reports_the_same_doses_again() {
    let (mut c, mut board, mut net, mut log) = setup();
    let send = format!("{BASE}/send_data");
    net.answer(&send, 503, "");
    take_dose(&mut board, 2000);
    run_until(&mut c, &mut board, &mut net, &mut log, 20_500);

    let posts = net.calls_to(&send);
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.body.contains("\"medicine_taken\":true")));
    assert_eq!(c.slate().confirmed_count(), 1);
}
