//! Boot-time WiFi handling, reconnection and endpoint failover.

use crate::mock_hw::*;
use medibox::app::events::AppEvent;
use medibox::app::service::Controller;
use medibox::config::DeviceConfig;
use medibox::error::Error;
use medibox::net::session::Endpoint;

/// Reminder polling stays idle while the clock is unsynced, keeping the
/// health-check timeline free of fetch retries.
fn quiet_net() -> MockNet {
    let mut net = MockNet::new();
    net.unix_time = Err(Error::TimeSyncFailure);
    net
}

fn failover_config() -> DeviceConfig {
    DeviceConfig {
        wifi_ssid: "ClinicNet".into(),
        backup_url: BACKUP.into(),
        server_check_interval_ms: 60_000,
        ..DeviceConfig::default()
    }
}

#[test]
fn boot_without_access_point_times_out_and_carries_on() {
    let mut c = Controller::new(DeviceConfig { wifi_ssid: "ClinicNet".into(), ..DeviceConfig::default() }, 0);
    let (mut board, mut net, mut log) = (MockBoard::new(), MockNet::no_ap(), EventLog::default());
    c.boot(&mut board, &mut net, &mut log).unwrap();

    assert_eq!(net.joins, 1);
    assert!(board.shown("Timeout: 15s"));
    assert!(board.shown("Timeout: 1s"));
    assert!(board.shown("ClinicNet"));
    assert!(board.shown("WiFi Error"));
    // Splash, fifteen one-second polls, timeout notice.
    assert_eq!(board.now, 2000 + 15_000 + 2000);
    assert_eq!(log.0, vec![AppEvent::WifiTimeout, AppEvent::Started { box_id: "protobox".into() }]);
    assert!(!c.clock().is_synchronized());
    assert_eq!(board.last_frame().line(1), "ID: protobox");
}

#[test]
fn boot_associates_and_syncs_clock() {
    let mut c = Controller::new(DeviceConfig::default(), 0);
    let (mut board, mut net, mut log) = (MockBoard::new(), MockNet::new(), EventLog::default());
    net.link_up = false;
    c.boot(&mut board, &mut net, &mut log).unwrap();

    assert!(board.shown("WiFi Connected"));
    assert!(board.shown("IP: 192.168.43.17"));
    assert!(log.0.contains(&AppEvent::WifiConnected));
    assert!(log.0.contains(&AppEvent::ClockSynced));
    assert!(c.clock().is_synchronized());
}

#[test]
fn lost_link_is_restored_before_publishing() {
    let mut c = Controller::new(DeviceConfig::default(), 0);
    let (mut board, mut net, mut log) = (MockBoard::new(), MockNet::new(), EventLog::default());
    net.answer(&format!("{BASE}/send_data"), 200, "{}");
    run_until(&mut c, &mut board, &mut net, &mut log, 5000);

    net.link_up = false;
    run_until(&mut c, &mut board, &mut net, &mut log, 12_000);

    assert_eq!(net.joins, 1);
    assert!(log.0.contains(&AppEvent::WifiConnected));
    assert_eq!(net.calls_to(&format!("{BASE}/send_data")).len(), 1);
}

#[test]
fn unreachable_primary_fails_over_to_backup() {
    let mut c = Controller::new(failover_config(), 0);
    let (mut board, mut net, mut log) = (MockBoard::new(), quiet_net(), EventLog::default());
    net.unreachable(&format!("{BASE}/"));
    net.answer(&format!("{BACKUP}/"), 200, "OK");
    net.answer(&format!("{BACKUP}/send_data"), 200, "{}");
    run_until(&mut c, &mut board, &mut net, &mut log, 70_100);

    assert!(log.0.contains(&AppEvent::EndpointSwitched(Endpoint::Backup)));
    assert_eq!(c.session().active_endpoint(), Endpoint::Backup);
    assert_eq!(net.calls_to(&format!("{BACKUP}/send_data")).len(), 1);

    // A healthy backup keeps the box there.
    run_until(&mut c, &mut board, &mut net, &mut log, 120_100);
    assert_eq!(net.calls_to(&format!("{BACKUP}/")).len(), 1);
    assert_eq!(c.session().active_endpoint(), Endpoint::Backup);
    assert_eq!(log.count(|e| matches!(e, AppEvent::EndpointSwitched(_))), 1);
}

#[test]
fn error_status_is_not_a_failover() {
    let mut c = Controller::new(failover_config(), 0);
    let (mut board, mut net, mut log) = (MockBoard::new(), quiet_net(), EventLog::default());
    net.answer(&format!("{BASE}/"), 500, "");
    run_until(&mut c, &mut board, &mut net, &mut log, 60_100);

    assert_eq!(net.calls_to(&format!("{BASE}/")).len(), 1);
    assert_eq!(c.session().active_endpoint(), Endpoint::Primary);
}
