//! Network Session Manager.
//!
//! Owns WiFi association and the choice between the primary and backup
//! server. Every outbound call elsewhere in the firmware goes through
//! [`NetworkSession::ensure_connected`] first and is skipped for the cycle
//! when it returns `false`; nothing is queued.
//!
//! Failover is plain alternation: a failed hourly health check flips the
//! active endpoint to the other one. There is no notion of a "better"
//! server.

use core::fmt;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Board, EventSink, HttpPort, WifiPort};
use crate::config::DeviceConfig;
use crate::display::notice;
use crate::error::Result;
use crate::scheduler::IntervalGate;

/// Path probed by the health check.
pub const HEALTH_PATH: &str = "/";

const CONNECT_POLL_MS: u32 = 1000;
const CONNECTED_HOLD_MS: u32 = 1000;
const TIMEOUT_HOLD_MS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Primary,
    Backup,
}

impl Endpoint {
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Backup,
            Self::Backup => Self::Primary,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

pub struct NetworkSession {
    ssid: String,
    primary_url: String,
    backup_url: String,
    active: Endpoint,
    connected: bool,
    health_gate: IntervalGate,
    consecutive_failures: u8,
    failover_after: u8,
    connect_timeout_secs: u32,
}

impl NetworkSession {
    pub fn new(config: &DeviceConfig, now_ms: u32) -> Self {
        Self {
            ssid: config.wifi_ssid.clone(),
            primary_url: config.primary_url.trim_end_matches('/').to_string(),
            backup_url: config.backup_url.trim_end_matches('/').to_string(),
            active: Endpoint::Primary,
            connected: false,
            health_gate: IntervalGate::new(config.server_check_interval_ms, now_ms),
            consecutive_failures: 0,
            failover_after: config.failover_after_failures.max(1),
            connect_timeout_secs: config.wifi_connect_timeout_secs,
        }
    }

    pub fn active_endpoint(&self) -> Endpoint {
        self.active
    }

    /// Association state as of the last check.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn base_url(&self) -> &str {
        match self.active {
            Endpoint::Primary => &self.primary_url,
            Endpoint::Backup => &self.backup_url,
        }
    }

    /// Absolute URL for `path` on the active endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Re-read association state without trying to connect.
    pub fn refresh(&mut self, wifi: &mut impl WifiPort) -> bool {
        self.connected = wifi.is_associated();
        self.connected
    }

    /// Return `true` at once when associated. Otherwise start association
    /// and wait up to the connect timeout, one second per step, showing
    /// progress on the display.
    pub fn ensure_connected(
        &mut self,
        wifi: &mut impl WifiPort,
        board: &mut impl Board,
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        if self.refresh(wifi) {
            return Ok(true);
        }

        info!("Connecting to WiFi {}...", self.ssid);
        if let Err(e) = wifi.begin_association() {
            warn!("WiFi connect failed to start: {}", e);
        }

        let mut remaining = self.connect_timeout_secs;
        while remaining > 0 && !wifi.is_associated() {
            board.show(&notice::wifi_connecting(&self.ssid, remaining))?;
            board.delay_ms(CONNECT_POLL_MS);
            remaining -= 1;
        }

        if self.refresh(wifi) {
            info!("WiFi connected, IP: {:?}", wifi.local_ip());
            sink.emit(&AppEvent::WifiConnected);
            board.show(&notice::wifi_connected(wifi.local_ip()))?;
            board.delay_ms(CONNECTED_HOLD_MS);
            Ok(true)
        } else {
            warn!("WiFi connection timeout after {}s", self.connect_timeout_secs);
            sink.emit(&AppEvent::WifiTimeout);
            board.show(&notice::wifi_timeout())?;
            board.delay_ms(TIMEOUT_HOLD_MS);
            Ok(false)
        }
    }

    /// Hourly liveness probe of the active endpoint.
    ///
    /// When WiFi is down the slot is spent reconnecting instead. Transport
    /// failures count toward failover; any HTTP status, even an error one,
    /// proves the server is reachable.
    pub fn health_check(
        &mut self,
        now_ms: u32,
        net: &mut (impl WifiPort + HttpPort),
        board: &mut impl Board,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if !self.health_gate.due(now_ms) {
            return Ok(());
        }
        if !self.refresh(net) {
            self.ensure_connected(net, board, sink)?;
            return Ok(());
        }

        let url = self.url(HEALTH_PATH);
        info!("Checking server health: {}", url);
        match net.get(&url) {
            Ok(resp) => {
                self.consecutive_failures = 0;
                if resp.is_ok() {
                    info!("Server is functioning properly");
                } else {
                    warn!("Server responded with status {}", resp.status);
                }
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                warn!(
                    "Server {} not accessible ({}), failures={}",
                    self.active, e, self.consecutive_failures
                );
                if self.consecutive_failures >= self.failover_after {
                    self.switch_endpoint(sink);
                }
            }
        }
        Ok(())
    }

    /// Alternate between primary and backup.
    pub fn switch_endpoint(&mut self, sink: &mut impl EventSink) {
        self.active = self.active.other();
        self.consecutive_failures = 0;
        warn!("Switching to {} server: {}", self.active, self.base_url());
        sink.emit(&AppEvent::EndpointSwitched(self.active));
    }
}
