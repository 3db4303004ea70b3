//! Device configuration parameters
//!
//! All tunable parameters for the MediBox controller: identity, network
//! endpoints, sensor thresholds and every loop interval. Defaults match the
//! deployed boxes; the target binary overrides credentials and endpoints at
//! build time.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of dose slots tracked per slate generation.
pub const SLATE_SIZE: usize = 5;

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Identity ---
    /// Box identifier reported in telemetry and used for reminder lookup
    pub box_id: String,

    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Base URL of the primary server, e.g. `http://192.168.1.10:8080`
    pub primary_url: String,
    /// Base URL used after a failed health check
    pub backup_url: String,
    /// Bounded wait for WiFi association (seconds)
    pub wifi_connect_timeout_secs: u32,
    /// Consecutive health-check transport failures before switching endpoint
    pub failover_after_failures: u8,

    // --- Sensors / inputs ---
    /// Light level above which the lid is considered open (0-4095)
    pub ldr_open_threshold: u16,
    /// Minimum continuous assertion for a button press (milliseconds)
    pub debounce_ms: u32,
    /// How long the close prompt waits for an answer (milliseconds)
    pub confirm_timeout_ms: u32,

    // --- Clock ---
    /// Network time resync interval (seconds)
    pub sync_interval_secs: u32,
    /// Fixed offset applied before formatting wall-clock time (seconds)
    pub utc_offset_secs: i32,

    // --- Reminders ---
    pub reminder_check_interval_ms: u32,
    pub reminder_display_duration_ms: u32,
    /// Allowed distance between schedule time and current time (minutes)
    pub time_match_tolerance_min: u16,
    pub reminder_fetch_attempts: u8,
    pub reminder_retry_delay_ms: u32,

    // --- Timing ---
    pub sensor_update_interval_ms: u32,
    pub server_check_interval_ms: u32,
    pub display_update_interval_ms: u32,
    pub blink_interval_ms: u32,
    pub status_display_duration_ms: u32,
    /// How long confirmation feedback stays on screen (milliseconds)
    pub feedback_hold_ms: u32,
    /// Main loop yield between iterations (milliseconds)
    pub loop_yield_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            box_id: "protobox".into(),

            wifi_ssid: String::new(),
            wifi_password: String::new(),
            primary_url: "http://192.168.43.229:8080".into(),
            backup_url: "http://192.168.43.229:8080".into(),
            wifi_connect_timeout_secs: 15,
            failover_after_failures: 1,

            ldr_open_threshold: 1000,
            debounce_ms: 300,
            confirm_timeout_ms: 10_000,

            sync_interval_secs: 3600,  // 1 h
            utc_offset_secs: 7 * 3600, // UTC+7

            reminder_check_interval_ms: 30_000,
            reminder_display_duration_ms: 20_000,
            time_match_tolerance_min: 5,
            reminder_fetch_attempts: 3,
            reminder_retry_delay_ms: 2000,

            sensor_update_interval_ms: 10_000,
            server_check_interval_ms: 3_600_000,
            display_update_interval_ms: 1000,
            blink_interval_ms: 500,
            status_display_duration_ms: 5000,
            feedback_hold_ms: 1000,
            loop_yield_ms: 100,
        }
    }
}

impl DeviceConfig {
    /// Reject values that would wedge the controller. Never clamps.
    pub fn validate(&self) -> Result<()> {
        if self.box_id.is_empty() {
            return Err(Error::Config("box_id"));
        }
        if self.primary_url.is_empty() || self.backup_url.is_empty() {
            return Err(Error::Config("endpoint url"));
        }
        let intervals = [
            self.reminder_check_interval_ms,
            self.reminder_display_duration_ms,
            self.sensor_update_interval_ms,
            self.server_check_interval_ms,
            self.display_update_interval_ms,
            self.blink_interval_ms,
        ];
        if intervals.contains(&0) || self.sync_interval_secs == 0 {
            return Err(Error::Config("interval must be non-zero"));
        }
        if self.time_match_tolerance_min > 720 {
            return Err(Error::Config("time_match_tolerance_min"));
        }
        if self.reminder_fetch_attempts == 0 {
            return Err(Error::Config("reminder_fetch_attempts"));
        }
        if self.failover_after_failures == 0 {
            return Err(Error::Config("failover_after_failures"));
        }
        Ok(())
    }
}

/// Values baked in at build time through `MEDIBOX_*` environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOverrides {
    pub box_id: Option<&'static str>,
    pub wifi_ssid: Option<&'static str>,
    pub wifi_password: Option<&'static str>,
    pub primary_url: Option<&'static str>,
    pub backup_url: Option<&'static str>,
}

impl BuildOverrides {
    pub const fn from_env() -> Self {
        Self {
            box_id: option_env!("MEDIBOX_BOX_ID"),
            wifi_ssid: option_env!("MEDIBOX_WIFI_SSID"),
            wifi_password: option_env!("MEDIBOX_WIFI_PASSWORD"),
            primary_url: option_env!("MEDIBOX_PRIMARY_URL"),
            backup_url: option_env!("MEDIBOX_BACKUP_URL"),
        }
    }
}

impl DeviceConfig {
    /// Replace fields with whatever overrides are present. A backup URL
    /// that is not given follows the primary one.
    pub fn with_overrides(mut self, o: &BuildOverrides) -> Self {
        if let Some(v) = o.box_id {
            self.box_id = v.into();
        }
        if let Some(v) = o.wifi_ssid {
            self.wifi_ssid = v.into();
        }
        if let Some(v) = o.wifi_password {
            self.wifi_password = v.into();
        }
        if let Some(v) = o.primary_url {
            self.primary_url = v.into();
            self.backup_url = v.into();
        }
        if let Some(v) = o.backup_url {
            self.backup_url = v.into();
        }
        self
    }
}
