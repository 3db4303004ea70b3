//! Wall-clock time for the display and reminder matching.
//!
//! The box has no RTC battery, so wall time exists only after a successful
//! network time fetch. [`DeviceClock`] remembers the Unix time it received
//! and the monotonic instant it received it at, and extrapolates from there.
//! It resyncs once per `sync_interval`, or on every attempt while it has
//! never synced. A failed sync leaves the previous state untouched.
//!
//! Until the first sync every formatted value is a fixed placeholder
//! (`"00:00"`, `"00/00/0000"`). Callers must read those as "unknown", never
//! as midnight; [`DeviceClock::time_of_day`] returns `None` instead.

use core::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use log::{info, warn};

use crate::app::ports::TimeSource;
use crate::reminder::TimeOfDay;
use crate::scheduler::elapsed_ms;

pub const TIME_PLACEHOLDER: &str = "00:00";
pub const DATE_PLACEHOLDER: &str = "00/00/0000";

pub type TimeString = heapless::String<5>;
pub type DateString = heapless::String<10>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncPoint {
    unix_secs: i64,
    mono_ms: u32,
}

pub struct DeviceClock {
    last_sync: Option<SyncPoint>,
    sync_interval_ms: u32,
    timezone_offset_secs: i32,
}

impl DeviceClock {
    pub fn new(sync_interval_secs: u32, timezone_offset_secs: i32) -> Self {
        Self {
            last_sync: None,
            sync_interval_ms: sync_interval_secs.saturating_mul(1000),
            timezone_offset_secs,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        self.last_sync.is_some()
    }

    /// Whether a sync attempt is due at `now_ms`.
    pub fn sync_due(&self, now_ms: u32) -> bool {
        match self.last_sync {
            None => true,
            Some(p) => elapsed_ms(now_ms, p.mono_ms) > self.sync_interval_ms,
        }
    }

    /// Resync from `source` if due and `online`. Returns `true` on a fresh
    /// successful sync.
    pub fn maybe_sync(&mut self, now_ms: u32, source: &mut impl TimeSource, online: bool) -> bool {
        if !online || !self.sync_due(now_ms) {
            return false;
        }
        match source.fetch_unix_time() {
            Ok(unix_secs) => {
                self.last_sync = Some(SyncPoint { unix_secs, mono_ms: now_ms });
                info!("Time synchronized (unix={})", unix_secs);
                true
            }
            Err(e) => {
                warn!("Time sync failed: {}", e);
                false
            }
        }
    }

    /// Local (offset-adjusted) date-time, or `None` before the first sync.
    pub fn local_datetime(&self, now_ms: u32) -> Option<NaiveDateTime> {
        let p = self.last_sync?;
        let since_sync = i64::from(elapsed_ms(now_ms, p.mono_ms) / 1000);
        let local = p.unix_secs + since_sync + i64::from(self.timezone_offset_secs);
        DateTime::from_timestamp(local, 0).map(|dt| dt.naive_utc())
    }

    pub fn time_of_day(&self, now_ms: u32) -> Option<TimeOfDay> {
        let dt = self.local_datetime(now_ms)?;
        TimeOfDay::new(dt.hour() as u8, dt.minute() as u8)
    }

    /// `"HH:MM"`, or [`TIME_PLACEHOLDER`].
    pub fn now(&self, now_ms: u32) -> TimeString {
        let mut s = TimeString::new();
        match self.local_datetime(now_ms) {
            Some(dt) => {
                let _ = write!(s, "{:02}:{:02}", dt.hour(), dt.minute());
            }
            None => {
                let _ = s.push_str(TIME_PLACEHOLDER);
            }
        }
        s
    }

    /// `"DD/MM/YYYY"`, or [`DATE_PLACEHOLDER`].
    pub fn today(&self, now_ms: u32) -> DateString {
        let mut s = DateString::new();
        match self.local_datetime(now_ms) {
            Some(dt) => {
                let _ = write!(s, "{:02}/{:02}/{:04}", dt.day(), dt.month(), dt.year());
            }
            None => {
                let _ = s.push_str(DATE_PLACEHOLDER);
            }
        }
        s
    }
}
