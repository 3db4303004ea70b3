//! ESP32 time adapters.
//!
//! - [`SystemClock`]: the monotonic millisecond counter and cooperative
//!   sleep behind [`MonotonicClock`].
//! - [`SntpTimeSource`]: wall-clock seconds once SNTP has completed,
//!   behind [`TimeSource`].
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()`, FreeRTOS
//!   delays and `EspSntp`.
//! - **`not(target_os = "espidf")`**: uses `std::time` for host-side
//!   testing and simulation.

use log::debug;

use crate::app::ports::{MonotonicClock, TimeSource};
use crate::error::{Error, Result};

/// Anything earlier than 2020-01-01 is an unsynced RTC, not real time.
pub const EPOCH_2020: i64 = 1_577_836_800;

/// Monotonic clock for the main loop.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl MonotonicClock for SystemClock {
    /// Milliseconds since boot, truncated to `u32` (wraps after ~49 days).
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Network time source.
pub struct SntpTimeSource {
    #[cfg(target_os = "espidf")]
    sntp: esp_idf_svc::sntp::EspSntp<'static>,
}

impl SntpTimeSource {
    /// Start the SNTP service against the default pool servers.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self> {
        let sntp = esp_idf_svc::sntp::EspSntp::new_default().map_err(|_| Error::TimeSyncFailure)?;
        Ok(Self { sntp })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self> {
        Ok(Self {})
    }

    #[cfg(target_os = "espidf")]
    fn platform_synced(&self) -> bool {
        self.sntp.get_sync_status() == esp_idf_svc::sntp::SyncStatus::Completed
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_synced(&self) -> bool {
        true
    }
}

impl TimeSource for SntpTimeSource {
    fn fetch_unix_time(&mut self) -> Result<i64> {
        if !self.platform_synced() {
            debug!("SNTP: not yet completed");
            return Err(Error::TimeSyncFailure);
        }
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|_| Error::TimeSyncFailure)?
            .as_secs() as i64;
        if secs < EPOCH_2020 {
            return Err(Error::TimeSyncFailure);
        }
        Ok(secs)
    }
}
