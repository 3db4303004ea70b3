//! Interval gating for the cooperative main loop.
//!
//! Every periodic activity (telemetry, reminder poll, health check, display
//! refresh) owns one [`IntervalGate`]. The gates are independent: an activity
//! fires when its own interval has elapsed since it last fired, so the actual
//! period stretches by whatever else ran that iteration but two firings of
//! the same activity never overlap.
//!
//! All arithmetic is on `u32` milliseconds with `wrapping_sub`, so the gates
//! survive the ~49.7 day monotonic counter wrap.

/// Milliseconds elapsed from `since` to `now`, safe across `u32` wraparound.
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Fires at most once per `interval_ms`.
#[derive(Debug, Clone, Copy)]
pub struct IntervalGate {
    interval_ms: u32,
    last_ms: u32,
}

impl IntervalGate {
    /// Create a gate whose first firing is one full interval after `now_ms`.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self { interval_ms, last_ms: now_ms }
    }

    /// Returns `true` and re-arms if the interval has elapsed.
    pub fn due(&mut self, now_ms: u32) -> bool {
        if elapsed_ms(now_ms, self.last_ms) < self.interval_ms {
            return false;
        }
        self.last_ms = now_ms;
        true
    }

    /// Restart the interval from `now_ms` without firing.
    pub fn rearm(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
