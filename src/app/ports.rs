//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (ADC, DHT11, GPIO, LEDC, SSD1306, WiFi, HTTP, SNTP)
//! implement these traits. The [`Controller`](super::service::Controller)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every component can be exercised against a fake board with
//! a simulated clock.

use crate::display::Frame;
use crate::error::Result;
use crate::sensors::EnvReading;

// ───────────────────────────────────────────────────────────────
// Board ports (local peripherals)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock plus the cooperative sleep used by every
/// bounded wait. The counter is allowed to wrap.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
    fn delay_ms(&mut self, ms: u32);
}

/// Raw ambient-light sample (12-bit ADC, 0–4095).
pub trait LightSensorPort {
    fn read_light(&mut self) -> u16;
}

/// Combined temperature/humidity sensor. A failed read is
/// [`Error::SensorUnavailable`](crate::error::Error::SensorUnavailable).
pub trait EnvironmentSensorPort {
    fn read_environment(&mut self) -> Result<EnvReading>;
}

/// The two physical momentary buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left button: "yes" / OK.
    Confirm,
    /// Right button: "no".
    Deny,
}

/// Raw button line levels. Buttons are active-low: `true` means pressed
/// at this instant, before any debouncing.
pub trait ButtonPort {
    fn is_low(&mut self, button: Button) -> bool;
}

/// Per-dose indicator LEDs.
pub trait IndicatorPort {
    fn indicator_count(&self) -> usize;
    fn set_indicator(&mut self, index: usize, on: bool);
}

/// PWM buzzer. `duty` is 0–1023; 0 silences it.
pub trait BuzzerPort {
    fn set_buzzer_duty(&mut self, duty: u16);
}

/// Four-line text display.
pub trait DisplayPort {
    fn show(&mut self, frame: &Frame) -> Result<()>;
}

/// Everything local to the box, as one object.
///
/// Mirrors how the controller is wired on target: a single hardware adapter
/// satisfies all board ports, which avoids juggling several mutable borrows
/// inside bounded waits that poll buttons while sleeping.
pub trait Board:
    MonotonicClock
    + LightSensorPort
    + EnvironmentSensorPort
    + ButtonPort
    + IndicatorPort
    + BuzzerPort
    + DisplayPort
{
}

impl<T> Board for T where
    T: MonotonicClock
        + LightSensorPort
        + EnvironmentSensorPort
        + ButtonPort
        + IndicatorPort
        + BuzzerPort
        + DisplayPort
{
}

// ───────────────────────────────────────────────────────────────
// Network ports
// ───────────────────────────────────────────────────────────────

/// WiFi station association.
pub trait WifiPort {
    /// Whether the station is currently associated and has an address.
    fn is_associated(&mut self) -> bool;
    /// Kick off association. Returns immediately; poll [`is_associated`].
    ///
    /// [`is_associated`]: WifiPort::is_associated
    fn begin_association(&mut self) -> Result<()>;
    fn local_ip(&self) -> Option<[u8; 4]>;
}

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Blocking request/response HTTP client. Transport failures are
/// [`Error::EndpointUnreachable`](crate::error::Error::EndpointUnreachable);
/// any status code is returned as a response, not an error.
pub trait HttpPort {
    fn get(&mut self, url: &str) -> Result<HttpResponse>;
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse>;
}

/// Network time source (SNTP on target).
pub trait TimeSource {
    /// Current UTC time as Unix seconds, or
    /// [`Error::TimeSyncFailure`](crate::error::Error::TimeSyncFailure).
    fn fetch_unix_time(&mut self) -> Result<i64>;
}

/// Everything reached over the air, as one object.
pub trait Network: WifiPort + HttpPort + TimeSource {}

impl<T> Network for T where T: WifiPort + HttpPort + TimeSource {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
