//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                      | Connects to                 |
//! |-------------|---------------------------------|-----------------------------|
//! | `hardware`  | every board port                | ADC, DHT11, GPIO, LEDC, OLED|
//! | `oled`      | DisplayPort                     | SSD1306 over I2C            |
//! | `wifi`      | WifiPort                        | ESP-IDF WiFi STA            |
//! | `http`      | HttpPort                        | ESP-IDF HTTP client         |
//! | `time`      | MonotonicClock, TimeSource      | esp_timer, SNTP             |
//! | `log_sink`  | EventSink                       | Serial log output           |
//! | `device_id` | (identity)                      | eFuse factory MAC           |
//!
//! Everything that touches ESP-IDF is gated on `target_os = "espidf"`;
//! host builds get simulation stubs so the wiring itself stays testable.

pub mod device_id;
pub mod hardware;
pub mod http;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod oled;
pub mod time;
pub mod wifi;

use crate::app::ports::{HttpPort, HttpResponse, TimeSource, WifiPort};
use crate::error::Result;

/// A network bundle built from the three network adapters.
pub struct NetworkAdapter {
    pub wifi: wifi::WifiAdapter,
    pub http: http::HttpAdapter,
    pub time: time::SntpTimeSource,
}

impl WifiPort for NetworkAdapter {
    fn is_associated(&mut self) -> bool {
        self.wifi.is_associated()
    }

    fn begin_association(&mut self) -> Result<()> {
        self.wifi.begin_association()
    }

    fn local_ip(&self) -> Option<[u8; 4]> {
        self.wifi.local_ip()
    }
}

impl HttpPort for NetworkAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse> {
        self.http.get(url)
    }

    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse> {
        self.http.post_json(url, body)
    }
}

impl TimeSource for NetworkAdapter {
    fn fetch_unix_time(&mut self) -> Result<i64> {
        self.time.fetch_unix_time()
    }
}
