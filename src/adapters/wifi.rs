//! WiFi station-mode adapter.
//!
//! Implements [`WifiPort`], the hexagonal boundary for network
//! association. Association is started without blocking; the session's
//! bounded wait polls [`WifiPort::is_associated`] once a second.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::{info, warn};

use crate::app::ports::WifiPort;
use crate::error::{Error, Result};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<()> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(Error::Config("wifi ssid (1-32 printable ASCII bytes)"));
    }
    Ok(())
}

/// Empty means an open network; otherwise WPA2 length rules apply.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(Error::Config("wifi password (8-64 bytes, or empty)"));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    password: heapless::String<64>,
    started: bool,
    #[cfg(target_os = "espidf")]
    driver: esp_idf_svc::wifi::EspWifi<'static>,
    /// Simulation: whether the fake station is up.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: esp_idf_svc::wifi::EspWifi<'static>, ssid: &str, password: &str) -> Result<Self> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        Ok(Self { ssid, password, started: false, driver })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        let (ssid, password) = Self::credentials(ssid, password)?;
        Ok(Self { ssid, password, started: false, sim_associated: false })
    }

    fn credentials(ssid: &str, password: &str) -> Result<(heapless::String<32>, heapless::String<64>)> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut s = heapless::String::new();
        s.push_str(ssid).map_err(|_| Error::Config("wifi ssid"))?;
        let mut p = heapless::String::new();
        p.push_str(password).map_err(|_| Error::Config("wifi password"))?;
        Ok((s, p))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Simulation: drop the link as if the access point went away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim_associated = false;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<()> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        if !self.started {
            let auth_method = if self.password.is_empty() { AuthMethod::None } else { AuthMethod::WPA2Personal };
            let config = Configuration::Client(ClientConfiguration {
                ssid: self.ssid.as_str().try_into().map_err(|_| Error::Config("wifi ssid"))?,
                password: self.password.as_str().try_into().map_err(|_| Error::Config("wifi password"))?,
                auth_method,
                ..Default::default()
            });
            self.driver.set_configuration(&config).map_err(|_| Error::NetworkUnavailable)?;
            self.driver.start().map_err(|_| Error::NetworkUnavailable)?;
            self.started = true;
        }
        self.driver.connect().map_err(|_| Error::NetworkUnavailable)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<()> {
        self.started = true;
        self.sim_associated = true;
        info!("WiFi(sim): associated with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_associated(&mut self) -> bool {
        self.driver.is_connected().unwrap_or(false) && self.driver.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_associated(&mut self) -> bool {
        self.sim_associated
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Option<[u8; 4]> {
        self.driver.sta_netif().get_ip_info().ok().map(|info| info.ip.octets())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Option<[u8; 4]> {
        self.sim_associated.then_some([192, 168, 4, 2])
    }
}

// ───────────────────────────────────────────────────────────────
// WifiPort
// ───────────────────────────────────────────────────────────────

impl WifiPort for WifiAdapter {
    fn is_associated(&mut self) -> bool {
        self.started && self.platform_is_associated()
    }

    fn begin_association(&mut self) -> Result<()> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_begin().inspect_err(|e| warn!("WiFi: association not started: {}", e))
    }

    fn local_ip(&self) -> Option<[u8; 4]> {
        self.platform_local_ip()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
