//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable device ID in the form `MB-XXYYZZ` (last 3 bytes of
//! the 6-byte MAC in uppercase hex). Used as the box identifier when none
//! is configured at build time.

/// Fixed-size device ID string: "MB-XXYYZZ".
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the short device ID from the last 3 MAC bytes.
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(id, "MB-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// The configured box id, or the MAC-derived one when it is blank.
pub fn resolve_box_id(configured: &str, mac: &MacAddress) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        device_id(mac).as_str().into()
    } else {
        configured.into()
    }
}
