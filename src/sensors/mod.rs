//! Sensor subsystem: lid detection via the LDR and the DHT11 climate
//! sensor, behind [`SensorAdapter`].
//!
//! Individual read failures never escape this module: a failed climate read
//! becomes `None` and the caller skips whatever needed it this cycle.

pub mod dht11;

use log::warn;

use crate::app::ports::{EnvironmentSensorPort, LightSensorPort};

/// One temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Lid is open when more light than `threshold` reaches the LDR.
/// The threshold itself counts as closed.
#[inline]
pub fn is_box_open_level(level: u16, threshold: u16) -> bool {
    level > threshold
}

/// Reads the box's sensors through the board ports.
#[derive(Debug, Clone, Copy)]
pub struct SensorAdapter {
    open_threshold: u16,
}

impl SensorAdapter {
    pub fn new(open_threshold: u16) -> Self {
        Self { open_threshold }
    }

    /// One blocking climate read; `None` is the "unavailable" outcome.
    pub fn read_environment(&self, port: &mut impl EnvironmentSensorPort) -> Option<EnvReading> {
        match port.read_environment() {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("DHT read failed: {}", e);
                None
            }
        }
    }

    pub fn read_light_level(&self, port: &mut impl LightSensorPort) -> u16 {
        port.read_light()
    }

    pub fn is_box_open(&self, port: &mut impl LightSensorPort) -> bool {
        is_box_open_level(self.read_light_level(port), self.open_threshold)
    }

    pub fn open_threshold(&self) -> u16 {
        self.open_threshold
    }
}
