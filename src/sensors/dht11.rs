//! DHT11 single-wire temperature/humidity sensor.
//!
//! The wire protocol is handled by `dht_sensor`; this module owns the pin
//! and delay, releases the line before each read, and maps the outcome onto
//! [`EnvironmentSensorPort`]. On ESP-IDF the pin is an open-drain
//! `PinDriver` with pull-up and the delay is `Ets`.

use dht_sensor::dht11;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use super::EnvReading;
use crate::app::ports::EnvironmentSensorPort;
use crate::error::{Error, Result};

/// Convert a raw sensor reading. `None` for physically impossible humidity.
pub fn reading_from(temperature: i8, relative_humidity: u8) -> Option<EnvReading> {
    (relative_humidity <= 100).then(|| EnvReading {
        temperature_c: f32::from(temperature),
        humidity_pct: f32::from(relative_humidity),
    })
}

pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// One blocking measurement (~25 ms).
    pub fn read(&mut self) -> Result<EnvReading> {
        self.pin.set_high().map_err(|_| Error::SensorUnavailable)?;
        let raw = dht11::blocking::read(&mut self.delay, &mut self.pin).map_err(|e| {
            warn!("DHT11 read failed: {:?}", e);
            Error::SensorUnavailable
        })?;
        reading_from(raw.temperature, raw.relative_humidity).ok_or(Error::SensorUnavailable)
    }
}

impl<P, D> EnvironmentSensorPort for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read_environment(&mut self) -> Result<EnvReading> {
        self.read()
    }
}
