//! Hardware adapter: bridges real peripherals to the board port traits.
//!
//! [`HardwareAdapter`] owns one driver per concern and satisfies every
//! board port by delegation, so the controller sees a single
//! [`Board`](crate::app::ports::Board). This is the only module that
//! assembles actual hardware; on non-espidf targets it composes whatever
//! port implementations the caller hands it.

use crate::app::ports::{
    BuzzerPort, Button, ButtonPort, DisplayPort, EnvironmentSensorPort, IndicatorPort, LightSensorPort,
    MonotonicClock,
};
use crate::display::Frame;
use crate::error::Result;
use crate::sensors::EnvReading;

/// Concrete adapter that combines all local peripherals behind port traits.
pub struct HardwareAdapter<C, L, E, B, I, Z, D> {
    pub clock: C,
    pub light: L,
    pub climate: E,
    pub buttons: B,
    pub indicators: I,
    pub buzzer: Z,
    pub display: D,
}

impl<C, L, E, B, I, Z, D> MonotonicClock for HardwareAdapter<C, L, E, B, I, Z, D>
where
    C: MonotonicClock,
{
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}

impl<C, L, E, B, I, Z, D> LightSensorPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    L: LightSensorPort,
{
    fn read_light(&mut self) -> u16 {
        self.light.read_light()
    }
}

impl<C, L, E, B, I, Z, D> EnvironmentSensorPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    E: EnvironmentSensorPort,
{
    fn read_environment(&mut self) -> Result<EnvReading> {
        self.climate.read_environment()
    }
}

impl<C, L, E, B, I, Z, D> ButtonPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    B: ButtonPort,
{
    fn is_low(&mut self, button: Button) -> bool {
        self.buttons.is_low(button)
    }
}

impl<C, L, E, B, I, Z, D> IndicatorPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    I: IndicatorPort,
{
    fn indicator_count(&self) -> usize {
        self.indicators.indicator_count()
    }

    fn set_indicator(&mut self, index: usize, on: bool) {
        self.indicators.set_indicator(index, on);
    }
}

impl<C, L, E, B, I, Z, D> BuzzerPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    Z: BuzzerPort,
{
    fn set_buzzer_duty(&mut self, duty: u16) {
        self.buzzer.set_buzzer_duty(duty);
    }
}

impl<C, L, E, B, I, Z, D> DisplayPort for HardwareAdapter<C, L, E, B, I, Z, D>
where
    D: DisplayPort,
{
    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.display.show(frame)
    }
}

// ── ESP32 LDR on the oneshot ADC ──────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::AdcLight;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::adc::ADCPin;
    use esp_idf_hal::adc::attenuation::DB_11;
    use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
    use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
    use esp_idf_hal::peripheral::Peripheral;
    use log::warn;

    use crate::app::ports::LightSensorPort;
    use crate::error::{Error, Result};

    /// LDR divider sampled at 12 bits with 11 dB attenuation.
    pub struct AdcLight<'d, T: ADCPin> {
        channel: AdcChannelDriver<'d, T, AdcDriver<'d, T::Adc>>,
    }

    impl<'d, T: ADCPin> AdcLight<'d, T> {
        pub fn new(adc: impl Peripheral<P = T::Adc> + 'd, pin: impl Peripheral<P = T> + 'd) -> Result<Self> {
            let driver = AdcDriver::new(adc).map_err(|_| Error::SensorUnavailable)?;
            let config = AdcChannelConfig { attenuation: DB_11, ..Default::default() };
            let channel = AdcChannelDriver::new(driver, pin, &config).map_err(|_| Error::SensorUnavailable)?;
            Ok(Self { channel })
        }
    }

    impl<T: ADCPin> LightSensorPort for AdcLight<'_, T> {
        /// A failed conversion reads as dark, i.e. lid closed.
        fn read_light(&mut self) -> u16 {
            self.channel.read().unwrap_or_else(|e| {
                warn!("LDR read failed: {}", e);
                0
            })
        }
    }
}
