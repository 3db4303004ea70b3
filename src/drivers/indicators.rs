//! Dose indicator LEDs, one discrete LED per slot, driven HIGH = on.
//!
//! On ESP-IDF the pins are `PinDriver<Output>`; on host/test any
//! `embedded-hal` output pin works. The last commanded level is cached so
//! the state can be read back without touching the GPIO.

use embedded_hal::digital::OutputPin;

use crate::app::ports::IndicatorPort;

pub struct PinIndicators<P> {
    pins: Vec<P>,
    lit: Vec<bool>,
}

impl<P: OutputPin> PinIndicators<P> {
    pub fn new(pins: Vec<P>) -> Self {
        let lit = vec![false; pins.len()];
        Self { pins, lit }
    }

    pub fn is_lit(&self, index: usize) -> bool {
        self.lit.get(index).copied().unwrap_or(false)
    }
}

impl<P: OutputPin> IndicatorPort for PinIndicators<P> {
    fn indicator_count(&self) -> usize {
        self.pins.len()
    }

    fn set_indicator(&mut self, index: usize, on: bool) {
        let Some(pin) = self.pins.get_mut(index) else {
            return;
        };
        let res = if on { pin.set_high() } else { pin.set_low() };
        if let Err(e) = res {
            log::warn!("indicator {} write failed: {:?}", index, e);
            return;
        }
        self.lit[index] = on;
    }
}
