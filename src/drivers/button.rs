//! Debounced confirm/deny buttons.
//!
//! ## Hardware
//!
//! Two active-low momentary switches on pulled-up GPIOs. [`PinButtons`]
//! adapts any pair of `embedded-hal` input pins to [`ButtonPort`].
//!
//! ## Debounce
//!
//! A press is accepted only when the line stays low continuously for the
//! whole debounce window. The check polls the line inside the call,
//! sleeping a few milliseconds between samples, so a call blocks for at
//! most one window (plus one poll step) and returns at once when the line
//! is idle.

use embedded_hal::digital::InputPin;

use crate::app::ports::{Button, ButtonPort, MonotonicClock};
use crate::scheduler::elapsed_ms;

const POLL_STEP_MS: u32 = 5;

/// Debounced reads of the two buttons.
#[derive(Debug, Clone, Copy)]
pub struct DebouncedButtons {
    debounce_ms: u32,
}

impl DebouncedButtons {
    pub fn new(debounce_ms: u32) -> Self {
        Self { debounce_ms }
    }

    pub fn confirm_pressed(&self, io: &mut (impl ButtonPort + MonotonicClock)) -> bool {
        self.pressed(io, Button::Confirm)
    }

    pub fn deny_pressed(&self, io: &mut (impl ButtonPort + MonotonicClock)) -> bool {
        self.pressed(io, Button::Deny)
    }

    pub fn pressed(&self, io: &mut (impl ButtonPort + MonotonicClock), button: Button) -> bool {
        if !io.is_low(button) {
            return false;
        }
        let start = io.now_ms();
        loop {
            if elapsed_ms(io.now_ms(), start) >= self.debounce_ms {
                return true;
            }
            io.delay_ms(POLL_STEP_MS);
            if !io.is_low(button) {
                return false;
            }
        }
    }
}

/// [`ButtonPort`] over two `embedded-hal` input pins with pull-ups.
pub struct PinButtons<C, D> {
    confirm: C,
    deny: D,
}

impl<C: InputPin, D: InputPin> PinButtons<C, D> {
    pub fn new(confirm: C, deny: D) -> Self {
        Self { confirm, deny }
    }
}

impl<C: InputPin, D: InputPin> ButtonPort for PinButtons<C, D> {
    fn is_low(&mut self, button: Button) -> bool {
        // A pin read error reads as released.
        match button {
            Button::Confirm => self.confirm.is_low().unwrap_or(false),
            Button::Deny => self.deny.is_low().unwrap_or(false),
        }
    }
}
