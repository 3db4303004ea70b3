//! Piezo buzzer on an LEDC PWM channel.
//!
//! [`BuzzerTimer::sound`] sets the duty and returns immediately; the main
//! loop calls [`BuzzerTimer::service`] every iteration to silence the
//! buzzer once the requested duration has elapsed. Nothing here sleeps.
//!
//! ## Dual-target design
//!
//! [`PwmBuzzer`] adapts any `embedded-hal` [`SetDutyCycle`] channel (LEDC
//! on ESP-IDF, a recording mock on the host) to [`BuzzerPort`].

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::BuzzerPort;
use crate::scheduler::elapsed_ms;

/// Full-scale duty of the 10-bit buzzer channel.
pub const MAX_DUTY: u16 = 1023;

/// A buzz request: how long and how loud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buzz {
    pub duration_ms: u32,
    pub intensity: u16,
}

impl Buzz {
    pub const LID_OPENED: Self = Self { duration_ms: 300, intensity: 512 };
    pub const DOSE_CONFIRMED: Self = Self { duration_ms: 200, intensity: 512 };
    pub const DOSE_DENIED: Self = Self { duration_ms: 500, intensity: 512 };
    pub const REMINDER_MEDICINE: Self = Self { duration_ms: 2000, intensity: 768 };
    pub const REMINDER_MEAL: Self = Self { duration_ms: 1000, intensity: 512 };
    pub const REMINDER_CONFIRMED: Self = Self { duration_ms: 100, intensity: 512 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Activation {
    started_ms: u32,
    duration_ms: u32,
}

/// Self-expiring buzzer request.
#[derive(Debug, Default)]
pub struct BuzzerTimer {
    active: Option<Activation>,
}

impl BuzzerTimer {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Start (or restart) a buzz. A new request replaces the old one.
    pub fn sound(&mut self, port: &mut impl BuzzerPort, now_ms: u32, buzz: Buzz) {
        port.set_buzzer_duty(buzz.intensity.min(MAX_DUTY));
        self.active = Some(Activation { started_ms: now_ms, duration_ms: buzz.duration_ms });
    }

    /// Silence the buzzer if its duration has elapsed. Returns `true` when
    /// this call turned it off.
    pub fn service(&mut self, port: &mut impl BuzzerPort, now_ms: u32) -> bool {
        match self.active {
            Some(a) if elapsed_ms(now_ms, a.started_ms) >= a.duration_ms => {
                port.set_buzzer_duty(0);
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// [`BuzzerPort`] over an `embedded-hal` PWM channel.
pub struct PwmBuzzer<P> {
    channel: P,
}

impl<P: SetDutyCycle> PwmBuzzer<P> {
    pub fn new(channel: P) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &P {
        &self.channel
    }
}

impl<P: SetDutyCycle> BuzzerPort for PwmBuzzer<P> {
    fn set_buzzer_duty(&mut self, duty: u16) {
        if let Err(e) = self.channel.set_duty_cycle_fraction(duty.min(MAX_DUTY), MAX_DUTY) {
            log::warn!("buzzer duty write failed: {:?}", e);
        }
    }
}
