//! Shared mutable device state threaded through every component.
//!
//! `DeviceContext` is the single struct the box state machine, reminder
//! engine, telemetry publisher and controller read from and write to:
//! the dose slate, the lid edge detector, the active display mode and the
//! local actuator/input helpers. Think of it as the "blackboard". Only one
//! component runs at a time, so plain `&mut` access is all the
//! synchronization it needs.

use crate::config::DeviceConfig;
use crate::display::DisplayMode;
use crate::drivers::button::DebouncedButtons;
use crate::drivers::buzzer::BuzzerTimer;
use crate::sensors::{EnvReading, SensorAdapter};

use super::slate::DoseSlate;

/// Lid open/closed as sampled this tick and last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LidState {
    pub is_open: bool,
    pub previous_is_open: bool,
}

/// An open/close transition of the lid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidEdge {
    Opened,
    Closed,
}

impl LidState {
    /// Record a new sample and report the edge, if any.
    pub fn update(&mut self, is_open: bool) -> Option<LidEdge> {
        self.previous_is_open = self.is_open;
        self.is_open = is_open;
        match (self.previous_is_open, self.is_open) {
            (false, true) => Some(LidEdge::Opened),
            (true, false) => Some(LidEdge::Closed),
            _ => None,
        }
    }
}

pub struct DeviceContext {
    pub box_id: String,
    pub slate: DoseSlate,
    pub lid: LidState,
    pub display_mode: DisplayMode,
    pub buzzer: BuzzerTimer,
    pub buttons: DebouncedButtons,
    pub sensors: SensorAdapter,
    /// Most recent climate reading, `None` if the last read failed.
    pub last_environment: Option<EnvReading>,
    pub last_light: u16,
}

impl DeviceContext {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            box_id: config.box_id.clone(),
            slate: DoseSlate::new(),
            lid: LidState::default(),
            display_mode: DisplayMode::Clock,
            buzzer: BuzzerTimer::new(),
            buttons: DebouncedButtons::new(config.debounce_ms),
            sensors: SensorAdapter::new(config.ldr_open_threshold),
            last_environment: None,
            last_light: 0,
        }
    }
}
