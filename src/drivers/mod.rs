//! Local actuator and input drivers.

pub mod button;
pub mod buzzer;
pub mod indicators;
