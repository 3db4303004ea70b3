//! MediBox firmware library.
//!
//! Exposes the controller and its pure-logic components for integration
//! testing and external inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod clock;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod net;
pub mod pins;
pub mod reminder;
pub mod scheduler;
pub mod sensors;
pub mod telemetry;

#[cfg(test)]
mod testkit;
