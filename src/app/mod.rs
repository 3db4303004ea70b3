//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the controller that sequences one main-loop
//! iteration over the box state machine, telemetry, network health,
//! reminders and the display. All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
