//! Unified error types for the MediBox firmware.
//!
//! Every fallible operation funnels into [`Error`]. None of these are fatal:
//! components log them and leave their state unchanged, and the main loop
//! only ever surfaces them on the display. All variants are `Copy` so they
//! can be handed around the controller without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Transient temperature/humidity read failure.
    SensorUnavailable,
    /// WiFi is not associated; the dependent operation is skipped this cycle.
    NetworkUnavailable,
    /// HTTP transport failure (connect, write, read).
    EndpointUnreachable,
    /// The endpoint answered with a non-success status.
    HttpStatus(u16),
    /// Schedule or time payload could not be parsed.
    MalformedResponse,
    /// Network time fetch failed.
    TimeSyncFailure,
    /// Every slot in the dose slate is already taken.
    DoseSlateExhausted,
    /// Writing to the status display failed.
    Display,
    /// Configuration is invalid. Carries the offending field.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorUnavailable => write!(f, "sensor unavailable"),
            Self::NetworkUnavailable => write!(f, "network unavailable"),
            Self::EndpointUnreachable => write!(f, "endpoint unreachable"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::MalformedResponse => write!(f, "malformed response"),
            Self::TimeSyncFailure => write!(f, "time sync failed"),
            Self::DoseSlateExhausted => write!(f, "dose slate exhausted"),
            Self::Display => write!(f, "display write failed"),
            Self::Config(field) => write!(f, "config: {field}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(_: serde_json::Error) -> Self {
        Self::MalformedResponse
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
