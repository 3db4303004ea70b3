//! Outbound application events.
//!
//! The controller and its components emit these through the
//! [`EventSink`](super::ports::EventSink) port. The log adapter turns them
//! into one tagged line each; tests record them.

use crate::net::session::Endpoint;
use crate::reminder::ReminderKind;

/// Why an active reminder left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Expired,
    Confirmed,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot finished; carries the box identifier.
    Started { box_id: String },

    /// Lid opened. `untaken` is the number of indicators lit.
    LidOpened { untaken: usize },
    /// Lid closed; the confirmation prompt is on screen.
    LidClosed,
    /// User confirmed a dose; `slot` is the flag that flipped.
    DoseConfirmed { slot: usize, count: u8 },
    /// User answered "no" at the prompt.
    DoseDenied,
    /// Prompt timed out without an answer.
    PromptTimedOut,
    /// A confirm arrived but every slot is already taken.
    DoseSlateExhausted,

    /// Telemetry POST returned; `acked` is true on HTTP 200.
    TelemetrySent { status: u16, medicine_taken: bool, acked: bool },

    /// A schedule entry matched and the reminder is on screen.
    ReminderActivated { kind: ReminderKind, time: String },
    /// Server accepted the delivery acknowledgement.
    ReminderDelivered,
    ReminderCleared(ClearReason),

    WifiConnected,
    WifiTimeout,
    ClockSynced,
    /// Health check failed over to the other endpoint.
    EndpointSwitched(Endpoint),
}
