//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! tagged line to the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::{AppEvent, ClearReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { box_id } => {
                info!("START | box_id={}", box_id);
            }
            AppEvent::LidOpened { untaken } => {
                info!("BOX   | lid opened, {} dose(s) outstanding", untaken);
            }
            AppEvent::LidClosed => {
                info!("BOX   | lid closed, awaiting confirmation");
            }
            AppEvent::DoseConfirmed { slot, count } => {
                info!("DOSE  | confirmed slot={} total={}", slot, count);
            }
            AppEvent::DoseDenied => {
                info!("DOSE  | not taken");
            }
            AppEvent::PromptTimedOut => {
                info!("DOSE  | prompt timed out");
            }
            AppEvent::DoseSlateExhausted => {
                warn!("DOSE  | confirm ignored, all slots taken");
            }
            AppEvent::TelemetrySent { status, medicine_taken, acked } => {
                info!(
                    "TELEM | status={} medicine_taken={} {}",
                    status,
                    medicine_taken,
                    if *acked { "ACK" } else { "NACK" },
                );
            }
            AppEvent::ReminderActivated { kind, time } => {
                info!("REMIND| {} reminder active for {}", kind, time);
            }
            AppEvent::ReminderDelivered => {
                info!("REMIND| delivery acknowledged by server");
            }
            AppEvent::ReminderCleared(reason) => match reason {
                ClearReason::Expired => info!("REMIND| cleared (expired)"),
                ClearReason::Confirmed => info!("REMIND| cleared (confirmed)"),
            },
            AppEvent::WifiConnected => {
                info!("NET   | WiFi connected");
            }
            AppEvent::WifiTimeout => {
                warn!("NET   | WiFi association timed out");
            }
            AppEvent::ClockSynced => {
                info!("CLOCK | synchronized");
            }
            AppEvent::EndpointSwitched(endpoint) => {
                warn!("NET   | switched to {} server", endpoint);
            }
        }
    }
}
