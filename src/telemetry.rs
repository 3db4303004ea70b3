//! Telemetry Publisher.
//!
//! Every sensor interval: read the climate sensor and the LDR, and POST
//! them to `/send_data` with the box id and whether any dose was confirmed
//! since the last acknowledged publish. An HTTP 200 is the one and only
//! trigger that empties the dose slate; anything else leaves it alone so
//! the same doses are reported again next cycle.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Board, EventSink, Network};
use crate::config::DeviceConfig;
use crate::error::Result;
use crate::fsm::context::DeviceContext;
use crate::net::api::{self, TelemetryPayload};
use crate::net::session::NetworkSession;
use crate::scheduler::IntervalGate;
use crate::sensors::EnvReading;

/// What a publish slot did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// WiFi could not be brought up; nothing was sent.
    Offline,
    /// Climate sensor unavailable; nothing was sent.
    NoReading,
    /// Request failed in transport or encoding.
    Failed,
    /// Server answered with this status.
    Sent { status: u16, acked: bool },
}

pub struct TelemetryPublisher {
    gate: IntervalGate,
}

impl TelemetryPublisher {
    pub fn new(config: &DeviceConfig, now_ms: u32) -> Self {
        Self { gate: IntervalGate::new(config.sensor_update_interval_ms, now_ms) }
    }

    /// Publish if the interval has elapsed. `None` when not yet due.
    pub fn tick(
        &mut self,
        now_ms: u32,
        ctx: &mut DeviceContext,
        session: &mut NetworkSession,
        board: &mut impl Board,
        net: &mut impl Network,
        sink: &mut impl EventSink,
    ) -> Result<Option<PublishOutcome>> {
        if !self.gate.due(now_ms) {
            return Ok(None);
        }
        if !session.ensure_connected(net, board, sink)? {
            warn!("WiFi disconnected, telemetry skipped");
            return Ok(Some(PublishOutcome::Offline));
        }

        let reading = ctx.sensors.read_environment(board);
        ctx.last_environment = reading;
        let Some(reading) = reading else {
            warn!("DHT sensor not ready, telemetry skipped");
            return Ok(Some(PublishOutcome::NoReading));
        };
        let light = ctx.sensors.read_light_level(board);
        ctx.last_light = light;

        Ok(Some(Self::publish(reading, light, ctx, session, net, sink)))
    }

    /// Send one sample. Resets the slate on HTTP 200 only.
    pub fn publish(
        reading: EnvReading,
        light: u16,
        ctx: &mut DeviceContext,
        session: &NetworkSession,
        net: &mut impl Network,
        sink: &mut impl EventSink,
    ) -> PublishOutcome {
        let payload = TelemetryPayload {
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            ldr_value: light,
            box_id: ctx.box_id.clone(),
            medicine_taken: ctx.slate.any_confirmed(),
        };
        let body = match api::to_body(&payload) {
            Ok(b) => b,
            Err(e) => {
                warn!("Telemetry not encoded: {}", e);
                return PublishOutcome::Failed;
            }
        };

        match net.post_json(&session.url(api::SEND_DATA_PATH), &body) {
            Ok(resp) => {
                let acked = resp.is_ok();
                info!("Data sent, status {}", resp.status);
                if acked && payload.medicine_taken {
                    info!("Server acknowledged {} dose(s), slate reset", ctx.slate.confirmed_count());
                    ctx.slate.reset();
                }
                sink.emit(&AppEvent::TelemetrySent {
                    status: resp.status,
                    medicine_taken: payload.medicine_taken,
                    acked,
                });
                PublishOutcome::Sent { status: resp.status, acked }
            }
            Err(e) => {
                warn!("Failed to send data: {}", e);
                PublishOutcome::Failed
            }
        }
    }
}
