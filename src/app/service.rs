//! Application service: the hexagonal core.
//!
//! [`Controller`] owns every component and the shared [`DeviceContext`],
//! and runs one cooperative main-loop iteration per [`Controller::tick`].
//! All I/O flows through the [`Board`] and [`Network`] ports handed in at
//! the call site, so the whole loop runs against fakes in tests.
//!
//! ```text
//!   Board ───▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!              │            Controller             │
//! Network ◀──▶ │ Box FSM · Telemetry · Reminders  │
//!              │ Session · Clock · Renderer        │
//!              └──────────────────────────────────┘
//! ```

use log::info;

use crate::clock::DeviceClock;
use crate::config::DeviceConfig;
use crate::display::{notice, DisplayContext, DisplayMode, DisplayRenderer};
use crate::error::Result;
use crate::fsm::context::DeviceContext;
use crate::fsm::slate::DoseSlate;
use crate::fsm::BoxStateMachine;
use crate::net::session::NetworkSession;
use crate::reminder::ReminderEngine;
use crate::scheduler::{elapsed_ms, IntervalGate};
use crate::telemetry::TelemetryPublisher;

use super::events::AppEvent;
use super::ports::{Board, Button, EventSink, Network};

/// How long the boot splash stays up.
const SPLASH_HOLD_MS: u32 = 2000;

pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    config: DeviceConfig,
    ctx: DeviceContext,
    clock: DeviceClock,
    renderer: DisplayRenderer,
    session: NetworkSession,
    telemetry: TelemetryPublisher,
    reminders: ReminderEngine,
    lid: BoxStateMachine,
    display_gate: IntervalGate,
    /// Redraw cadence while a reminder is on screen.
    blink_gate: IntervalGate,
    /// Deny press already acted on; ignored until the button is released.
    deny_latched: bool,
}

impl Controller {
    /// Build every component from `config`. Periodic activities first fire
    /// one interval after `now_ms`.
    pub fn new(config: DeviceConfig, now_ms: u32) -> Self {
        Self {
            ctx: DeviceContext::new(&config),
            clock: DeviceClock::new(config.sync_interval_secs, config.utc_offset_secs),
            renderer: DisplayRenderer::new(config.blink_interval_ms),
            session: NetworkSession::new(&config, now_ms),
            telemetry: TelemetryPublisher::new(&config, now_ms),
            reminders: ReminderEngine::new(&config, now_ms),
            lid: BoxStateMachine::new(&config),
            display_gate: IntervalGate::new(config.display_update_interval_ms, now_ms),
            blink_gate: IntervalGate::new(config.blink_interval_ms, now_ms),
            deny_latched: false,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Splash screen, first WiFi attempt, first time sync.
    pub fn boot(&mut self, board: &mut impl Board, net: &mut impl Network, sink: &mut impl EventSink) -> Result<()> {
        board.show(&notice::boot_splash(FIRMWARE_VERSION))?;
        board.delay_ms(SPLASH_HOLD_MS);
        info!("MediBox starting, box id {}", self.ctx.box_id);

        let online = self.session.ensure_connected(net, board, sink)?;
        self.sync_clock(board.now_ms(), net, online, sink);

        board.show(&notice::boot_identity(&self.ctx.box_id))?;
        sink.emit(&AppEvent::Started { box_id: self.ctx.box_id.clone() });
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One main-loop iteration:
    ///
    /// 1. buzzer expiry
    /// 2. box state machine (may block up to the prompt timeout)
    /// 3. telemetry publish
    /// 4. server health check
    /// 5. clock resync
    /// 6. reminder poll, or expiry of the active one
    /// 7. reminder confirm button
    /// 8. status screen toggle
    /// 9. display refresh (every blink interval while a reminder is up)
    ///
    /// Only display write failures are returned. The caller sleeps
    /// [`yield_ms`](Self::yield_ms) afterwards.
    pub fn tick(&mut self, board: &mut impl Board, net: &mut impl Network, sink: &mut impl EventSink) -> Result<()> {
        let now = board.now_ms();
        self.ctx.buzzer.service(board, now);

        self.lid.tick(&mut self.ctx, board, sink)?;

        self.telemetry
            .tick(board.now_ms(), &mut self.ctx, &mut self.session, board, net, sink)?;

        self.session.health_check(board.now_ms(), net, board, sink)?;

        let online = self.session.refresh(net);
        self.sync_clock(board.now_ms(), net, online, sink);

        self.update_reminders(board, net, sink)?;

        self.update_status_mode(board);

        let now = board.now_ms();
        let refresh = self.display_gate.due(now);
        let blink = self.ctx.display_mode == DisplayMode::Reminder && self.blink_gate.due(now);
        if refresh || blink {
            self.render(board)?;
        }
        Ok(())
    }

    fn sync_clock(&mut self, now_ms: u32, net: &mut impl Network, online: bool, sink: &mut impl EventSink) {
        if self.clock.maybe_sync(now_ms, net, online) {
            sink.emit(&AppEvent::ClockSynced);
        }
    }

    fn update_reminders(
        &mut self,
        board: &mut impl Board,
        net: &mut impl Network,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let now = board.now_ms();
        if self.reminders.is_active() {
            self.reminders.expire(now, &mut self.ctx, sink);
        } else {
            let time_of_day = self.clock.time_of_day(now);
            let pending = self.reminders.poll(
                now,
                time_of_day,
                &mut self.ctx,
                &mut self.session,
                board,
                net,
                sink,
            )?;
            if let Some(pending) = pending {
                if let Some(active) = self.reminders.active() {
                    self.renderer.start_blink(active.activated_at_ms);
                }
                // Show the reminder before the acknowledgement round trip.
                self.render(board)?;
                self.display_gate.rearm(board.now_ms());
                self.blink_gate.rearm(board.now_ms());
                self.reminders.acknowledge(pending, &self.session, net, sink);
            }
        }

        self.reminders.confirm(&mut self.ctx, board, sink);
        Ok(())
    }

    /// Deny in clock mode opens the status screen; it closes again on the
    /// next deny or after the status display duration.
    fn update_status_mode(&mut self, board: &mut impl Board) {
        let mode = self.ctx.display_mode;
        if !matches!(mode, DisplayMode::Clock | DisplayMode::Status { .. }) {
            return;
        }

        let pressed = if self.deny_latched {
            self.deny_latched = board.is_low(Button::Deny);
            false
        } else if self.ctx.buttons.deny_pressed(board) {
            self.deny_latched = true;
            true
        } else {
            false
        };

        let now = board.now_ms();
        self.ctx.display_mode = match mode {
            DisplayMode::Clock if pressed => {
                info!("Status screen opened");
                DisplayMode::Status { since_ms: now }
            }
            DisplayMode::Status { since_ms }
                if pressed || elapsed_ms(now, since_ms) >= self.config.status_display_duration_ms =>
            {
                DisplayMode::Clock
            }
            other => other,
        };
    }

    /// Draw the current mode. Box mode re-reads the sensors so the screen
    /// shows live values.
    fn render(&mut self, board: &mut impl Board) -> Result<()> {
        let now = board.now_ms();
        if self.ctx.display_mode == DisplayMode::Box {
            self.ctx.last_environment = self.ctx.sensors.read_environment(board);
            self.ctx.last_light = self.ctx.sensors.read_light_level(board);
        }

        let time = self.clock.now(now);
        let date = self.clock.today(now);
        let view = DisplayContext {
            time: &time,
            date: &date,
            online: self.session.is_connected(),
            box_id: &self.ctx.box_id,
            reminder: self.reminders.active(),
            box_open: self.ctx.lid.is_open,
            environment: self.ctx.last_environment,
            light: self.ctx.last_light,
            ntp_synced: self.clock.is_synchronized(),
            doses_confirmed: self.ctx.slate.confirmed_count(),
        };
        let frame = self.renderer.render(self.ctx.display_mode, &view, now);
        board.show(&frame)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn display_mode(&self) -> DisplayMode {
        self.ctx.display_mode
    }

    pub fn slate(&self) -> &DoseSlate {
        &self.ctx.slate
    }

    pub fn reminders(&self) -> &ReminderEngine {
        &self.reminders
    }

    pub fn session(&self) -> &NetworkSession {
        &self.session
    }

    pub fn clock(&self) -> &DeviceClock {
        &self.clock
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn box_id(&self) -> &str {
        &self.ctx.box_id
    }

    /// Sleep between main-loop iterations.
    pub fn yield_ms(&self) -> u32 {
        self.config.loop_yield_ms
    }
}
