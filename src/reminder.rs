//! Reminder Engine.
//!
//! Polls the backend for the box's medicine and meal schedule and surfaces
//! at most one reminder at a time.
//!
//! ```text
//!             poll tick, schedule entry matches now
//!   ┌──────┐ ─────────────────────────────────────▶ ┌────────┐
//!   │ Idle │                                         │ Active │
//!   └──────┘ ◀───────────────────────────────────── └────────┘
//!             shown >= display duration, or confirm
//! ```
//!
//! Polling happens only while `Idle`, at most once per check interval.
//! Medicine entries win over meal entries; within a list the first match
//! wins. Matching is skipped entirely while the clock is unsynchronized.

use core::fmt;

use log::{debug, info, warn};

use crate::app::events::{AppEvent, ClearReason};
use crate::app::ports::{Board, EventSink, Network};
use crate::config::DeviceConfig;
use crate::display::{notice, DisplayMode};
use crate::drivers::buzzer::Buzz;
use crate::error::Error;
use crate::error::Result;
use crate::fsm::context::DeviceContext;
use crate::net::api::{self, AckRequest, ReminderResponse, ScheduleEntry};
use crate::net::session::NetworkSession;
use crate::scheduler::{elapsed_ms, IntervalGate};

/// Default match tolerance in minutes.
pub const DEFAULT_TOLERANCE_MIN: u16 = 5;

// ───────────────────────────────────────────────────────────────
// Time of day
// ───────────────────────────────────────────────────────────────

/// Wall-clock hour and minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse `"HH:MM"`; `"HH.MM"` is accepted as well.
    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.trim().split_once([':', '.'])?;
        Self::new(h.trim().parse().ok()?, m.trim().parse().ok()?)
    }

    pub fn minutes_since_midnight(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    /// Absolute distance in minutes. Does not wrap at midnight.
    pub fn minutes_apart(self, other: Self) -> u16 {
        self.minutes_since_midnight().abs_diff(other.minutes_since_midnight())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Whether two `"HH:MM"` times are within the default 5 minute tolerance.
/// Unparseable input never matches.
pub fn is_time_match(a: &str, b: &str) -> bool {
    is_time_match_within(a, b, DEFAULT_TOLERANCE_MIN)
}

pub fn is_time_match_within(a: &str, b: &str, tolerance_min: u16) -> bool {
    match (TimeOfDay::parse(a), TimeOfDay::parse(b)) {
        (Some(a), Some(b)) => a.minutes_apart(b) <= tolerance_min,
        _ => false,
    }
}

// ───────────────────────────────────────────────────────────────
// Reminder state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Medicine,
    Meal,
}

impl ReminderKind {
    pub fn buzz(self) -> Buzz {
        match self {
            Self::Medicine => Buzz::REMINDER_MEDICINE,
            Self::Meal => Buzz::REMINDER_MEAL,
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medicine => write!(f, "medicine"),
            Self::Meal => write!(f, "meal"),
        }
    }
}

/// The reminder currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReminder {
    pub kind: ReminderKind,
    pub message: String,
    /// Scheduled time, normalized to `"HH:MM"`.
    pub time: String,
    pub activated_at_ms: u32,
    /// Server accepted the delivery acknowledgement.
    pub acknowledged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReminderState {
    #[default]
    Idle,
    Active(ActiveReminder),
}

/// First schedule entry matching `now`: medicine before meal, list order
/// within each. `None` when the schedule is inactive or nothing matches.
pub fn find_match(
    schedule: &ReminderResponse,
    now: TimeOfDay,
    tolerance_min: u16,
) -> Option<(ReminderKind, &ScheduleEntry, TimeOfDay)> {
    if !schedule.has_reminder {
        return None;
    }
    let medicine = schedule.medicine_times.iter().map(|e| (ReminderKind::Medicine, e));
    let meal = schedule.meal_times.iter().map(|e| (ReminderKind::Meal, e));
    medicine.chain(meal).find_map(|(kind, entry)| {
        let Some(at) = TimeOfDay::parse(&entry.time) else {
            warn!("Invalid {} time format: {:?}", kind, entry.time);
            return None;
        };
        let diff = at.minutes_apart(now);
        debug!("{} {} vs now {}: diff {} min", kind, at, now, diff);
        (diff <= tolerance_min).then_some((kind, entry, at))
    })
}

/// Delivery acknowledgement still to be sent for a fresh activation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAck {
    pub reminder_id: Option<serde_json::Value>,
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

pub struct ReminderEngine {
    state: ReminderState,
    poll_gate: IntervalGate,
    display_duration_ms: u32,
    tolerance_min: u16,
    fetch_attempts: u8,
    retry_delay_ms: u32,
}

impl ReminderEngine {
    pub fn new(config: &DeviceConfig, now_ms: u32) -> Self {
        Self {
            state: ReminderState::Idle,
            poll_gate: IntervalGate::new(config.reminder_check_interval_ms, now_ms),
            display_duration_ms: config.reminder_display_duration_ms,
            tolerance_min: config.time_match_tolerance_min,
            fetch_attempts: config.reminder_fetch_attempts.max(1),
            retry_delay_ms: config.reminder_retry_delay_ms,
        }
    }

    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveReminder> {
        match &self.state {
            ReminderState::Active(r) => Some(r),
            ReminderState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    /// One poll slot. Returns the acknowledgement to send when a reminder
    /// was just activated; the caller renders it first, then calls
    /// [`acknowledge`](Self::acknowledge).
    ///
    /// Only display writes are propagated; every network or payload problem
    /// is logged, noticed on screen, and leaves the engine `Idle`.
    #[allow(clippy::too_many_arguments)]
    pub fn poll(
        &mut self,
        now_ms: u32,
        now: Option<TimeOfDay>,
        ctx: &mut DeviceContext,
        session: &mut NetworkSession,
        board: &mut impl Board,
        net: &mut impl Network,
        sink: &mut impl EventSink,
    ) -> Result<Option<PendingAck>> {
        if self.is_active() || !self.poll_gate.due(now_ms) {
            return Ok(None);
        }
        let Some(now) = now else {
            debug!("Clock not synchronized, skipping reminder check");
            return Ok(None);
        };

        info!("Checking reminders at {}", now);
        if !session.ensure_connected(net, board, sink)? {
            warn!("WiFi disconnected, reminder check skipped");
            board.show(&notice::wifi_down())?;
            return Ok(None);
        }

        let Some(schedule) = self.fetch(&session.url(&api::reminders_path(&ctx.box_id)), board, net)? else {
            return Ok(None);
        };
        if !schedule.has_reminder {
            info!("No active schedule for this box");
            return Ok(None);
        }
        debug!(
            "Schedule: {} medicine, {} meal ({})",
            schedule.medicine_times.len(),
            schedule.meal_times.len(),
            schedule.explanation
        );

        let Some((kind, entry, at)) = find_match(&schedule, now, self.tolerance_min) else {
            info!("No schedule matches {}", now);
            return Ok(None);
        };

        let activated_at_ms = board.now_ms();
        let reminder = ActiveReminder {
            kind,
            message: entry.message.clone(),
            time: at.to_string(),
            activated_at_ms,
            acknowledged: false,
        };
        info!("Reminder active: {} {:?} ({})", kind, reminder.message, reminder.time);
        sink.emit(&AppEvent::ReminderActivated { kind, time: reminder.time.clone() });

        ctx.display_mode = DisplayMode::Reminder;
        ctx.buzzer.sound(board, activated_at_ms, kind.buzz());
        self.state = ReminderState::Active(reminder);

        Ok(Some(PendingAck { reminder_id: schedule.id }))
    }

    /// Best-effort delivery acknowledgement. Failure changes nothing but
    /// the `acknowledged` flag.
    pub fn acknowledge(
        &mut self,
        pending: PendingAck,
        session: &NetworkSession,
        net: &mut impl Network,
        sink: &mut impl EventSink,
    ) {
        let body = match api::to_body(&AckRequest { reminder_id: pending.reminder_id }) {
            Ok(b) => b,
            Err(e) => {
                warn!("Acknowledgement not encoded: {}", e);
                return;
            }
        };
        match net.post_json(&session.url(api::ACK_PATH), &body) {
            Ok(resp) if resp.is_ok() => {
                info!("Acknowledgement sent");
                if let ReminderState::Active(r) = &mut self.state {
                    r.acknowledged = true;
                }
                sink.emit(&AppEvent::ReminderDelivered);
            }
            Ok(resp) => warn!("Acknowledgement rejected: {}", Error::HttpStatus(resp.status)),
            Err(e) => warn!("Acknowledgement failed: {}", e),
        }
    }

    /// Clear the reminder once it has been shown for the display duration.
    pub fn expire(&mut self, now_ms: u32, ctx: &mut DeviceContext, sink: &mut impl EventSink) -> bool {
        let Some(r) = self.active() else {
            return false;
        };
        if elapsed_ms(now_ms, r.activated_at_ms) < self.display_duration_ms {
            return false;
        }
        info!("Reminder display duration finished");
        self.clear(ctx, ClearReason::Expired, sink);
        true
    }

    /// Clear the reminder on a debounced confirm press, with a short buzz.
    pub fn confirm(&mut self, ctx: &mut DeviceContext, board: &mut impl Board, sink: &mut impl EventSink) -> bool {
        if !self.is_active() || !ctx.buttons.confirm_pressed(board) {
            return false;
        }
        info!("Reminder acknowledged by user");
        self.clear(ctx, ClearReason::Confirmed, sink);
        let now = board.now_ms();
        ctx.buzzer.sound(board, now, Buzz::REMINDER_CONFIRMED);
        true
    }

    fn clear(&mut self, ctx: &mut DeviceContext, reason: ClearReason, sink: &mut impl EventSink) {
        self.state = ReminderState::Idle;
        ctx.display_mode = DisplayMode::Clock;
        sink.emit(&AppEvent::ReminderCleared(reason));
    }

    /// GET the schedule with bounded retries.
    fn fetch(&self, url: &str, board: &mut impl Board, net: &mut impl Network) -> Result<Option<ReminderResponse>> {
        let mut attempt = 0;
        let body = loop {
            attempt += 1;
            let err = match net.get(url) {
                Ok(resp) if resp.is_ok() => break resp.body,
                Ok(resp) => Error::HttpStatus(resp.status),
                Err(e) => e,
            };
            if attempt >= self.fetch_attempts {
                warn!("Reminder fetch failed after {} attempts: {}", attempt, err);
                board.show(&notice::fetch_failed())?;
                return Ok(None);
            }
            warn!("Reminder fetch failed (attempt {}/{}): {}", attempt, self.fetch_attempts, err);
            board.show(&notice::fetch_retrying(attempt, self.fetch_attempts, &err.to_string()))?;
            board.delay_ms(self.retry_delay_ms);
        };

        match ReminderResponse::parse(&body) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(e) => {
                warn!("Reminder payload rejected: {}", e);
                board.show(&notice::invalid_data())?;
                Ok(None)
            }
        }
    }
}
