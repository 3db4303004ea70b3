//! Box/Medicine state machine.
//!
//! Edge-driven on the lid state sampled once per main-loop tick:
//!
//! ```text
//!            light > threshold                 light <= threshold
//!  ┌────────┐ ───────────────▶ ┌──────┐ ───────────────────────▶ prompt
//!  │ Closed │                  │ Open │                    (<= 10 s, blocking)
//!  └────────┘ ◀─────────────── └──────┘                           │
//!       ▲                                                         │
//!       └──────────── confirm / deny / timeout ──────────────────┘
//! ```
//!
//! * **Opened**: light one indicator per untaken dose, short buzz, show
//!   the box screen.
//! * **Closed**: clear indicators, ask whether the medicine was taken, and
//!   poll the buttons until an answer or the prompt timeout. Only the first
//!   answer counts, so one close event confirms at most one dose.
//!
//! No-edge ticks do nothing. This is the only component that writes the
//! dose slate (apart from the acknowledged-publish reset) and the lid state.

pub mod context;
pub mod slate;

use context::{DeviceContext, LidEdge};
use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::{Board, EventSink};
use crate::config::{DeviceConfig, SLATE_SIZE};
use crate::display::{notice, DisplayMode, Frame};
use crate::drivers::buzzer::Buzz;
use crate::error::{Error, Result};
use crate::scheduler::elapsed_ms;

/// Sleep between button polls while the prompt is up.
const PROMPT_POLL_MS: u32 = 20;
/// Sleep between buzzer checks while feedback is held on screen.
const HOLD_POLL_MS: u32 = 10;

/// How a confirmation prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Confirmed { slot: usize },
    SlateFull,
    Denied,
    TimedOut,
}

pub struct BoxStateMachine {
    confirm_timeout_ms: u32,
    feedback_hold_ms: u32,
}

impl BoxStateMachine {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            confirm_timeout_ms: config.confirm_timeout_ms,
            feedback_hold_ms: config.feedback_hold_ms,
        }
    }

    /// Sample the lid and act on an edge. Blocks for the prompt on a
    /// close edge; returns immediately otherwise.
    pub fn tick(
        &self,
        ctx: &mut DeviceContext,
        board: &mut impl Board,
        sink: &mut impl EventSink,
    ) -> Result<Option<LidEdge>> {
        let level = ctx.sensors.read_light_level(board);
        ctx.last_light = level;
        let open = crate::sensors::is_box_open_level(level, ctx.sensors.open_threshold());

        let edge = ctx.lid.update(open);
        match edge {
            Some(LidEdge::Opened) => self.on_opened(ctx, board, sink),
            Some(LidEdge::Closed) => {
                self.on_closed(ctx, board, sink)?;
            }
            None => {}
        }
        Ok(edge)
    }

    fn on_opened(&self, ctx: &mut DeviceContext, board: &mut impl Board, sink: &mut impl EventSink) {
        let slots = board.indicator_count().min(SLATE_SIZE);
        let mut untaken = 0;
        for i in 0..slots {
            if !ctx.slate.is_taken(i) {
                board.set_indicator(i, true);
                untaken += 1;
            }
        }
        info!("Box opened, {} untaken dose(s) lit", untaken);
        sink.emit(&AppEvent::LidOpened { untaken });

        let now = board.now_ms();
        ctx.buzzer.sound(board, now, Buzz::LID_OPENED);
        ctx.display_mode = DisplayMode::Box;
    }

    fn on_closed(
        &self,
        ctx: &mut DeviceContext,
        board: &mut impl Board,
        sink: &mut impl EventSink,
    ) -> Result<PromptOutcome> {
        for i in 0..board.indicator_count() {
            board.set_indicator(i, false);
        }
        info!("Box closed, asking for confirmation");
        sink.emit(&AppEvent::LidClosed);

        let outcome = self.prompt(ctx, board)?;
        match outcome {
            PromptOutcome::Confirmed { slot } => {
                let count = ctx.slate.confirmed_count();
                info!("Medicine confirmed taken, slot={} count={}", slot, count);
                sink.emit(&AppEvent::DoseConfirmed { slot, count });
                self.feedback(ctx, board, &notice::dose_thanks(), Buzz::DOSE_CONFIRMED)?;
            }
            PromptOutcome::SlateFull => {
                error!("Dose confirmed but all {} slots are already taken", SLATE_SIZE);
                sink.emit(&AppEvent::DoseSlateExhausted);
                self.feedback(ctx, board, &notice::slate_full(), Buzz::DOSE_DENIED)?;
            }
            PromptOutcome::Denied => {
                info!("Medicine not taken");
                sink.emit(&AppEvent::DoseDenied);
                self.feedback(ctx, board, &notice::dose_reminder(), Buzz::DOSE_DENIED)?;
            }
            PromptOutcome::TimedOut => {
                info!("No answer within {} ms", self.confirm_timeout_ms);
                sink.emit(&AppEvent::PromptTimedOut);
            }
        }

        ctx.display_mode = DisplayMode::Clock;
        Ok(outcome)
    }

    /// Show the question and wait for the first debounced answer.
    fn prompt(&self, ctx: &mut DeviceContext, board: &mut impl Board) -> Result<PromptOutcome> {
        board.show(&notice::dose_prompt())?;
        let start = board.now_ms();
        while elapsed_ms(board.now_ms(), start) < self.confirm_timeout_ms {
            let now = board.now_ms();
            ctx.buzzer.service(board, now);
            if ctx.buttons.confirm_pressed(board) {
                return Ok(match ctx.slate.confirm_next() {
                    Ok(slot) => PromptOutcome::Confirmed { slot },
                    Err(Error::DoseSlateExhausted) => PromptOutcome::SlateFull,
                    Err(e) => return Err(e),
                });
            }
            if ctx.buttons.deny_pressed(board) {
                return Ok(PromptOutcome::Denied);
            }
            board.delay_ms(PROMPT_POLL_MS);
        }
        Ok(PromptOutcome::TimedOut)
    }

    /// Show `frame`, start `buzz`, and hold the screen while keeping the
    /// buzzer timer serviced so its duration stays exact.
    fn feedback(&self, ctx: &mut DeviceContext, board: &mut impl Board, frame: &Frame, buzz: Buzz) -> Result<()> {
        board.show(frame)?;
        let start = board.now_ms();
        ctx.buzzer.sound(board, start, buzz);
        while elapsed_ms(board.now_ms(), start) < self.feedback_hold_ms {
            board.delay_ms(HOLD_POLL_MS);
            let now = board.now_ms();
            ctx.buzzer.service(board, now);
        }
        Ok(())
    }
}
