//! Display Renderer.
//!
//! The OLED is treated as a four-line text surface. [`DisplayRenderer`]
//! turns a [`DisplayMode`] plus a read-only [`DisplayContext`] into a
//! [`Frame`]; pushing the frame to the panel is the
//! [`DisplayPort`](crate::app::ports::DisplayPort) adapter's job. Rendering
//! never mutates domain state.
//!
//! ```text
//!   DisplayMode ─┐
//!                ├──▶ DisplayRenderer::render ──▶ Frame ──▶ DisplayPort
//!   Context  ────┘
//! ```
//!
//! The reminder icon blinks on its own 500 ms phase, measured from the
//! moment the reminder was activated, so the blink rate does not depend on
//! how often `render` happens to be called.

use core::fmt::Write;

use crate::reminder::{ActiveReminder, ReminderKind};
use crate::scheduler::elapsed_ms;
use crate::sensors::EnvReading;

pub const LINES: usize = 4;
pub const LINE_CAPACITY: usize = 32;

pub type Line = heapless::String<LINE_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Frame
// ───────────────────────────────────────────────────────────────

/// Four lines of text, one screen's worth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: [Line; LINES],
}

impl Frame {
    /// Build a frame from up to four lines. Extra lines are dropped and
    /// over-long lines are cut at a character boundary.
    pub fn new(lines: &[&str]) -> Self {
        let mut frame = Self::default();
        for (i, text) in lines.iter().take(LINES).enumerate() {
            frame.set_line(i, text);
        }
        frame
    }

    pub fn set_line(&mut self, index: usize, text: &str) {
        let Some(line) = self.lines.get_mut(index) else {
            return;
        };
        line.clear();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
    }

    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map_or("", |l| l.as_str())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

// ───────────────────────────────────────────────────────────────
// Modes and context
// ───────────────────────────────────────────────────────────────

/// Which screen is showing. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Clock,
    Reminder,
    Box,
    /// System status, entered at `since_ms`.
    Status { since_ms: u32 },
}

/// Everything a screen may show, borrowed for one render.
#[derive(Debug, Clone, Copy)]
pub struct DisplayContext<'a> {
    pub time: &'a str,
    pub date: &'a str,
    pub online: bool,
    pub box_id: &'a str,
    pub reminder: Option<&'a ActiveReminder>,
    pub box_open: bool,
    pub environment: Option<EnvReading>,
    pub light: u16,
    pub ntp_synced: bool,
    pub doses_confirmed: u8,
}

// ───────────────────────────────────────────────────────────────
// Renderer
// ───────────────────────────────────────────────────────────────

pub struct DisplayRenderer {
    blink_interval_ms: u32,
    blink_epoch_ms: u32,
}

impl DisplayRenderer {
    pub fn new(blink_interval_ms: u32) -> Self {
        Self { blink_interval_ms: blink_interval_ms.max(1), blink_epoch_ms: 0 }
    }

    pub fn blink_interval_ms(&self) -> u32 {
        self.blink_interval_ms
    }

    /// Restart the blink phase (icon visible) at `now_ms`.
    pub fn start_blink(&mut self, now_ms: u32) {
        self.blink_epoch_ms = now_ms;
    }

    /// Icon visibility at `now_ms`: visible for the first interval, hidden
    /// for the next, and so on.
    pub fn blink_visible(&self, now_ms: u32) -> bool {
        (elapsed_ms(now_ms, self.blink_epoch_ms) / self.blink_interval_ms) % 2 == 0
    }

    pub fn render(&self, mode: DisplayMode, ctx: &DisplayContext<'_>, now_ms: u32) -> Frame {
        match mode {
            DisplayMode::Clock => render_clock(ctx),
            DisplayMode::Reminder => match ctx.reminder {
                Some(r) => render_reminder(r, self.blink_visible(now_ms)),
                None => render_clock(ctx),
            },
            DisplayMode::Box => render_box(ctx),
            DisplayMode::Status { .. } => render_status(ctx),
        }
    }
}

fn render_clock(ctx: &DisplayContext<'_>) -> Frame {
    let mut f = Frame::default();
    f.set_line(0, &fmt_line(format_args!("Time: {}", ctx.time)));
    f.set_line(1, &fmt_line(format_args!("Date: {}", ctx.date)));
    let status = if ctx.online { "Online" } else { "Offline" };
    f.set_line(2, &fmt_line(format_args!("Status: {}", status)));
    f.set_line(3, &fmt_line(format_args!("MediBox {}", ctx.box_id)));
    f
}

fn render_reminder(r: &ActiveReminder, icon_visible: bool) -> Frame {
    let icon = match r.kind {
        ReminderKind::Medicine => "!!",
        ReminderKind::Meal => ">>",
    };
    let icon = if icon_visible { icon } else { "  " };
    let message = if r.message.is_empty() {
        match r.kind {
            ReminderKind::Medicine => "Time for medicine",
            ReminderKind::Meal => "Time to eat",
        }
    } else {
        r.message.as_str()
    };

    let mut f = Frame::default();
    f.set_line(0, &fmt_line(format_args!("{} REMINDER {}", icon, icon)));
    f.set_line(1, message);
    f.set_line(2, &fmt_line(format_args!("At: {}", r.time)));
    f.set_line(3, "Press OK");
    f
}

fn render_box(ctx: &DisplayContext<'_>) -> Frame {
    let mut f = Frame::default();
    match ctx.environment {
        Some(env) => {
            f.set_line(0, &fmt_line(format_args!("Temp: {:.1}C", env.temperature_c)));
            f.set_line(1, &fmt_line(format_args!("Humidity: {:.0}%", env.humidity_pct)));
        }
        None => {
            f.set_line(0, "Temp: Error");
            f.set_line(1, "Humidity: Error");
        }
    }
    f.set_line(2, &fmt_line(format_args!("LDR: {}", ctx.light)));
    let state = if ctx.box_open { "OPEN" } else { "CLOSED" };
    f.set_line(3, &fmt_line(format_args!("Box: {}", state)));
    f
}

fn render_status(ctx: &DisplayContext<'_>) -> Frame {
    let mut f = Frame::default();
    f.set_line(0, "System Status:");
    let wifi = if ctx.online { "OK" } else { "Disconnected" };
    f.set_line(1, &fmt_line(format_args!("WiFi: {}", wifi)));
    let ntp = if ctx.ntp_synced { "Synced" } else { "Not Synced" };
    f.set_line(2, &fmt_line(format_args!("NTP: {}", ntp)));
    f.set_line(3, &fmt_line(format_args!("Pills taken: {}", ctx.doses_confirmed)));
    f
}

/// Format into a scratch line; overflow truncates.
fn fmt_line(args: core::fmt::Arguments<'_>) -> heapless::String<64> {
    let mut s = heapless::String::new();
    let _ = s.write_fmt(args);
    s
}

// ───────────────────────────────────────────────────────────────
// Notices (transient full-screen messages)
// ───────────────────────────────────────────────────────────────

pub mod notice {
    //! Canned full-screen messages shown outside the regular modes.

    use super::{fmt_line, Frame};

    /// `count` characters of `text` starting at character `skip`.
    fn chars(text: &str, skip: usize, count: usize) -> heapless::String<64> {
        let mut out = heapless::String::new();
        for c in text.chars().skip(skip).take(count) {
            if out.push(c).is_err() {
                break;
            }
        }
        out
    }

    pub fn boot_splash(version: &str) -> Frame {
        Frame::new(&[
            fmt_line(format_args!("MediBox v{}", version)).as_str(),
            "Starting system...",
            "Please wait...",
        ])
    }

    pub fn boot_identity(box_id: &str) -> Frame {
        Frame::new(&["MediBox", fmt_line(format_args!("ID: {}", box_id)).as_str(), "Starting..."])
    }

    pub fn wifi_connecting(ssid: &str, timeout_secs: u32) -> Frame {
        let timeout = fmt_line(format_args!("Timeout: {}s", timeout_secs));
        Frame::new(&["Connecting to WiFi", ssid, timeout.as_str()])
    }

    pub fn wifi_connected(ip: Option<[u8; 4]>) -> Frame {
        let ip_line = match ip {
            Some([a, b, c, d]) => fmt_line(format_args!("IP: {}.{}.{}.{}", a, b, c, d)),
            None => fmt_line(format_args!("IP: unknown")),
        };
        Frame::new(&["WiFi Connected", ip_line.as_str()])
    }

    pub fn wifi_timeout() -> Frame {
        Frame::new(&["WiFi Error", "Connection", "timeout"])
    }

    pub fn wifi_down() -> Frame {
        Frame::new(&["Error", "WiFi disconnected", "Please check", "connection"])
    }

    pub fn invalid_data() -> Frame {
        Frame::new(&["Error", "Invalid data", "from server", "Check logs"])
    }

    pub fn fetch_retrying(attempt: u8, attempts: u8, error: &str) -> Frame {
        let attempt = fmt_line(format_args!("Attempt {}/{}", attempt, attempts));
        let error = fmt_line(format_args!("Error: {}", chars(error, 0, 16)));
        Frame::new(&["Retrying...", attempt.as_str(), error.as_str()])
    }

    pub fn fetch_failed() -> Frame {
        Frame::new(&["Connection Error", "Failed to check", "reminders", "Will retry later"])
    }

    pub fn dose_prompt() -> Frame {
        Frame::new(&["Have you", "taken your medicine?", "Yes: Left button", "No: Right button"])
    }

    pub fn dose_thanks() -> Frame {
        Frame::new(&["Thank you!"])
    }

    pub fn dose_reminder() -> Frame {
        Frame::new(&["Don't forget", "to take it!"])
    }

    pub fn slate_full() -> Frame {
        Frame::new(&["All doses", "already taken"])
    }

    /// `ERROR!` plus the message split over two 16-character lines.
    pub fn error(message: &str) -> Frame {
        Frame::new(&["ERROR!", chars(message, 0, 16).as_str(), chars(message, 16, 16).as_str()])
    }
}
