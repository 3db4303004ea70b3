//! Mock board and network adapters for integration tests.
//!
//! The board's clock only moves when the code under test sleeps, so the
//! blocking prompt and WiFi waits run instantly. Light level and button
//! presses are scripted against that clock; every actuator write and every
//! HTTP request is recorded for assertions.

use medibox::app::events::AppEvent;
use medibox::app::ports::{
    Button, ButtonPort, BuzzerPort, DisplayPort, EnvironmentSensorPort, EventSink, HttpPort, HttpResponse,
    IndicatorPort, LightSensorPort, MonotonicClock, TimeSource, WifiPort,
};
use medibox::app::service::Controller;
use medibox::display::Frame;
use medibox::error::{Error, Result};
use medibox::sensors::EnvReading;
use std::collections::HashMap;

/// 2026-10-19 01:30:00 UTC, which is 08:30 local at the default UTC+7.
pub const MORNING: i64 = 1_792_373_400;

pub const BASE: &str = "http://192.168.43.229:8080";
pub const BACKUP: &str = "http://192.168.43.230:8080";

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub now: u32,
    light: Vec<(u32, u16)>,
    presses: Vec<(Button, u32, u32)>,
    pub climate: Result<EnvReading>,
    pub leds: [bool; 4],
    pub buzzer_writes: Vec<(u32, u16)>,
    pub frames: Vec<Frame>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            now: 0,
            light: vec![(0, 800)],
            presses: Vec::new(),
            climate: Ok(EnvReading { temperature_c: 24.5, humidity_pct: 55.0 }),
            leds: [false; 4],
            buzzer_writes: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Light level from `at_ms` onwards.
    pub fn light_at(&mut self, at_ms: u32, level: u16) {
        self.light.push((at_ms, level));
        self.light.sort_by_key(|&(at, _)| at);
    }

    /// Open the lid at `at_ms` and close it again `for_ms` later.
    pub fn open_lid(&mut self, at_ms: u32, for_ms: u32) {
        self.light_at(at_ms, 1200);
        self.light_at(at_ms + for_ms, 800);
    }

    pub fn press(&mut self, button: Button, at_ms: u32, hold_ms: u32) {
        self.presses.push((button, at_ms, at_ms + hold_ms));
    }

    pub fn lit(&self) -> usize {
        self.leds.iter().filter(|&&on| on).count()
    }

    /// `(start_ms, length_ms)` of every completed buzz.
    pub fn buzzes(&self) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        let mut since = None;
        for &(at, duty) in &self.buzzer_writes {
            if duty > 0 {
                since = Some(at);
            } else if let Some(start) = since.take() {
                out.push((start, at - start));
            }
        }
        out
    }

    pub fn shown(&self, text: &str) -> bool {
        self.frames.iter().any(|f| f.contains(text))
    }

    pub fn last_frame(&self) -> &Frame {
        self.frames.last().expect("nothing drawn yet")
    }
}

impl MonotonicClock for MockBoard {
    fn now_ms(&self) -> u32 {
        self.now
    }
    fn delay_ms(&mut self, ms: u32) {
        self.now += ms;
    }
}

impl LightSensorPort for MockBoard {
    fn read_light(&mut self) -> u16 {
        let now = self.now;
        self.light.iter().rev().find(|&&(at, _)| at <= now).map_or(0, |&(_, level)| level)
    }
}

impl EnvironmentSensorPort for MockBoard {
    fn read_environment(&mut self) -> Result<EnvReading> {
        self.climate
    }
}

impl ButtonPort for MockBoard {
    fn is_low(&mut self, button: Button) -> bool {
        let now = self.now;
        self.presses.iter().any(|&(b, from, until)| b == button && (from..until).contains(&now))
    }
}

impl IndicatorPort for MockBoard {
    fn indicator_count(&self) -> usize {
        self.leds.len()
    }
    fn set_indicator(&mut self, index: usize, on: bool) {
        self.leds[index] = on;
    }
}

impl BuzzerPort for MockBoard {
    fn set_buzzer_duty(&mut self, duty: u16) {
        self.buzzer_writes.push((self.now, duty));
    }
}

impl DisplayPort for MockBoard {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

// ── MockNet ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: String,
}

/// Scripted server: each URL answers with a fixed response (or a transport
/// error) until re-scripted. Unscripted URLs are unreachable.
pub struct MockNet {
    pub link_up: bool,
    pub joins_on_begin: bool,
    pub joins: u32,
    routes: HashMap<String, Result<HttpResponse>>,
    pub calls: Vec<Call>,
    pub unix_time: Result<i64>,
}

#[allow(dead_code)]
impl MockNet {
    pub fn new() -> Self {
        Self {
            link_up: true,
            joins_on_begin: true,
            joins: 0,
            routes: HashMap::new(),
            calls: Vec::new(),
            unix_time: Ok(MORNING),
        }
    }

    /// No access point in range.
    pub fn no_ap() -> Self {
        Self { link_up: false, joins_on_begin: false, ..Self::new() }
    }

    pub fn answer(&mut self, url: &str, status: u16, body: &str) {
        self.routes.insert(url.into(), Ok(HttpResponse { status, body: body.as_bytes().to_vec() }));
    }

    pub fn unreachable(&mut self, url: &str) {
        self.routes.insert(url.into(), Err(Error::EndpointUnreachable));
    }

    pub fn calls_to(&self, url: &str) -> Vec<&Call> {
        self.calls.iter().filter(|c| c.url == url).collect()
    }

    fn reply(&mut self, method: &'static str, url: &str, body: &[u8]) -> Result<HttpResponse> {
        self.calls.push(Call { method, url: url.into(), body: String::from_utf8_lossy(body).into_owned() });
        self.routes.get(url).cloned().unwrap_or(Err(Error::EndpointUnreachable))
    }
}

impl WifiPort for MockNet {
    fn is_associated(&mut self) -> bool {
        self.link_up
    }
    fn begin_association(&mut self) -> Result<()> {
        self.joins += 1;
        if self.joins_on_begin {
            self.link_up = true;
        }
        Ok(())
    }
    fn local_ip(&self) -> Option<[u8; 4]> {
        self.link_up.then_some([192, 168, 43, 17])
    }
}

impl HttpPort for MockNet {
    fn get(&mut self, url: &str) -> Result<HttpResponse> {
        self.reply("GET", url, &[])
    }
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse> {
        self.reply("POST", url, body)
    }
}

impl TimeSource for MockNet {
    fn fetch_unix_time(&mut self) -> Result<i64> {
        self.unix_time
    }
}

// ── Event log ─────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog(pub Vec<AppEvent>);

#[allow(dead_code)]
impl EventLog {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Drive the main loop the way the firmware does: tick, then yield.
pub fn run_until(c: &mut Controller, board: &mut MockBoard, net: &mut MockNet, log: &mut EventLog, until_ms: u32) {
    while board.now < until_ms {
        c.tick(board, net, log).expect("tick failed");
        let y = c.yield_ms();
        board.delay_ms(y);
    }
}
