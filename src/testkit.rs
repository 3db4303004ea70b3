//! Simulated board and network for unit tests.
//!
//! [`SimBoard`] owns a fake millisecond clock that only moves when code
//! sleeps through [`MonotonicClock::delay_ms`], so bounded waits run
//! instantly and deterministically. Light level and button lines are
//! scripted against that clock.

use std::collections::{HashMap, VecDeque};

use crate::app::events::AppEvent;
use crate::app::ports::{
    Button, ButtonPort, BuzzerPort, DisplayPort, EnvironmentSensorPort, EventSink, HttpPort,
    HttpResponse, IndicatorPort, LightSensorPort, MonotonicClock, TimeSource, WifiPort,
};
use crate::display::Frame;
use crate::error::{Error, Result};
use crate::sensors::EnvReading;

pub struct SimBoard {
    pub now: u32,
    /// `(from_ms, level)` steps; the last step at or before `now` wins.
    pub light_steps: Vec<(u32, u16)>,
    /// `(button, from_ms, until_ms)` windows during which the line is low.
    pub presses: Vec<(Button, u32, u32)>,
    pub env: Result<EnvReading>,
    pub indicators: Vec<bool>,
    /// `(at_ms, duty)` for every buzzer write.
    pub duty_log: Vec<(u32, u16)>,
    pub frames: Vec<Frame>,
    pub display_fails: bool,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            now: 0,
            light_steps: vec![(0, 800)],
            presses: Vec::new(),
            env: Ok(EnvReading { temperature_c: 25.0, humidity_pct: 60.0 }),
            indicators: vec![false; 4],
            duty_log: Vec::new(),
            frames: Vec::new(),
            display_fails: false,
        }
    }

    pub fn set_light(&mut self, level: u16) {
        self.light_steps.push((self.now, level));
    }

    pub fn press(&mut self, button: Button, from_ms: u32, hold_ms: u32) {
        self.presses.push((button, from_ms, from_ms + hold_ms));
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn buzzer_duty(&self) -> u16 {
        self.duty_log.last().map_or(0, |&(_, d)| d)
    }

    /// Durations of completed buzzes, measured from each non-zero duty write
    /// to the next zero write.
    pub fn buzz_durations(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut started = None;
        for &(at, duty) in &self.duty_log {
            match (duty, started) {
                (0, Some(s)) => {
                    out.push(at - s);
                    started = None;
                }
                (d, _) if d > 0 => started = Some(at),
                _ => {}
            }
        }
        out
    }

    pub fn lit_count(&self) -> usize {
        self.indicators.iter().filter(|&&on| on).count()
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl MonotonicClock for SimBoard {
    fn now_ms(&self) -> u32 {
        self.now
    }
    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

impl LightSensorPort for SimBoard {
    fn read_light(&mut self) -> u16 {
        self.light_steps
            .iter()
            .filter(|&&(from, _)| from <= self.now)
            .next_back()
            .map_or(0, |&(_, level)| level)
    }
}

impl EnvironmentSensorPort for SimBoard {
    fn read_environment(&mut self) -> Result<EnvReading> {
        self.env
    }
}

impl ButtonPort for SimBoard {
    fn is_low(&mut self, button: Button) -> bool {
        self.presses
            .iter()
            .any(|&(b, from, until)| b == button && self.now >= from && self.now < until)
    }
}

impl IndicatorPort for SimBoard {
    fn indicator_count(&self) -> usize {
        self.indicators.len()
    }
    fn set_indicator(&mut self, index: usize, on: bool) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = on;
        }
    }
}

impl BuzzerPort for SimBoard {
    fn set_buzzer_duty(&mut self, duty: u16) {
        self.duty_log.push((self.now, duty));
    }
}

impl DisplayPort for SimBoard {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        if self.display_fails {
            return Err(Error::Display);
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub post: bool,
    pub url: String,
    pub body: Vec<u8>,
}

pub struct SimNet {
    pub associated: bool,
    /// Whether `begin_association` brings the link up.
    pub associate_on_begin: bool,
    /// Queued responses per URL; the last one keeps repeating.
    pub routes: HashMap<String, VecDeque<Result<HttpResponse>>>,
    pub requests: Vec<Request>,
    pub unix_time: Result<i64>,
}

impl SimNet {
    pub fn online() -> Self {
        Self {
            associated: true,
            associate_on_begin: true,
            routes: HashMap::new(),
            requests: Vec::new(),
            unix_time: Err(Error::TimeSyncFailure),
        }
    }

    pub fn offline() -> Self {
        Self { associated: false, associate_on_begin: false, ..Self::online() }
    }

    pub fn respond(&mut self, url: &str, status: u16, body: &str) {
        self.push(url, Ok(HttpResponse { status, body: body.as_bytes().to_vec() }));
    }

    pub fn fail(&mut self, url: &str) {
        self.push(url, Err(Error::EndpointUnreachable));
    }

    fn push(&mut self, url: &str, r: Result<HttpResponse>) {
        self.routes.entry(url.to_string()).or_default().push_back(r);
    }

    pub fn requests_to(&self, url: &str) -> Vec<&Request> {
        self.requests.iter().filter(|r| r.url == url).collect()
    }

    fn answer(&mut self, url: &str) -> Result<HttpResponse> {
        let Some(queue) = self.routes.get_mut(url) else {
            return Err(Error::EndpointUnreachable);
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Err(Error::EndpointUnreachable))
        } else {
            queue.front().cloned().unwrap_or(Err(Error::EndpointUnreachable))
        }
    }
}

impl WifiPort for SimNet {
    fn is_associated(&mut self) -> bool {
        self.associated
    }
    fn begin_association(&mut self) -> Result<()> {
        if self.associate_on_begin {
            self.associated = true;
        }
        Ok(())
    }
    fn local_ip(&self) -> Option<[u8; 4]> {
        self.associated.then_some([192, 168, 43, 10])
    }
}

impl HttpPort for SimNet {
    fn get(&mut self, url: &str) -> Result<HttpResponse> {
        self.requests.push(Request { post: false, url: url.into(), body: Vec::new() });
        self.answer(url)
    }
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse> {
        self.requests.push(Request { post: true, url: url.into(), body: body.to_vec() });
        self.answer(url)
    }
}

impl TimeSource for SimNet {
    fn fetch_unix_time(&mut self) -> Result<i64> {
        self.unix_time
    }
}

#[derive(Default)]
pub struct RecordingSink(pub Vec<AppEvent>);

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(event.clone());
    }
}
