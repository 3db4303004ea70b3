//! JSON bodies exchanged with the MediBox backend.
//!
//! | Route | Method | Body |
//! |---|---|---|
//! | `/send_data` | POST | [`TelemetryPayload`] |
//! | `/get_minimal_reminders/{box_id}` | GET | response: [`ReminderResponse`] |
//! | `/acknowledge_reminder` | POST | [`AckRequest`] |
//!
//! Field names are fixed by the server and must not change.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const SEND_DATA_PATH: &str = "/send_data";
pub const ACK_PATH: &str = "/acknowledge_reminder";

pub fn reminders_path(box_id: &str) -> String {
    format!("/get_minimal_reminders/{}", box_id)
}

/// One sensor sample plus the dose flag, as posted every publish cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub temperature: f32,
    pub humidity: f32,
    pub ldr_value: u16,
    pub box_id: String,
    /// Any dose confirmed since the last acknowledged publish.
    pub medicine_taken: bool,
}

/// A single `{time, message}` schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default = "default_entry_time")]
    pub time: String,
    #[serde(default)]
    pub message: String,
}

fn default_entry_time() -> String {
    "00:00".into()
}

/// Reminder schedule for one box. Missing lists read as empty; a missing
/// or false `has_reminder` means there is no active schedule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReminderResponse {
    #[serde(default)]
    pub has_reminder: bool,
    #[serde(default)]
    pub medicine_times: Vec<ScheduleEntry>,
    #[serde(default)]
    pub meal_times: Vec<ScheduleEntry>,
    #[serde(default)]
    pub explanation: String,
    /// Schedule document id, echoed back in the acknowledgement. Kept as
    /// raw JSON since the server may send a string or an object.
    #[serde(rename = "_id", default)]
    pub id: Option<serde_json::Value>,
}

impl ReminderResponse {
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AckRequest {
    pub reminder_id: Option<serde_json::Value>,
}

/// Serialize any request body.
pub fn to_body<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}
