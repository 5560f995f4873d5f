use serde::{Deserialize, Serialize};

use crate::core::CheckinOutcome;
use crate::models::domain::{CheckinSummary, Event, UserIdentity};

/// An event as shown to the signed-in user
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    #[serde(rename = "interestCount")]
    pub interest_count: u32,
    pub interested: bool,
    #[serde(rename = "checkedIn")]
    pub checked_in: bool,
}

/// Response for the event listing
#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventView>,
    pub from: chrono::NaiveDate,
    pub to: chrono::NaiveDate,
    #[serde(rename = "totalKnown")]
    pub total_known: usize,
}

/// Interest state after a toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestResponse {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub interested: bool,
    #[serde(rename = "interestCount")]
    pub interest_count: u32,
}

/// Check-in attempt result
#[derive(Debug, Clone, Serialize)]
pub struct CheckinResponse {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(flatten)]
    pub outcome: CheckinOutcome,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckinHistoryResponse {
    pub checkins: Vec<CheckinSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user: Option<UserIdentity>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
