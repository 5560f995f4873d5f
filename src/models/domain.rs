use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Wire format of an event's combined date and time
pub const EVENT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both coordinates are finite and within their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Fixed set of event categories
///
/// Unknown strings read from the backend collapse to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Music,
    Art,
    Food,
    Sports,
    Tech,
    Community,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Music,
        Category::Art,
        Category::Food,
        Category::Sports,
        Category::Tech,
        Category::Community,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Music => "Music",
            Category::Art => "Art",
            Category::Food => "Food",
            Category::Sports => "Sports",
            Category::Tech => "Tech",
            Category::Community => "Community",
            Category::Other => "Other",
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .unwrap_or_default()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local event plotted on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
    #[serde(rename = "dateTime", with = "event_date_time")]
    pub date_time: NaiveDateTime,
    pub description: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    #[serde(default)]
    pub category: Category,
}

impl Event {
    /// Calendar date of the event, no time zone conversion
    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }
}

/// Event fields as submitted, before an identifier is assigned
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
    #[serde(rename = "dateTime", with = "event_date_time")]
    pub date_time: NaiveDateTime,
    pub description: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub category: Category,
}

impl NewEvent {
    pub fn into_event(self, id: String) -> Event {
        Event {
            id,
            title: self.title,
            location_name: self.location_name,
            date_time: self.date_time,
            description: self.description,
            position: self.position,
            category: self.category,
        }
    }
}

/// Combine separate date (`YYYY-MM-DD`) and time (`HH:MM`) inputs
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
    Some(date.and_time(time))
}

/// Serde adapter for the `"YYYY-MM-DD HH:MM"` date-time string
pub mod event_date_time {
    use super::EVENT_DATE_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(EVENT_DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, EVENT_DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A (user, event) pair, the key of both interest and check-in relations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey {
    pub user_id: String,
    pub event_id: String,
}

impl RelationKey {
    pub fn new(user_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            event_id: event_id.into(),
        }
    }

    /// Deterministic backend document ID, so the store itself rejects duplicates
    pub fn document_id(&self) -> String {
        let name = format!("{}:{}", self.user_id, self.event_id);
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes())
            .simple()
            .to_string()
    }
}

/// A user's interest in an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "eventId")]
    pub event_id: String,
}

impl InterestRecord {
    pub fn key(&self) -> RelationKey {
        RelationKey::new(self.user_id.clone(), self.event_id.clone())
    }
}

/// A confirmed on-site check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "checkedInAt")]
    pub checked_in_at: chrono::DateTime<chrono::Utc>,
}

impl CheckinRecord {
    pub fn key(&self) -> RelationKey {
        RelationKey::new(self.user_id.clone(), self.event_id.clone())
    }
}

/// Check-in joined with a summary of its event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinSummary {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub title: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
    #[serde(rename = "dateTime", with = "event_date_time")]
    pub date_time: NaiveDateTime,
    #[serde(rename = "checkedInAt")]
    pub checked_in_at: chrono::DateTime<chrono::Utc>,
}

/// Signed-in user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("date range start {from} is after its end {to}")]
    Inverted { from: NaiveDate, to: NaiveDate },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Inclusive calendar-day window used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    /// `days` calendar days starting at `today`
    pub fn starting(today: NaiveDate, days: u32) -> Self {
        let to = today
            .checked_add_days(chrono::Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { from: today, to }
    }

    /// Parse optional `YYYY-MM-DD` bounds, falling back to the default window
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
        default_days: u32,
    ) -> Result<Self, DateRangeError> {
        let default = Self::starting(today, default_days);
        let from = match from {
            Some(s) => parse_date(s)?,
            None => default.from,
        };
        let to = match to {
            Some(s) => parse_date(s)?,
            None => default.to.max(from),
        };
        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// First instant of the window
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// Last instant of the window, 23:59:59 on the `to` day
    pub fn end(&self) -> NaiveDateTime {
        self.to.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start() && at <= self.end()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DateRangeError::InvalidDate(s.to_string()))
}
