use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::GeolocationError;
use crate::models::domain::{combine_date_time, Category, GeoPoint, NewEvent};

/// Request to create an event at a clicked map position
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub title: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    #[serde(alias = "location_name", rename = "locationName")]
    pub location_name: String,
    /// `YYYY-MM-DD`
    #[validate(custom(function = "not_blank"))]
    pub date: String,
    /// `HH:MM`
    #[validate(custom(function = "not_blank"))]
    pub time: String,
    #[validate(custom(function = "not_blank"), length(max = 5000))]
    pub description: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateEventRequest {
    /// Build the event to persist, combining date and time
    ///
    /// Returns `None` when date or time do not parse.
    pub fn to_new_event(&self) -> Option<NewEvent> {
        let date_time = combine_date_time(&self.date, &self.time)?;
        Some(NewEvent {
            title: self.title.trim().to_string(),
            location_name: self.location_name.trim().to_string(),
            date_time,
            description: self.description.trim().to_string(),
            position: GeoPoint::new(self.latitude, self.longitude),
            category: self
                .category
                .as_deref()
                .map(Category::from)
                .unwrap_or_default(),
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Query parameters of the event listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEventsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
}

/// Check-in request: the device's fix, or why it has none
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckinRequest {
    #[serde(default)]
    pub position: Option<GeoPoint>,
    #[serde(default, alias = "location_error", rename = "locationError")]
    pub location_error: Option<GeolocationError>,
}

impl CheckinRequest {
    /// The sensor reading this request carries
    ///
    /// A reported error wins over a position; a request with neither means the
    /// client has no location capability. Out-of-range coordinates count as an
    /// unusable fix.
    pub fn reading(&self) -> Result<GeoPoint, GeolocationError> {
        if let Some(err) = self.location_error {
            return Err(err);
        }
        match self.position {
            Some(p) if p.is_valid() => Ok(p),
            Some(_) => Err(GeolocationError::PositionUnavailable),
            None => Err(GeolocationError::Unsupported),
        }
    }
}

/// Sign-in with a session token from the OAuth flow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    pub jwt: String,
}
