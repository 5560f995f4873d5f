use crate::core::distance::distance_between;
use crate::core::relation::RelationSet;
use crate::models::{GeoPoint, RelationKey};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Default geofence radius around an event, in meters
pub const CHECKIN_RADIUS_M: f64 = 100.0;

/// Ways the location sensor can fail to produce a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this device")]
    Unsupported,

    #[error("Location permission denied. Enable location access to check in")]
    PermissionDenied,

    #[error("Location information is unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,
}

impl GeolocationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GeolocationError::Unsupported => "unsupported",
            GeolocationError::PermissionDenied => "permission_denied",
            GeolocationError::PositionUnavailable => "position_unavailable",
            GeolocationError::Timeout => "timeout",
        }
    }
}

/// Result of comparing a fix against an event's geofence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Permitted { distance_m: f64 },
    TooFar { distance_m: f64 },
}

impl GateDecision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, GateDecision::Permitted { .. })
    }

    pub fn distance_m(&self) -> f64 {
        match self {
            GateDecision::Permitted { distance_m } | GateDecision::TooFar { distance_m } => *distance_m,
        }
    }
}

/// Outcome of a check-in attempt that got past the sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckinOutcome {
    /// A record already exists; nothing was measured or written
    AlreadyCheckedIn,
    CheckedIn {
        #[serde(rename = "distanceM")]
        distance_m: f64,
    },
    TooFar {
        #[serde(rename = "distanceM")]
        distance_m: f64,
        #[serde(rename = "radiusM")]
        radius_m: f64,
    },
}

/// Proximity gate for check-ins
#[derive(Debug, Clone, Copy)]
pub struct CheckinGate {
    radius_m: f64,
}

impl CheckinGate {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Permitted iff the fix lies within the radius, boundary included
    #[inline]
    pub fn evaluate(&self, event_position: GeoPoint, current: GeoPoint) -> GateDecision {
        let distance_m = distance_between(event_position, current);
        if distance_m <= self.radius_m {
            GateDecision::Permitted { distance_m }
        } else {
            GateDecision::TooFar { distance_m }
        }
    }

    /// Run a full attempt against the check-in relation
    ///
    /// `locate` is only invoked when no record exists for `key`. A permitted
    /// attempt does not touch `checkins`; the caller records the pair once the
    /// backend has accepted it.
    pub async fn attempt<F, Fut>(
        &self,
        checkins: &RelationSet,
        key: &RelationKey,
        event_position: GeoPoint,
        locate: F,
    ) -> Result<CheckinOutcome, GeolocationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<GeoPoint, GeolocationError>>,
    {
        if checkins.contains(key) {
            return Ok(CheckinOutcome::AlreadyCheckedIn);
        }

        let current = locate().await?;
        Ok(self.outcome(self.evaluate(event_position, current)))
    }

    pub fn outcome(&self, decision: GateDecision) -> CheckinOutcome {
        match decision {
            GateDecision::Permitted { distance_m } => CheckinOutcome::CheckedIn { distance_m },
            GateDecision::TooFar { distance_m } => CheckinOutcome::TooFar {
                distance_m,
                radius_m: self.radius_m,
            },
        }
    }
}

impl Default for CheckinGate {
    fn default() -> Self {
        Self::new(CHECKIN_RADIUS_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::longitude_offset_for;
    use std::cell::Cell;

    const TOWER_BRIDGE: GeoPoint = GeoPoint::new(51.5055, -0.0754);

    fn offset_by(meters: f64) -> GeoPoint {
        let lon = TOWER_BRIDGE.longitude + longitude_offset_for(TOWER_BRIDGE.latitude, meters);
        GeoPoint::new(TOWER_BRIDGE.latitude, lon)
    }

    #[test]
    fn test_gate_threshold() {
        let gate = CheckinGate::default();

        assert!(gate.evaluate(TOWER_BRIDGE, TOWER_BRIDGE).is_permitted());
        assert!(gate.evaluate(TOWER_BRIDGE, offset_by(99.0)).is_permitted());
        assert!(!gate.evaluate(TOWER_BRIDGE, offset_by(101.0)).is_permitted());
    }

    #[test]
    fn test_too_far_reports_distance() {
        let gate = CheckinGate::default();
        let outcome = gate.outcome(gate.evaluate(TOWER_BRIDGE, offset_by(250.0)));

        match outcome {
            CheckinOutcome::TooFar { distance_m, radius_m } => {
                assert!((distance_m - 250.0).abs() < 0.01);
                assert_eq!(radius_m, 100.0);
            }
            other => panic!("expected TooFar, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_existing_checkin_skips_locate() {
        let gate = CheckinGate::default();
        let key = RelationKey::new("u1", "e1");
        let checkins: RelationSet = [key.clone()].into_iter().collect();
        let located = Cell::new(false);

        let outcome = gate
            .attempt(&checkins, &key, TOWER_BRIDGE, || {
                located.set(true);
                async { Ok(TOWER_BRIDGE) }
            })
            .await
            .unwrap();

        assert_eq!(outcome, CheckinOutcome::AlreadyCheckedIn);
        assert!(!located.get());
        assert_eq!(checkins.len(), 1);
    }

    #[tokio::test]
    async fn test_sensor_failures_are_distinct() {
        let gate = CheckinGate::default();
        let key = RelationKey::new("u1", "e1");
        let checkins = RelationSet::new();

        for cause in [
            GeolocationError::Unsupported,
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
        ] {
            let result = gate
                .attempt(&checkins, &key, TOWER_BRIDGE, move || async move { Err(cause) })
                .await;
            assert_eq!(result, Err(cause));
        }
    }

    #[test]
    fn test_geolocation_error_wire_names() {
        let parsed: GeolocationError = serde_json::from_str("\"permission_denied\"").unwrap();
        assert_eq!(parsed, GeolocationError::PermissionDenied);
        assert_eq!(parsed.code(), "permission_denied");
    }
}
