//! Scene Board - map-centric local event board
//!
//! This library provides the geofenced check-in gate and the event filter
//! behind the Scene map, plus the view model and backend client the service
//! binary wires together.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    filter_events, haversine_distance, CategorySelector, CheckinGate, CheckinOutcome,
    GeolocationError, RelationSet,
};
pub use models::{Category, DateRange, Event, GeoPoint, RelationKey, UserIdentity};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let gate = CheckinGate::default();
        let p = GeoPoint::new(51.5055, -0.0754);
        assert!(gate.evaluate(p, p).is_permitted());
        assert_eq!(haversine_distance(p.latitude, p.longitude, p.latitude, p.longitude), 0.0);
    }
}
