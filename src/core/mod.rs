// Core algorithm exports
pub mod checkin;
pub mod distance;
pub mod filters;
pub mod interest;
pub mod relation;

pub use checkin::{CheckinGate, CheckinOutcome, GateDecision, GeolocationError, CHECKIN_RADIUS_M};
pub use distance::{distance_between, haversine_distance};
pub use filters::{filter_events, CategorySelector};
pub use interest::{apply_toggle, count_by_event, plan_toggle, toggle_interest, InterestChange};
pub use relation::RelationSet;
