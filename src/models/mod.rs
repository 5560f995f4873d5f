// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    combine_date_time, Category, CheckinRecord, CheckinSummary, DateRange, DateRangeError, Event,
    GeoPoint, InterestRecord, NewEvent, RelationKey, UserIdentity, EVENT_DATE_TIME_FORMAT,
};
pub use requests::{CheckinRequest, CreateEventRequest, ListEventsQuery, SignInRequest};
pub use responses::{
    CheckinHistoryResponse, CheckinResponse, ErrorResponse, EventView, EventsResponse,
    HealthResponse, InterestResponse, SessionResponse,
};
