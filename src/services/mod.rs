// Service exports
pub mod backend;
pub mod board;
pub mod session;

pub use backend::{BackendClient, BackendCollections, BackendError};
pub use board::{Board, BoardError, BoardSettings, InterestState, LocationSensor, ReportedLocation, ViewState};
pub use session::SessionHub;
