// Route exports
pub mod events;
pub mod session;

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::models::ErrorResponse;
use crate::services::{BackendError, Board, BoardError, SessionHub};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<Board>,
    pub session: Arc<SessionHub>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(session::configure)
            .configure(events::configure),
    );
}

pub(crate) fn error_body(status: u16, error: &str, message: String) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    }
}

/// Map a board failure to its HTTP response
pub(crate) fn board_error_response(err: &BoardError) -> HttpResponse {
    let message = err.to_string();
    match err {
        BoardError::NotSignedIn => {
            HttpResponse::Unauthorized().json(error_body(401, "not_signed_in", message))
        }
        BoardError::EventNotFound(_) => {
            HttpResponse::NotFound().json(error_body(404, "event_not_found", message))
        }
        BoardError::InvalidEvent(_) => {
            HttpResponse::BadRequest().json(error_body(400, "invalid_event", message))
        }
        BoardError::DateRange(_) => {
            HttpResponse::BadRequest().json(error_body(400, "invalid_date_range", message))
        }
        BoardError::Location(cause) => {
            HttpResponse::UnprocessableEntity().json(error_body(422, cause.code(), message))
        }
        BoardError::Backend(BackendError::Unauthorized) => {
            HttpResponse::Unauthorized().json(error_body(401, "backend_unauthorized", message))
        }
        BoardError::Backend(e) => {
            tracing::error!("Backend failure: {}", e);
            HttpResponse::BadGateway().json(error_body(502, "backend_error", message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeolocationError;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (BoardError::NotSignedIn, StatusCode::UNAUTHORIZED),
            (BoardError::EventNotFound("e1".into()), StatusCode::NOT_FOUND),
            (BoardError::Location(GeolocationError::Timeout), StatusCode::UNPROCESSABLE_ENTITY),
            (
                BoardError::Backend(BackendError::ApiError("500".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(board_error_response(&err).status(), status);
        }
    }
}
