use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::{board_error_response, error_body, AppState};
use crate::core::{CategorySelector, CheckinOutcome};
use crate::models::{
    CheckinHistoryResponse, CheckinRequest, CheckinResponse, CreateEventRequest, EventsResponse,
    InterestResponse, ListEventsQuery,
};
use crate::services::ReportedLocation;

/// Configure all event-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(list_events))
        .route("/events", web::post().to(create_event))
        .route("/events/{id}/interest", web::post().to(toggle_interest))
        .route("/events/{id}/checkin", web::post().to(check_in))
        .route("/checkins", web::get().to(checkin_history))
        .route("/refresh", web::post().to(refresh));
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Visible events for the map
///
/// GET /api/v1/events?from=2024-03-20&to=2024-03-27&category=Music
async fn list_events(
    state: web::Data<AppState>,
    query: web::Query<ListEventsQuery>,
) -> impl Responder {
    let today = today();
    let range = match state
        .board
        .date_range(query.from.as_deref(), query.to.as_deref(), today)
    {
        Ok(range) => range,
        Err(e) => return board_error_response(&e),
    };

    let selector: CategorySelector = query
        .category
        .as_deref()
        .unwrap_or("all")
        .parse()
        .unwrap_or_default();

    let identity = state.session.current();
    let (events, total_known) = state
        .board
        .visible_events(identity.as_ref(), &range, &selector, today)
        .await;

    tracing::debug!(
        "Showing {} of {} events ({} to {}, {:?})",
        events.len(),
        total_known,
        range.from(),
        range.to(),
        selector
    );

    HttpResponse::Ok().json(EventsResponse {
        events,
        from: range.from(),
        to: range.to(),
        total_known,
    })
}

/// Create an event at a clicked position
///
/// POST /api/v1/events
///
/// Request body:
/// ```json
/// {
///   "title": "string",
///   "locationName": "string",
///   "date": "YYYY-MM-DD",
///   "time": "HH:MM",
///   "description": "string",
///   "latitude": 51.5,
///   "longitude": -0.1,
///   "category": "Music"
/// }
/// ```
async fn create_event(
    state: web::Data<AppState>,
    req: web::Json<CreateEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_event request: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let Some(new_event) = req.to_new_event() else {
        return HttpResponse::BadRequest().json(error_body(
            400,
            "Validation failed",
            format!("Invalid date or time: '{} {}'", req.date, req.time),
        ));
    };

    let identity = state.session.current();
    match state.board.create_event(identity.as_ref(), new_event).await {
        Ok(event) => HttpResponse::Created().json(event),
        Err(e) => board_error_response(&e),
    }
}

/// POST /api/v1/events/{id}/interest
async fn toggle_interest(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let event_id = path.into_inner();
    let identity = state.session.current();

    match state.board.toggle_interest(identity.as_ref(), &event_id).await {
        Ok(result) => HttpResponse::Ok().json(InterestResponse {
            event_id,
            interested: result.interested,
            interest_count: result.count,
        }),
        Err(e) => board_error_response(&e),
    }
}

/// Check in to an event
///
/// POST /api/v1/events/{id}/checkin
///
/// Request body, either:
/// ```json
/// { "position": { "latitude": 51.5055, "longitude": -0.0754 } }
/// { "locationError": "permission_denied" }
/// ```
async fn check_in(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CheckinRequest>,
) -> impl Responder {
    let event_id = path.into_inner();
    let identity = state.session.current();
    let sensor = ReportedLocation(req.reading());

    match state.board.check_in(identity.as_ref(), &event_id, &sensor).await {
        Ok(outcome) => {
            let message = match outcome {
                CheckinOutcome::AlreadyCheckedIn => "Already checked in".to_string(),
                CheckinOutcome::CheckedIn { .. } => "Checked in".to_string(),
                CheckinOutcome::TooFar { distance_m, radius_m } => format!(
                    "Too far to check in: {:.0} m away, must be within {:.0} m",
                    distance_m, radius_m
                ),
            };
            HttpResponse::Ok().json(CheckinResponse {
                event_id,
                outcome,
                message,
            })
        }
        Err(e) => board_error_response(&e),
    }
}

/// GET /api/v1/checkins
async fn checkin_history(state: web::Data<AppState>) -> impl Responder {
    let identity = state.session.current();

    match state.board.checkin_history(identity.as_ref()).await {
        Ok(checkins) => HttpResponse::Ok().json(CheckinHistoryResponse {
            count: checkins.len(),
            checkins,
        }),
        Err(e) => board_error_response(&e),
    }
}

/// POST /api/v1/refresh
async fn refresh(state: web::Data<AppState>) -> impl Responder {
    let identity = state.session.current();

    match state.board.refresh(identity.as_ref()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => board_error_response(&e),
    }
}
