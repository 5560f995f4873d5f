use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use super::{error_body, AppState};
use crate::models::{HealthResponse, SessionResponse, SignInRequest};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/session", web::get().to(current_session))
        .route("/session", web::post().to(sign_in))
        .route("/session", web::delete().to(sign_out));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let backend_healthy = state.board.backend().health_check().await.unwrap_or(false);

    let status = if backend_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/session
async fn current_session(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(SessionResponse {
        user: state.session.current(),
    })
}

/// Sign in with a session token
///
/// POST /api/v1/session
///
/// ```json
/// { "jwt": "string" }
/// ```
async fn sign_in(state: web::Data<AppState>, req: web::Json<SignInRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    match state.board.backend().get_account(&req.jwt).await {
        Ok(identity) => {
            state.session.sign_in(identity.clone());
            HttpResponse::Ok().json(SessionResponse { user: Some(identity) })
        }
        Err(e) => {
            tracing::warn!("Sign-in rejected: {}", e);
            HttpResponse::Unauthorized().json(error_body(401, "sign_in_failed", e.to_string()))
        }
    }
}

/// DELETE /api/v1/session
async fn sign_out(state: web::Data<AppState>) -> impl Responder {
    state.session.sign_out();
    HttpResponse::Ok().json(SessionResponse { user: None })
}
