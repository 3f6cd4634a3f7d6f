//! REST API Routes Module
//!
//! - POST /api/v1/message - process one session turn
//! - POST /api/v1/session/{id}/final - finalize (and optionally grade) a session
//! - GET  /api/v1/scenarios - list scenario fixtures
//! - GET  /api/v1/scenarios/sample - weighted-sample one scenario
//! - GET  /health - liveness
//!
//! CORS is permissive (no browser credential flows) and every request is
//! traced via tower-http.

pub mod health;
pub mod message;
pub mod scenario;
pub mod session;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Assemble the full API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::get_health))
        .route("/api/v1/message", post(message::post_message))
        .route(
            "/api/v1/session/:session_id/final",
            post(session::finalize_session),
        )
        .route("/api/v1/scenarios", get(scenario::list_scenarios))
        .route("/api/v1/scenarios/sample", get(scenario::sample_scenario))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
