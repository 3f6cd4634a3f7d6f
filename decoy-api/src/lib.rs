//! DECOY API - REST Layer for the Scam Honeypot Engine
//!
//! This crate exposes the honeypot engine over HTTP (Axum): a session-turn
//! endpoint that classifies, extracts, and replies; a finalize endpoint that
//! produces (and optionally grades) the intelligence report; and read-only
//! scenario endpoints. Session state lives in an in-process registry keyed
//! by session id.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
pub use types::{
    FinalizeRequest, FinalizeResponse, RequestMetadata, ScenarioListResponse, TurnRequest,
    TurnResponse, WireMessage,
};
