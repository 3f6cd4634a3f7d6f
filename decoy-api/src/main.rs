//! DECOY API Server Entry Point
//!
//! Bootstraps configuration, selects the reply provider, and starts the
//! Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use decoy_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use decoy_llm::{GeminiProvider, ReplyOrchestrator, ReplyProvider, UnconfiguredProvider};
use decoy_score::ScenarioSet;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env();
    config
        .honeypot
        .validate()
        .map_err(|e| ApiError::invalid_input(format!("Invalid engine configuration: {}", e)))?;

    let provider: Arc<dyn ReplyProvider> = match &config.gemini_api_key {
        Some(key) => {
            let gemini = GeminiProvider::new(key.clone(), &config.honeypot.provider)
                .map_err(|e| {
                    ApiError::internal_error(format!("Failed to build Gemini provider: {}", e))
                })?;
            tracing::info!(model = %config.honeypot.provider.model, "Using Gemini reply provider");
            Arc::new(gemini)
        }
        None => {
            tracing::warn!(
                "GEMINI_API_KEY not set; every reply will use the fallback text"
            );
            Arc::new(UnconfiguredProvider)
        }
    };

    let orchestrator = Arc::new(ReplyOrchestrator::new(provider, &config.honeypot));
    let state = AppState::new(orchestrator, Arc::new(ScenarioSet::builtin()));

    let app: Router = create_api_router(state);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "Starting DECOY API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
