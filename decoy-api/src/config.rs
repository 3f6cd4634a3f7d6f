//! API Configuration Module
//!
//! Configuration is loaded from environment variables with sensible defaults
//! for development. The provider API key is optional: without one the server
//! still runs, with every reply degrading to the fallback text.

use crate::error::{ApiError, ApiResult};
use decoy_core::HoneypotConfig;
use std::net::SocketAddr;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host (DECOY_API_BIND, default 0.0.0.0).
    pub bind_host: String,

    /// Bind port (PORT or DECOY_API_PORT, default 3000).
    pub port: u16,

    /// Gemini API key (GEMINI_API_KEY). Optional.
    pub gemini_api_key: Option<String>,

    /// Engine configuration: persona, fallback reply, provider settings.
    pub honeypot: HoneypotConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut honeypot = HoneypotConfig::default();

        if let Ok(persona) = std::env::var("DECOY_PERSONA") {
            if !persona.trim().is_empty() {
                honeypot.persona = persona;
            }
        }
        if let Ok(fallback) = std::env::var("DECOY_FALLBACK_REPLY") {
            if !fallback.trim().is_empty() {
                honeypot.fallback_reply = fallback;
            }
        }
        if let Ok(model) = std::env::var("DECOY_LLM_MODEL") {
            if !model.trim().is_empty() {
                honeypot.provider.model = model;
            }
        }
        if let Ok(endpoint) = std::env::var("DECOY_LLM_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                honeypot.provider.endpoint = Some(endpoint);
            }
        }
        if let Some(timeout) = std::env::var("DECOY_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            if timeout > 0 {
                honeypot.provider.timeout_secs = timeout;
            }
        }

        Self {
            bind_host: std::env::var("DECOY_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("DECOY_API_PORT").ok())
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(3000),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            honeypot,
        }
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            gemini_api_key: None,
            honeypot: HoneypotConfig::default(),
        }
    }
}
