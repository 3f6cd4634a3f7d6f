//! Shared application state for Axum routers.

use dashmap::DashMap;
use decoy_core::SessionState;
use decoy_llm::ReplyOrchestrator;
use decoy_score::ScenarioSet;
use std::sync::Arc;

/// Application-wide state shared across all routes.
///
/// The session registry is in-process only: entries are created on a
/// session's first turn and removed at finalize. There is no cross-restart
/// persistence; a restarted server rebuilds a session from the
/// conversationHistory carried on the next request. Turn processing per
/// session is serialized by the transport contract (one in-flight request
/// per sessionId).
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<DashMap<String, SessionState>>,
    pub orchestrator: Arc<ReplyOrchestrator>,
    pub scenarios: Arc<ScenarioSet>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<ReplyOrchestrator>, scenarios: Arc<ScenarioSet>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            orchestrator,
            scenarios,
            start_time: std::time::Instant::now(),
        }
    }
}
