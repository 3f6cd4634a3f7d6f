//! Scenario Routes
//!
//! Read-only views over the built-in scenario fixtures: a full listing for
//! operators wiring up a campaign, and a weighted sample for callers that
//! want the engine to pick the next persona run.

use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::ScenarioListResponse;

/// GET /api/v1/scenarios - list every scenario fixture.
pub async fn list_scenarios(State(state): State<AppState>) -> Json<ScenarioListResponse> {
    Json(ScenarioListResponse {
        status: "success".to_string(),
        scenarios: state.scenarios.scenarios().to_vec(),
    })
}

/// GET /api/v1/scenarios/sample - weighted-sample one scenario.
pub async fn sample_scenario(
    State(state): State<AppState>,
) -> ApiResult<Json<decoy_core::Scenario>> {
    let mut rng = rand::rng();
    let scenario = state
        .scenarios
        .sample(&mut rng)
        .map_err(|err| ApiError::internal_error(err.to_string()))?;
    Ok(Json(scenario.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use decoy_core::HoneypotConfig;
    use decoy_llm::{MockReplyProvider, ReplyOrchestrator};
    use decoy_score::ScenarioSet;
    use std::sync::Arc;

    fn test_state(scenarios: ScenarioSet) -> AppState {
        let orchestrator = Arc::new(ReplyOrchestrator::new(
            Arc::new(MockReplyProvider::answering("ok")),
            &HoneypotConfig::default(),
        ));
        AppState::new(orchestrator, Arc::new(scenarios))
    }

    #[tokio::test]
    async fn test_list_returns_all_builtin_scenarios() {
        let state = test_state(ScenarioSet::builtin());
        let response = list_scenarios(State(state)).await;
        assert_eq!(response.0.status, "success");
        assert_eq!(response.0.scenarios.len(), 3);
        assert!(response
            .0
            .scenarios
            .iter()
            .any(|scenario| scenario.id == "bank-kyc-fraud"));
    }

    #[tokio::test]
    async fn test_sample_returns_a_known_scenario() {
        let state = test_state(ScenarioSet::builtin());
        let response = sample_scenario(State(state.clone())).await.unwrap();
        assert!(state.scenarios.get(&response.0.id).is_ok());
    }

    #[tokio::test]
    async fn test_sample_from_empty_set_is_internal_error() {
        let state = test_state(ScenarioSet::new(Vec::new()));
        let result = sample_scenario(State(state)).await;
        assert!(matches!(
            result,
            Err(err) if err.code == crate::error::ErrorCode::InternalError
        ));
    }
}
