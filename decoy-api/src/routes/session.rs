//! Session Finalization Route
//!
//! Runs the summarizer exactly once over the accumulated session state and,
//! when a scenario is named, grades the report against its planted values.
//! The session entry is removed from the registry on success.

use axum::{
    extract::{Path, State},
    Json,
};
use decoy_score::{build_final_output, evaluate_final_output};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{FinalizeRequest, FinalizeResponse};

/// POST /api/v1/session/{id}/final - finalize and optionally grade.
pub async fn finalize_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<FinalizeRequest>>,
) -> ApiResult<Json<FinalizeResponse>> {
    let request = body.map(|Json(inner)| inner).unwrap_or_default();

    // Resolve the scenario before consuming the session, so an unknown
    // scenario id does not destroy the transcript.
    let scenario = match &request.scenario_id {
        Some(id) => Some(
            state
                .scenarios
                .get(id)
                .map_err(|_| ApiError::scenario_not_found(id))?,
        ),
        None => None,
    };

    let (_, session) = state
        .sessions
        .remove(&session_id)
        .ok_or_else(|| ApiError::session_not_found(&session_id))?;

    let final_output = build_final_output(
        &session.session_id,
        &session.conversation,
        session.scam_detected,
        &session.intelligence,
        session.duration_seconds(),
        request.agent_notes,
    );

    let score = scenario.map(|scenario| evaluate_final_output(&final_output, scenario));

    tracing::info!(
        session_id = %session_id,
        scam_detected = final_output.scam_detected,
        total_messages = final_output.total_messages_exchanged,
        "Session finalized"
    );

    Ok(Json(FinalizeResponse {
        status: "success".to_string(),
        final_output,
        score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::message::post_message;
    use crate::types::{TurnRequest, WireMessage};
    use decoy_core::{HoneypotConfig, Sender};
    use decoy_llm::{MockReplyProvider, ReplyOrchestrator};
    use decoy_score::ScenarioSet;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let orchestrator = Arc::new(ReplyOrchestrator::new(
            Arc::new(MockReplyProvider::answering("tell me more")),
            &HoneypotConfig::default(),
        ));
        AppState::new(orchestrator, Arc::new(ScenarioSet::builtin()))
    }

    fn turn(session_id: &str, text: &str) -> TurnRequest {
        TurnRequest {
            session_id: session_id.to_string(),
            message: Some(WireMessage {
                sender: Sender::Scammer,
                text: text.to_string(),
                timestamp: None,
            }),
            conversation_history: Vec::new(),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_finalize_unknown_session_is_404() {
        let state = test_state();
        let result = finalize_session(
            State(state),
            Path("missing".to_string()),
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(err) if err.code == crate::error::ErrorCode::SessionNotFound
        ));
    }

    #[tokio::test]
    async fn test_finalize_builds_report_and_removes_session() {
        let state = test_state();
        post_message(
            State(state.clone()),
            Json(turn("s-1", "URGENT: verify, call 9876543210")),
        )
        .await
        .unwrap();

        let response = finalize_session(
            State(state.clone()),
            Path("s-1".to_string()),
            Some(Json(FinalizeRequest {
                scenario_id: None,
                agent_notes: Some("kept asking about the fee".to_string()),
            })),
        )
        .await
        .unwrap();

        let output = &response.0.final_output;
        assert!(output.scam_detected);
        assert_eq!(output.total_messages_exchanged, 2);
        assert_eq!(
            output.agent_notes.as_deref(),
            Some("kept asking about the fee")
        );
        assert!(response.0.score.is_none());

        // The registry entry is gone; finalizing twice fails.
        assert!(!state.sessions.contains_key("s-1"));
    }

    #[tokio::test]
    async fn test_finalize_with_scenario_scores_report() {
        let state = test_state();
        // The bank-kyc-fraud scenario plants phone 9876543210.
        post_message(
            State(state.clone()),
            Json(turn("s-2", "urgent! verify kyc, call 9876543210 now")),
        )
        .await
        .unwrap();

        let response = finalize_session(
            State(state.clone()),
            Path("s-2".to_string()),
            Some(Json(FinalizeRequest {
                scenario_id: Some("bank-kyc-fraud".to_string()),
                agent_notes: None,
            })),
        )
        .await
        .unwrap();

        let score = response.0.score.expect("scenario named, score expected");
        assert_eq!(score.scam_detection, 20.0);
        assert!(score.intelligence_extraction >= 10.0);
        assert!(score.total <= 100.0);
    }

    #[tokio::test]
    async fn test_unknown_scenario_preserves_session() {
        let state = test_state();
        post_message(State(state.clone()), Json(turn("s-3", "hello")))
            .await
            .unwrap();

        let result = finalize_session(
            State(state.clone()),
            Path("s-3".to_string()),
            Some(Json(FinalizeRequest {
                scenario_id: Some("no-such".to_string()),
                agent_notes: None,
            })),
        )
        .await;

        assert!(matches!(
            result,
            Err(err) if err.code == crate::error::ErrorCode::ScenarioNotFound
        ));
        // The transcript survives the bad grading request.
        assert!(state.sessions.contains_key("s-3"));
    }
}
