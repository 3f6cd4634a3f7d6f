//! Session Turn Route
//!
//! The join point of the engine: each inbound message updates the session's
//! detection latch and cumulative intelligence, then the orchestrator
//! produces the honeypot's next reply. Classification and extraction happen
//! under the registry lock; the single provider call does not.

use axum::{extract::State, Json};
use decoy_core::{Message, Sender, SessionState};
use decoy_intel::{detect_scam, extract_intelligence};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{TurnRequest, TurnResponse};

/// POST /api/v1/message - process one session turn.
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> ApiResult<Json<TurnResponse>> {
    let TurnRequest {
        session_id,
        message,
        conversation_history,
        metadata,
    } = request;

    // Validate required fields before touching any state.
    if session_id.trim().is_empty() {
        return Err(ApiError::missing_field("sessionId"));
    }
    let incoming = message.ok_or_else(|| ApiError::missing_field("message"))?;
    if incoming.text.trim().is_empty() {
        return Err(ApiError::missing_field("message.text"));
    }

    tracing::info!(
        session_id = %session_id,
        channel = metadata.channel.as_deref().unwrap_or("unknown"),
        "Processing session turn"
    );

    let latest_text = incoming.text.clone();

    // Update session state and snapshot the conversation for the provider
    // context. The snapshot is taken so the registry entry is not held
    // across the provider call.
    let context = {
        let mut entry = state
            .sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionState::new(&session_id));
        let session = entry.value_mut();

        // A fresh entry with supplied history means the server restarted
        // mid-session: rebuild latch and intelligence from the history.
        if session.conversation.is_empty() && !conversation_history.is_empty() {
            for wire in conversation_history {
                let replayed = wire.into_message();
                if replayed.sender == Sender::Scammer {
                    let detected = detect_scam(&replayed.text, session.scam_detected);
                    session.record_detection(detected);
                    session
                        .intelligence
                        .merge(&extract_intelligence(&replayed.text));
                }
                session.conversation.push(replayed);
            }
        }

        let detected = detect_scam(&latest_text, session.scam_detected);
        session.record_detection(detected);
        session
            .intelligence
            .merge(&extract_intelligence(&latest_text));

        session.conversation.clone()
    };

    // Exactly one provider call; failures already degrade to the fallback
    // reply inside the orchestrator.
    let reply = state.orchestrator.generate_reply(&context, &latest_text).await;

    // Append both turns to the transcript.
    if let Some(mut entry) = state.sessions.get_mut(&session_id) {
        entry.conversation.push(incoming.into_message());
        entry
            .conversation
            .push(Message::new(Sender::Honeypot, reply.clone()));
    }

    Ok(Json(TurnResponse::success(reply)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WireMessage;
    use decoy_core::HoneypotConfig;
    use decoy_llm::{MockReplyProvider, ReplyOrchestrator};
    use decoy_score::ScenarioSet;
    use std::sync::Arc;

    fn test_state(provider: Arc<MockReplyProvider>) -> AppState {
        let orchestrator = Arc::new(ReplyOrchestrator::new(
            provider,
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
    async fn test_turn_returns_reply_under_both_names() {
        let state = test_state(Arc::new(MockReplyProvider::answering("which account?")));
        let response = post_message(State(state), Json(turn("s-1", "urgent: verify now")))
            .await
            .unwrap();
        assert_eq!(response.0.status, "success");
        assert_eq!(response.0.reply, "which account?");
        assert_eq!(response.0.message, "which account?");
    }

    #[tokio::test]
    async fn test_missing_session_id_is_rejected() {
        let state = test_state(Arc::new(MockReplyProvider::answering("ok")));
        let result = post_message(State(state), Json(turn("", "hello"))).await;
        assert!(matches!(
            result,
            Err(err) if err.code == crate::error::ErrorCode::MissingField
        ));
    }

    #[tokio::test]
    async fn test_empty_message_text_is_rejected() {
        let state = test_state(Arc::new(MockReplyProvider::answering("ok")));
        let result = post_message(State(state), Json(turn("s-1", "   "))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_turn_accumulates_state_across_messages() {
        let state = test_state(Arc::new(MockReplyProvider::answering("go on")));

        post_message(
            State(state.clone()),
            Json(turn("s-1", "URGENT: verify your account")),
        )
        .await
        .unwrap();
        post_message(
            State(state.clone()),
            Json(turn("s-1", "call 9876543210 or pay rahul@upi")),
        )
        .await
        .unwrap();

        let session = state.sessions.get("s-1").unwrap();
        assert!(session.scam_detected);
        assert!(session
            .intelligence
            .values(decoy_core::IntelCategory::PhoneNumbers)
            .contains("9876543210"));
        assert!(session
            .intelligence
            .values(decoy_core::IntelCategory::UpiIds)
            .contains("rahul@upi"));
        // Two scammer turns plus two honeypot replies.
        assert_eq!(session.conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_history_reseeds_fresh_session() {
        let state = test_state(Arc::new(MockReplyProvider::answering("ok")));

        let mut request = turn("s-2", "anything else?");
        request.conversation_history = vec![
            WireMessage {
                sender: Sender::Scammer,
                text: "you won a lottery prize, Ref: WIN4587".to_string(),
                timestamp: None,
            },
            WireMessage {
                sender: Sender::Honeypot,
                text: "a prize? how exciting".to_string(),
                timestamp: None,
            },
        ];

        post_message(State(state.clone()), Json(request)).await.unwrap();

        let session = state.sessions.get("s-2").unwrap();
        // Latch and intelligence were rebuilt from the replayed history.
        assert!(session.scam_detected);
        assert!(session
            .intelligence
            .values(decoy_core::IntelCategory::CaseIds)
            .contains("WIN4587"));
        // Replayed history + latest turn + reply.
        assert_eq!(session.conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_provider_failure_still_succeeds_with_fallback() {
        let state = test_state(Arc::new(MockReplyProvider::failing(
            decoy_core::LlmError::ProviderNotConfigured,
        )));
        let response = post_message(State(state), Json(turn("s-3", "hello")))
            .await
            .unwrap();
        assert_eq!(response.0.status, "success");
        assert_eq!(response.0.reply, HoneypotConfig::default().fallback_reply);
    }
}
