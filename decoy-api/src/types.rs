//! Request and response envelope types.
//!
//! Wire names are camelCase to stay compatible with the original transport
//! contract. The success envelope duplicates the reply text under both
//! `reply` and `message` for older callers.

use decoy_core::{FinalOutput, Message, ScoreBreakdown, Sender, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// INBOUND
// ============================================================================

/// One turn as carried on the wire. Timestamp is optional inbound; missing
/// values default to arrival time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub sender: Sender,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl WireMessage {
    pub fn into_message(self) -> Message {
        Message {
            sender: self.sender,
            text: self.text,
            timestamp: self.timestamp.unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// Channel metadata accompanying a turn. Open-ended: unknown fields are
/// retained rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Inbound session-turn request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub session_id: String,
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub conversation_history: Vec<WireMessage>,
    #[serde(default)]
    pub metadata: RequestMetadata,
}

/// Inbound finalize request. Everything is optional: a bare POST closes the
/// session without grading.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub agent_notes: Option<String>,
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Success envelope for a session turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub status: String,
    /// The honeypot's reply.
    pub reply: String,
    /// Duplicate of `reply` under the legacy field name.
    pub message: String,
}

impl TurnResponse {
    pub fn success(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            status: "success".to_string(),
            message: reply.clone(),
            reply,
        }
    }
}

/// Finalize envelope: the report, plus a score when a scenario was named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub status: String,
    pub final_output: FinalOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreBreakdown>,
}

/// Scenario listing envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioListResponse {
    pub status: String,
    pub scenarios: Vec<decoy_core::Scenario>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_request_parses_minimal_body() {
        let body = r#"{
            "sessionId": "s-1",
            "message": { "sender": "scammer", "text": "hello" }
        }"#;
        let request: TurnRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.session_id, "s-1");
        assert_eq!(request.conversation_history.len(), 0);
        assert!(request.message.is_some());
    }

    #[test]
    fn test_turn_request_keeps_unknown_metadata() {
        let body = r#"{
            "sessionId": "s-1",
            "message": { "sender": "scammer", "text": "hi" },
            "metadata": { "channel": "sms", "campaign": "july" }
        }"#;
        let request: TurnRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.metadata.channel.as_deref(), Some("sms"));
        assert!(request.metadata.extra.contains_key("campaign"));
    }

    #[test]
    fn test_turn_response_duplicates_reply() {
        let response = TurnResponse::success("hello there");
        assert_eq!(response.status, "success");
        assert_eq!(response.reply, response.message);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"reply\""));
        assert!(json.contains("\"message\""));
    }

    #[test]
    fn test_wire_message_defaults_timestamp() {
        let wire: WireMessage =
            serde_json::from_str(r#"{ "sender": "honeypot", "text": "hi" }"#).unwrap();
        let message = wire.into_message();
        assert_eq!(message.sender, Sender::Honeypot);
        assert!(!message.text.is_empty());
    }
}
