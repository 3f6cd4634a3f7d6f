//! Gemini HTTP reply provider

use crate::{ProviderTurn, ReplyProvider};
use async_trait::async_trait;
use decoy_core::{DecoyError, DecoyResult, LlmError, ProviderConfig, Sender};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Reply provider backed by the Gemini `generateContent` endpoint.
///
/// One request per invocation with a client-level timeout; no retries and no
/// streaming. All failures map onto `LlmError`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `config` - Model, optional endpoint override, and request timeout
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> DecoyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DecoyError::Llm(LlmError::InvalidResponse {
                    provider: "gemini".to_string(),
                    reason: format!("Failed to build HTTP client: {}", e),
                })
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn build_request(
        &self,
        history: &[ProviderTurn],
        latest: &str,
        persona: &str,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(role_for(turn.sender).to_string()),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: latest.to_string(),
            }],
        });

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: persona.to_string(),
                }],
            },
            contents,
        }
    }
}

/// Gemini's role vocabulary: the counterparty speaks as `user`, the honeypot
/// as `model`. System turns never reach this function.
fn role_for(sender: Sender) -> &'static str {
    match sender {
        Sender::Honeypot => "model",
        _ => "user",
    }
}

#[async_trait]
impl ReplyProvider for GeminiProvider {
    async fn reply(
        &self,
        history: &[ProviderTurn],
        latest: &str,
        persona: &str,
    ) -> DecoyResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.build_request(history, latest, persona))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DecoyError::Llm(LlmError::Timeout {
                        provider: "gemini".to_string(),
                        timeout_secs: self.timeout_secs,
                    })
                } else {
                    DecoyError::Llm(LlmError::RequestFailed {
                        provider: "gemini".to_string(),
                        status: 0,
                        message: format!("HTTP request failed: {}", e),
                    })
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = match serde_json::from_str::<ApiErrorBody>(&error_text) {
                Ok(body) => body.error.message,
                Err(_) => error_text,
            };

            return Err(DecoyError::Llm(LlmError::RequestFailed {
                provider: "gemini".to_string(),
                status: status.as_u16() as i32,
                message,
            }));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            DecoyError::Llm(LlmError::InvalidResponse {
                provider: "gemini".to_string(),
                reason: format!("Failed to parse response: {}", e),
            })
        })?;

        let reply = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(DecoyError::Llm(LlmError::EmptyReply {
                provider: "gemini".to_string(),
            }));
        }

        Ok(reply)
    }

    fn provider_id(&self) -> &str {
        "gemini"
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping() {
        assert_eq!(role_for(Sender::Scammer), "user");
        assert_eq!(role_for(Sender::Honeypot), "model");
    }

    #[test]
    fn test_request_appends_latest_as_user_turn() {
        let config = ProviderConfig {
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            timeout_secs: 5,
        };
        let provider = GeminiProvider::new("key", &config).unwrap();

        let history = vec![
            ProviderTurn {
                sender: Sender::Scammer,
                text: "pay the fee".to_string(),
            },
            ProviderTurn {
                sender: Sender::Honeypot,
                text: "which fee?".to_string(),
            },
        ];
        let request = provider.build_request(&history, "the processing fee", "persona");

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
        assert_eq!(request.contents[2].role.as_deref(), Some("user"));
        assert_eq!(request.contents[2].parts[0].text, "the processing fee");
        assert_eq!(request.system_instruction.parts[0].text, "persona");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            timeout_secs: 5,
        };
        let provider = GeminiProvider::new("super-secret", &config).unwrap();
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
