//! DECOY LLM - Reply Generation
//!
//! Provider-agnostic trait for the external reply-generation collaborator,
//! plus the orchestrator that joins classifier/extractor output to that
//! boundary. The collaborator is a black box: ordered history + latest
//! message + persona instruction in, reply text or failure out. Failures are
//! soft - the orchestrator recovers locally with a canned fallback reply and
//! never surfaces a hard error to the session layer.

pub mod providers;

use async_trait::async_trait;
use decoy_core::{Conversation, DecoyResult, HoneypotConfig, Sender};
use std::sync::Arc;

pub use providers::gemini::GeminiProvider;

// ============================================================================
// REPLY PROVIDER TRAIT
// ============================================================================

/// One sender-tagged turn of provider context. System turns are filtered out
/// before this type is ever built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTurn {
    pub sender: Sender,
    pub text: String,
}

/// Trait for reply-generation providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// The contract is a single non-cancelable request-response exchange: no
/// streaming, no partial results, no internal retry. A provider-imposed
/// timeout is the only cancellation mechanism.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Generate the honeypot's next reply.
    ///
    /// # Arguments
    /// * `history` - Prior scammer/honeypot turns, in order
    /// * `latest` - The newest counterparty message text
    /// * `persona` - Opaque persona/system instruction string
    ///
    /// # Returns
    /// * `Ok(String)` - The reply text
    /// * `Err(DecoyError::Llm)` - If generation fails
    async fn reply(
        &self,
        history: &[ProviderTurn],
        latest: &str,
        persona: &str,
    ) -> DecoyResult<String>;

    /// Identifier for this provider (used in logs and error messages).
    fn provider_id(&self) -> &str;
}

// ============================================================================
// REPLY ORCHESTRATOR
// ============================================================================

/// Assembles conversation context, delegates to the provider, and falls back
/// to a canned message on any failure. At most one provider call per
/// invocation; no retries.
pub struct ReplyOrchestrator {
    provider: Arc<dyn ReplyProvider>,
    persona: String,
    fallback_reply: String,
}

impl ReplyOrchestrator {
    pub fn new(provider: Arc<dyn ReplyProvider>, config: &HoneypotConfig) -> Self {
        Self {
            provider,
            persona: config.persona.clone(),
            fallback_reply: config.fallback_reply.clone(),
        }
    }

    /// Produce the next honeypot reply for a session turn.
    ///
    /// System-originated turns are excluded from the provider context. On
    /// provider failure or an empty reply the configured fallback text is
    /// returned; the failure is logged, never propagated.
    pub async fn generate_reply(&self, conversation: &Conversation, latest: &str) -> String {
        let history: Vec<ProviderTurn> = conversation
            .without_system()
            .map(|m| ProviderTurn {
                sender: m.sender,
                text: m.text.clone(),
            })
            .collect();

        match self.provider.reply(&history, latest, &self.persona).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                tracing::warn!(
                    provider = self.provider.provider_id(),
                    "Provider returned an empty reply, using fallback"
                );
                self.fallback_reply.clone()
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.provider.provider_id(),
                    error = %err,
                    "Reply generation failed, using fallback"
                );
                self.fallback_reply.clone()
            }
        }
    }
}

impl std::fmt::Debug for ReplyOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyOrchestrator")
            .field("provider", &self.provider.provider_id())
            .finish()
    }
}

// ============================================================================
// UNCONFIGURED PROVIDER
// ============================================================================

/// Placeholder provider used when no real provider is configured (for
/// example, no API key in the environment). Every call fails with
/// `LlmError::ProviderNotConfigured`, which the orchestrator turns into the
/// fallback reply - the service stays up, the persona just gets repetitive.
#[derive(Debug, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl ReplyProvider for UnconfiguredProvider {
    async fn reply(
        &self,
        _history: &[ProviderTurn],
        _latest: &str,
        _persona: &str,
    ) -> DecoyResult<String> {
        Err(decoy_core::LlmError::ProviderNotConfigured.into())
    }

    fn provider_id(&self) -> &str {
        "unconfigured"
    }
}

// ============================================================================
// MOCK PROVIDER FOR TESTING
// ============================================================================

/// Deterministic reply provider for tests. Can be scripted to fail or to
/// return an empty reply; records how it was called.
#[derive(Debug)]
pub struct MockReplyProvider {
    reply: DecoyResult<String>,
    calls: std::sync::Mutex<Vec<Vec<ProviderTurn>>>,
}

impl MockReplyProvider {
    /// A mock that always answers with `reply`.
    pub fn answering(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A mock that always fails with the given error.
    pub fn failing(error: decoy_core::LlmError) -> Self {
        Self {
            reply: Err(error.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Number of times `reply` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// History slices seen by each invocation.
    pub fn recorded_histories(&self) -> Vec<Vec<ProviderTurn>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReplyProvider for MockReplyProvider {
    async fn reply(
        &self,
        history: &[ProviderTurn],
        _latest: &str,
        _persona: &str,
    ) -> DecoyResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(history.to_vec());
        }
        self.reply.clone()
    }

    fn provider_id(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// TESTS
// ============================================================================
