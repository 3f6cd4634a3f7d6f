//! DECOY Core - Entity Types
//!
//! Pure data structures with no behavior beyond construction and merging.
//! All other crates depend on this. This crate contains ONLY data types
//! and the error taxonomy - no classification, extraction, or scoring logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new random session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// CONVERSATION MODEL
// ============================================================================

/// Who produced a message in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The scam sender engaging with the honeypot (the counterparty).
    Scammer,
    /// The persona-driven automated responder.
    Honeypot,
    /// Turns originated by the calling system rather than either party.
    /// Excluded from reply-generation context.
    System,
}

/// A single conversation turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only sequence of messages. Insertion order is turn order;
/// no message is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message. The only mutation this type supports.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Iterate over the scammer/honeypot turns only, skipping system turns.
    /// This is the view handed to the reply generator.
    pub fn without_system(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.sender != Sender::System)
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

// ============================================================================
// EXTRACTED INTELLIGENCE
// ============================================================================

/// The six fixed intelligence categories. Wire names match the original
/// report envelope (camelCase).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum IntelCategory {
    #[serde(rename = "phoneNumbers")]
    PhoneNumbers,
    #[serde(rename = "bankAccounts")]
    BankAccounts,
    #[serde(rename = "upiIds")]
    UpiIds,
    #[serde(rename = "urls")]
    Urls,
    #[serde(rename = "emailAddresses")]
    EmailAddresses,
    #[serde(rename = "caseIds")]
    CaseIds,
}

impl IntelCategory {
    /// All six categories, in canonical report order.
    pub const ALL: [IntelCategory; 6] = [
        IntelCategory::PhoneNumbers,
        IntelCategory::BankAccounts,
        IntelCategory::UpiIds,
        IntelCategory::Urls,
        IntelCategory::EmailAddresses,
        IntelCategory::CaseIds,
    ];

    /// Wire name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntelCategory::PhoneNumbers => "phoneNumbers",
            IntelCategory::BankAccounts => "bankAccounts",
            IntelCategory::UpiIds => "upiIds",
            IntelCategory::Urls => "urls",
            IntelCategory::EmailAddresses => "emailAddresses",
            IntelCategory::CaseIds => "caseIds",
        }
    }
}

impl std::fmt::Display for IntelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated extraction results for one session.
///
/// Every category is always present, bound to a (possibly empty) set of
/// normalized values. Sets grow monotonically: values are only added, and
/// duplicates collapse via set semantics. `BTreeSet` keeps report output
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIntelligence {
    categories: BTreeMap<IntelCategory, BTreeSet<String>>,
}

impl ExtractedIntelligence {
    /// Create an empty result with all six categories present.
    pub fn new() -> Self {
        let mut categories = BTreeMap::new();
        for category in IntelCategory::ALL {
            categories.insert(category, BTreeSet::new());
        }
        Self { categories }
    }

    /// Add a single value to a category. Duplicates are collapsed.
    pub fn insert(&mut self, category: IntelCategory, value: impl Into<String>) {
        self.categories
            .entry(category)
            .or_default()
            .insert(value.into());
    }

    /// Union another result into this one, per category. Values are never
    /// removed.
    pub fn merge(&mut self, other: &ExtractedIntelligence) {
        for (category, values) in &other.categories {
            self.categories
                .entry(*category)
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Values extracted for a category.
    pub fn values(&self, category: IntelCategory) -> &BTreeSet<String> {
        // All six keys exist when built through new(), but a deserialized
        // value may be sparse.
        static EMPTY: std::sync::OnceLock<BTreeSet<String>> = std::sync::OnceLock::new();
        self.categories
            .get(&category)
            .unwrap_or_else(|| EMPTY.get_or_init(BTreeSet::new))
    }

    /// Total number of distinct values across all categories.
    pub fn total_values(&self) -> usize {
        self.categories.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_values() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IntelCategory, &BTreeSet<String>)> {
        self.categories.iter()
    }
}

impl Default for ExtractedIntelligence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// Evolving per-session state. One instance per session, created at first
/// turn, discarded at session end. Callers must serialize turn processing
/// per session; nothing here is shared across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub conversation: Conversation,
    /// One-way latch: transitions false -> true exactly once, never resets.
    pub scam_detected: bool,
    pub intelligence: ExtractedIntelligence,
    pub started_at: Timestamp,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            conversation: Conversation::new(),
            scam_detected: false,
            intelligence: ExtractedIntelligence::new(),
            started_at: Utc::now(),
        }
    }

    /// Fold a classifier verdict into the latch. A `false` verdict never
    /// clears an earlier `true`.
    pub fn record_detection(&mut self, detected: bool) {
        self.scam_detected = self.scam_detected || detected;
    }

    /// Seconds elapsed since the session started.
    pub fn duration_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

// ============================================================================
// SCENARIO FIXTURES
// ============================================================================

/// Ground-truth scenario fixture. Immutable, supplied externally.
///
/// `fake_data` is a sparse mapping: only the categories the scenario plants
/// carry a value, and each carries exactly one expected substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub opening_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Relative sampling weight. Scenarios with higher weight are selected
    /// more often.
    pub weight: f64,
    pub max_turns: u32,
    pub fake_data: BTreeMap<IntelCategory, String>,
}

// ============================================================================
// FINAL OUTPUT
// ============================================================================

/// Engagement metrics captured at session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub total_messages: usize,
    pub duration_seconds: i64,
}

/// Final structured report for a finished session. Built once at session
/// end from accumulated state; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalOutput {
    pub session_id: String,
    pub scam_detected: bool,
    pub total_messages_exchanged: usize,
    /// Category sets flattened to arrays (sorted; sets have no inherent
    /// order on the wire).
    pub extracted_intelligence: BTreeMap<IntelCategory, Vec<String>>,
    pub engagement_metrics: EngagementMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_notes: Option<String>,
}

/// Weighted score for one graded transcript. Derived, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// 0 or 20. Binary, not partial.
    pub scam_detection: f64,
    /// 0-40, capped.
    pub intelligence_extraction: f64,
    /// 0-20.
    pub engagement_quality: f64,
    /// 0-20, capped.
    pub response_structure: f64,
    /// Unweighted sum of the four dimensions; max 100.
    pub total: f64,
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Reply-generation provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No reply provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Empty reply from {provider}")]
    EmptyReply { provider: String },

    #[error("Request to {provider} timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Scenario fixture errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("Unknown scenario: {id}")]
    UnknownScenario { id: String },

    #[error("Scenario set is empty")]
    EmptySet,
}

/// Master error type for all DECOY errors.
#[derive(Debug, Clone, Error)]
pub enum DecoyError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

/// Result type alias for DECOY operations.
pub type DecoyResult<T> = Result<T, DecoyError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Reply provider settings. The model choice and token limits are
/// deployment configuration, not part of the engine contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

/// Honeypot engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneypotConfig {
    /// Persona/system instruction handed to the reply provider. Opaque to
    /// the engine.
    pub persona: String,
    /// Canned reply used when the provider fails.
    pub fallback_reply: String,
    pub provider: ProviderConfig,
}

impl HoneypotConfig {
    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(DecoyError::Config) if invalid.
    pub fn validate(&self) -> DecoyResult<()> {
        if self.persona.trim().is_empty() {
            return Err(DecoyError::Config(ConfigError::MissingRequired {
                field: "persona".to_string(),
            }));
        }

        if self.fallback_reply.trim().is_empty() {
            return Err(DecoyError::Config(ConfigError::MissingRequired {
                field: "fallback_reply".to_string(),
            }));
        }

        if self.provider.model.trim().is_empty() {
            return Err(DecoyError::Config(ConfigError::MissingRequired {
                field: "provider.model".to_string(),
            }));
        }

        if self.provider.timeout_secs == 0 {
            return Err(DecoyError::Config(ConfigError::InvalidValue {
                field: "provider.timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            }));
        }

        Ok(())
    }
}

impl Default for HoneypotConfig {
    fn default() -> Self {
        Self {
            persona: "You are Ramesh, a polite, slightly confused retiree who \
                      asks clarifying questions and never shares real details."
                .to_string(),
            fallback_reply: "Sorry, I did not catch that. Could you please send \
                             that information again?"
                .to_string(),
            provider: ProviderConfig {
                model: "gemini-2.0-flash".to_string(),
                endpoint: None,
                timeout_secs: 20,
            },
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
