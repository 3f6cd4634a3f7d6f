//! DECOY Intel - Classification and Extraction
//!
//! The deterministic text-analysis layer: a lexical scam classifier and a
//! fixed battery of regex entity matchers. Both are pure functions with no
//! hidden state; callers persist the detection latch and merge extraction
//! results into session state themselves.

use decoy_core::{ExtractedIntelligence, IntelCategory};
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// KEYWORD CLASSIFIER
// ============================================================================

/// Scam-indicator phrases. Matched by case-insensitive substring containment,
/// so multi-word phrases must appear verbatim (lowercased).
const SCAM_KEYWORDS: &[&str] = &[
    // Urgency
    "urgent",
    "immediately",
    "act now",
    "right now",
    "last chance",
    "limited time",
    "within 24 hours",
    // Verification / credential lures
    "verify",
    "verification",
    "kyc",
    "otp",
    "one time password",
    "pan card",
    "aadhaar",
    "update your details",
    // Account threats
    "account blocked",
    "account suspended",
    "will be blocked",
    "will be suspended",
    "deactivated",
    // Financial lures
    "lottery",
    "prize",
    "winner",
    "congratulations",
    "cashback",
    "refund",
    "reward",
    "claim your",
    "processing fee",
    "transfer the amount",
    // Call to action
    "click here",
    "click the link",
    "call this number",
    "send payment",
    "share your",
];

/// Decide whether a message marks the session as scam-related.
///
/// `current` is the session's existing latch value: once true, the result is
/// true unconditionally - scam status never un-detects within a session.
/// Otherwise the text is lowercased and checked for any indicator phrase.
/// No partial scoring; this is a boolean OR over keyword membership.
pub fn detect_scam(text: &str, current: bool) -> bool {
    if current {
        return true;
    }

    let lowered = text.to_lowercase();
    SCAM_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

// ============================================================================
// ENTITY EXTRACTOR
// ============================================================================

/// Optional 1-3 digit country code, then a 10-digit number with common
/// separators and an optionally parenthesized area code.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
        .expect("phone pattern is valid")
});

/// A 9-18 digit run, or a bank-branch-code-style token
/// (4 letters + 7 digits + 1 letter + 6 digits).
static BANK_ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[A-Z]{4}\d{7}[A-Z]\d{6}|\d{9,18})\b")
        .expect("bank account pattern is valid")
});

/// Deliberately looser than a true email pattern, to catch payment handles
/// like `name@upi` or `9876543210@ybl`.
static UPI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._-]+@[A-Za-z0-9._-]+\b").expect("upi pattern is valid")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https?://(?:www\.)?[-A-Za-z0-9@:%._+~#=]{1,256}\.[A-Za-z0-9]{1,6}\b[-A-Za-z0-9()@:%_+.~#?&/=]*",
    )
    .expect("url pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

/// A reference label (`ID`, `Ref`, `Code`, `No`) followed by `:` or `#` and
/// an alphanumeric token of 4-15 characters. Only the token is captured.
static CASE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:ID|Ref|Code|No)\s*[:#]\s*([A-Za-z0-9]{4,15})\b")
        .expect("case id pattern is valid")
});

/// Strip separators, parentheses, and the leading `+` from a phone match,
/// keeping digits only.
fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Run all six pattern scans over `text` and return deduplicated candidate
/// sets per category.
///
/// Every category is evaluated even when earlier ones found nothing, every
/// matcher finds all non-overlapping occurrences, and the result always
/// carries all six keys. A single token may legitimately land in more than
/// one category; over-capture is intentional - recall matters more than
/// precision here.
pub fn extract_intelligence(text: &str) -> ExtractedIntelligence {
    let mut intel = ExtractedIntelligence::new();

    for m in PHONE_RE.find_iter(text) {
        intel.insert(IntelCategory::PhoneNumbers, normalize_phone(m.as_str()));
    }

    for m in BANK_ACCOUNT_RE.find_iter(text) {
        intel.insert(IntelCategory::BankAccounts, m.as_str());
    }

    for m in UPI_RE.find_iter(text) {
        intel.insert(IntelCategory::UpiIds, m.as_str());
    }

    for m in URL_RE.find_iter(text) {
        intel.insert(IntelCategory::Urls, m.as_str());
    }

    for m in EMAIL_RE.find_iter(text) {
        intel.insert(IntelCategory::EmailAddresses, m.as_str());
    }

    for captures in CASE_ID_RE.captures_iter(text) {
        if let Some(token) = captures.get(1) {
            intel.insert(IntelCategory::CaseIds, token.as_str());
        }
    }

    intel
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Idempotence: extracting twice from the same text yields identical
        /// sets - there is no hidden state.
        #[test]
        fn prop_extraction_is_idempotent(text in ".{0,200}") {
            let first = extract_intelligence(&text);
            let second = extract_intelligence(&text);
            prop_assert_eq!(first, second);
        }

        /// Union law: accumulating per-message results is order-independent.
        #[test]
        fn prop_accumulation_is_order_independent(m1 in ".{0,120}", m2 in ".{0,120}") {
            let mut forward = extract_intelligence(&m1);
            forward.merge(&extract_intelligence(&m2));

            let mut backward = extract_intelligence(&m2);
            backward.merge(&extract_intelligence(&m1));

            prop_assert_eq!(forward, backward);
        }

        /// The classifier honors the latch for any input.
        #[test]
        fn prop_classifier_latch_is_monotonic(text in ".{0,200}") {
            prop_assert!(detect_scam(&text, true));
        }

        /// A detected message stays detected when the latch is carried
        /// forward, regardless of what follows.
        #[test]
        fn prop_detection_survives_later_messages(later in ".{0,200}") {
            let flag = detect_scam("urgent: verify your account", false);
            prop_assert!(flag);
            prop_assert!(detect_scam(&later, flag));
        }

        /// Phone normalization strips everything but digits.
        #[test]
        fn prop_phone_values_are_digits_only(text in ".{0,200}") {
            let intel = extract_intelligence(&text);
            for value in intel.values(IntelCategory::PhoneNumbers) {
                prop_assert!(value.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }
}
