//! DECOY Score - Summarization and Grading
//!
//! Folds a finished conversation plus accumulated extraction state into a
//! final structured report, and grades that report against a scenario's
//! planted values. Both operations are pure and synchronous.

pub mod scenario;

use decoy_core::{
    Conversation, EngagementMetrics, ExtractedIntelligence, FinalOutput, Scenario,
    ScoreBreakdown,
};
use std::collections::BTreeMap;

pub use scenario::ScenarioSet;

// ============================================================================
// SCORING CONSTANTS
// ============================================================================

/// Full credit for a latched scam detection. Binary, no partial credit.
const SCAM_DETECTION_POINTS: f64 = 20.0;

/// Credit per planted value recovered, and the dimension cap.
const POINTS_PER_PLANTED_MATCH: f64 = 10.0;
const INTEL_EXTRACTION_CAP: f64 = 40.0;

/// Credit per engagement check; four independent additive checks.
const ENGAGEMENT_POINTS_PER_CHECK: f64 = 5.0;
const ENGAGEMENT_LONG_DURATION_SECS: i64 = 60;
const ENGAGEMENT_MESSAGE_THRESHOLD: usize = 5;

/// Required output fields, their per-field credit, the optional agent-notes
/// bonus, and the dimension cap.
const REQUIRED_OUTPUT_FIELDS: [&str; 5] = [
    "sessionId",
    "scamDetected",
    "extractedIntelligence",
    "engagementMetrics",
    "totalMessagesExchanged",
];
const POINTS_PER_REQUIRED_FIELD: f64 = 5.0;
const AGENT_NOTES_BONUS: f64 = 2.5;
const RESPONSE_STRUCTURE_CAP: f64 = 20.0;

// ============================================================================
// TRANSCRIPT SUMMARIZER
// ============================================================================

/// Build the final structured report for a finished session.
///
/// Pure aggregation: category sets become sorted arrays, scalar fields copy
/// through unchanged, and the message total is recomputed from the
/// conversation length rather than tracked incrementally. Called exactly
/// once, at session end.
pub fn build_final_output(
    session_id: impl Into<String>,
    conversation: &Conversation,
    scam_detected: bool,
    intelligence: &ExtractedIntelligence,
    duration_seconds: i64,
    agent_notes: Option<String>,
) -> FinalOutput {
    let extracted_intelligence: BTreeMap<_, Vec<String>> = intelligence
        .iter()
        .map(|(category, values)| (*category, values.iter().cloned().collect()))
        .collect();

    let total_messages = conversation.len();

    FinalOutput {
        session_id: session_id.into(),
        scam_detected,
        total_messages_exchanged: total_messages,
        extracted_intelligence,
        engagement_metrics: EngagementMetrics {
            total_messages,
            duration_seconds,
        },
        agent_notes,
    }
}

// ============================================================================
// SCORER
// ============================================================================

/// Grade a final report against a scenario's planted values.
///
/// Each dimension is computed independently, individually capped, then
/// summed. The response-structure formula deliberately preserves the
/// original scoring behavior: the five required fields alone reach 25 raw
/// points before the 20-point clamp, so the agent-notes bonus only matters
/// for structurally incomplete output.
pub fn evaluate_final_output(output: &FinalOutput, scenario: &Scenario) -> ScoreBreakdown {
    let scam_detection = if output.scam_detected {
        SCAM_DETECTION_POINTS
    } else {
        0.0
    };

    // Intelligence extraction: substring match against each planted value,
    // in the planted value's own category. Categories the scenario does not
    // plant are skipped - no penalty, no credit.
    let mut raw_extraction = 0.0;
    for (category, planted) in &scenario.fake_data {
        if planted.is_empty() {
            continue;
        }
        let matched = output
            .extracted_intelligence
            .get(category)
            .is_some_and(|values| values.iter().any(|value| value.contains(planted)));
        if matched {
            raw_extraction += POINTS_PER_PLANTED_MATCH;
        }
    }
    let intelligence_extraction = raw_extraction.min(INTEL_EXTRACTION_CAP);

    // Engagement quality: four independent additive checks, not tiers.
    let metrics = &output.engagement_metrics;
    let mut engagement_quality = 0.0;
    if metrics.duration_seconds > 0 {
        engagement_quality += ENGAGEMENT_POINTS_PER_CHECK;
    }
    if metrics.duration_seconds > ENGAGEMENT_LONG_DURATION_SECS {
        engagement_quality += ENGAGEMENT_POINTS_PER_CHECK;
    }
    if metrics.total_messages > 0 {
        engagement_quality += ENGAGEMENT_POINTS_PER_CHECK;
    }
    if metrics.total_messages >= ENGAGEMENT_MESSAGE_THRESHOLD {
        engagement_quality += ENGAGEMENT_POINTS_PER_CHECK;
    }

    let response_structure = score_response_structure(output);

    let total =
        scam_detection + intelligence_extraction + engagement_quality + response_structure;

    ScoreBreakdown {
        scam_detection,
        intelligence_extraction,
        engagement_quality,
        response_structure,
        total,
    }
}

/// Field-presence check over the serialized report, matching how the
/// original graded arbitrary JSON output.
fn score_response_structure(output: &FinalOutput) -> f64 {
    let serialized = match serde_json::to_value(output) {
        Ok(value) => value,
        // FinalOutput always serializes; treat a failure as structurally
        // empty output.
        Err(_) => return 0.0,
    };

    let mut raw = 0.0;
    if let Some(object) = serialized.as_object() {
        for field in REQUIRED_OUTPUT_FIELDS {
            if object.contains_key(field) {
                raw += POINTS_PER_REQUIRED_FIELD;
            }
        }
    }

    let has_notes = output
        .agent_notes
        .as_deref()
        .is_some_and(|notes| !notes.trim().is_empty());
    if has_notes {
        raw += AGENT_NOTES_BONUS;
    }

    raw.min(RESPONSE_STRUCTURE_CAP)
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
    use decoy_core::IntelCategory;
    use proptest::prelude::*;

    fn arb_output() -> impl Strategy<Value = FinalOutput> {
        (
            any::<bool>(),
            0usize..200,
            -10i64..100_000,
            prop::collection::vec(
                (
                    prop::sample::select(IntelCategory::ALL.to_vec()),
                    "[a-z0-9@./:]{1,24}",
                ),
                0..30,
            ),
            prop::option::of(".{0,40}"),
        )
            .prop_map(|(detected, messages, duration, values, notes)| {
                let mut intelligence = ExtractedIntelligence::new();
                for (category, value) in values {
                    intelligence.insert(category, value);
                }
                let mut conversation = Conversation::new();
                for _ in 0..messages {
                    conversation.push(decoy_core::Message::new(
                        decoy_core::Sender::Scammer,
                        "msg",
                    ));
                }
                build_final_output("prop", &conversation, detected, &intelligence, duration, notes)
            })
    }

    fn arb_scenario() -> impl Strategy<Value = Scenario> {
        prop::collection::btree_map(
            prop::sample::select(IntelCategory::ALL.to_vec()),
            "[a-z0-9@./:]{0,24}",
            0..6,
        )
        .prop_map(|fake_data| Scenario {
            id: "prop".to_string(),
            name: "Prop".to_string(),
            description: String::new(),
            category: "prop".to_string(),
            opening_message: String::new(),
            metadata: None,
            weight: 1.0,
            max_turns: 10,
            fake_data,
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Cap law: every dimension stays inside its stated range and the
        /// total inside [0, 100] for any output/scenario pair.
        #[test]
        fn prop_score_caps_hold(output in arb_output(), scenario in arb_scenario()) {
            let score = evaluate_final_output(&output, &scenario);

            prop_assert!(score.scam_detection == 0.0 || score.scam_detection == 20.0);
            prop_assert!((0.0..=40.0).contains(&score.intelligence_extraction));
            prop_assert!((0.0..=20.0).contains(&score.engagement_quality));
            prop_assert!((0.0..=20.0).contains(&score.response_structure));
            prop_assert!((0.0..=100.0).contains(&score.total));
            prop_assert_eq!(
                score.total,
                score.scam_detection
                    + score.intelligence_extraction
                    + score.engagement_quality
                    + score.response_structure
            );
        }

        /// Scoring is deterministic.
        #[test]
        fn prop_scoring_is_deterministic(output in arb_output(), scenario in arb_scenario()) {
            let a = evaluate_final_output(&output, &scenario);
            let b = evaluate_final_output(&output, &scenario);
            prop_assert_eq!(a, b);
        }
    }
}
