// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flag decision aggregation.
//!
//! Merges the three independent flagging sources -- direct classification,
//! confidence-threshold breach, and context-analysis signals -- with OR
//! semantics into one final verdict, and builds the moderator-facing
//! summary.
//!
//! Ordering contract: the confidence-threshold comparison uses the
//! pre-penalty score. The cumulative-risk penalty (-15 when risk > 0.6)
//! applies only to the stored/displayed score, after the decision has
//! already been made. Deliberate; do not "fix".

use modera_core::{category_label, SafetyCategory, SafetyLevel};
use modera_filter::{Classification, ContextAnalysis};

/// Cumulative-risk level above which the display score is penalized.
const RISK_PENALTY_THRESHOLD: f64 = 0.6;

/// Points subtracted from the display score under high cumulative risk.
const RISK_PENALTY: f64 = 15.0;

/// Result of merging all flagging sources.
#[derive(Debug, Clone)]
pub struct FlagOutcome {
    /// Final verdict: flagged iff any source fired (crisis forces true).
    pub flagged: bool,
    pub classifier_flagged: bool,
    pub confidence_flagged: bool,
    pub context_flagged: bool,
    /// Score after the cumulative-risk penalty; what gets stored/displayed.
    pub adjusted_score: f64,
    /// Moderator-facing summary of every triggered reason.
    pub moderator_summary: String,
}

/// Fold context signals back into the classification before generation.
///
/// Escalation defaults an uncategorized message to `medical` and raises
/// the safety-filter confidence floor; bypass and persistence raise it
/// less aggressively. Returns the adjusted classification and whether the
/// classifier source now counts as flagged.
pub fn apply_context_signals(
    classification: Classification,
    context: &ContextAnalysis,
) -> (Classification, bool) {
    let mut class = classification;
    let mut flagged = class.category.is_some();

    if context.risk_escalation {
        flagged = true;
        if class.category.is_none() {
            class.category = Some(SafetyCategory::Medical);
        }
        class.confidence = class.confidence.max(0.7);
    }
    if context.filter_bypass_attempt {
        flagged = true;
        class.confidence = class.confidence.max(0.6);
    }
    if context.persistent_sensitive_topic {
        flagged = true;
        class.confidence = class.confidence.max(0.65);
    }

    (class, flagged)
}

/// Merge the flagging sources into the final verdict.
pub fn decide_flag(
    classifier_flagged: bool,
    category: Option<SafetyCategory>,
    confidence_score: f64,
    safety_level: SafetyLevel,
    context: &ContextAnalysis,
    message: &str,
) -> FlagOutcome {
    let threshold = safety_level.flag_threshold();
    let mut confidence_flagged = confidence_score < threshold;

    // Crisis content is always flagged regardless of threshold math.
    if category == Some(SafetyCategory::Crisis) {
        confidence_flagged = true;
    }

    let context_flagged = context.any_flag();

    // Penalty applies after the threshold comparison above.
    let adjusted_score = if context_flagged && context.cumulative_risk_score > RISK_PENALTY_THRESHOLD
    {
        (confidence_score - RISK_PENALTY).max(0.0)
    } else {
        confidence_score
    };

    let mut flagged = classifier_flagged || confidence_flagged || context_flagged;
    if category == Some(SafetyCategory::Crisis) {
        flagged = true;
    }

    let moderator_summary = build_summary(
        flagged,
        classifier_flagged,
        confidence_flagged,
        context_flagged,
        category,
        adjusted_score,
        context,
        message,
    );

    FlagOutcome {
        flagged,
        classifier_flagged,
        confidence_flagged,
        context_flagged,
        adjusted_score,
        moderator_summary,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_summary(
    flagged: bool,
    classifier_flagged: bool,
    confidence_flagged: bool,
    context_flagged: bool,
    category: Option<SafetyCategory>,
    adjusted_score: f64,
    context: &ContextAnalysis,
    message: &str,
) -> String {
    if !flagged {
        return "No safety concerns detected".to_string();
    }

    let mut reasons: Vec<String> = Vec::new();
    if classifier_flagged && category.is_some() {
        reasons.push(format!("{} content", category_label(category)));
    }
    if confidence_flagged {
        reasons.push(format!("low confidence ({adjusted_score:.0}%)"));
    }
    if context_flagged {
        if context.risk_escalation {
            reasons.push("risk escalation".into());
        }
        if context.filter_bypass_attempt {
            reasons.push("possible filter bypass".into());
        }
        if context.persistent_sensitive_topic {
            reasons.push("persistent sensitive queries".into());
        }
    }

    let excerpt: String = message.chars().take(100).collect();
    if reasons.is_empty() {
        format!("Flagged: {excerpt}")
    } else {
        format!("Flagged for: {}. Message: {excerpt}", reasons.join(", "))
    }
}
