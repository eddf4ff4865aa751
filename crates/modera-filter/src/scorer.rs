// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response confidence scoring.
//!
//! Estimates how trustworthy a generated reply is (0-100), independent of
//! the safety category. The base score comes from an ordered ladder of
//! query pattern families -- the evaluation order is a design contract:
//! factual > personal advice > future prediction > bare sensitive category
//! > subjective > current events > baseline. First matching family sets
//! the base; reply-text adjustments are applied afterwards.

use std::sync::LazyLock;

use regex::Regex;

use modera_core::{ConfidenceLevel, SafetyCategory};

/// Fixed disclosure appended whenever the final score is below 30.
pub const UNCERTAINTY_DISCLOSURE: &str = "AI is uncertain about this response";

/// Factual query patterns -- verifiable information requests.
const FACTUAL_PATTERNS: &[&str] = &[
    "what is",
    "what are",
    "what was",
    "what were",
    "who is",
    "who was",
    "who invented",
    "who created",
    "where is",
    "where was",
    "where did",
    "when did",
    "when was",
    "when is",
    "how many",
    "how much",
    "how does",
    "how do",
    "define",
    "definition of",
    "explain",
    "describe",
    "capital of",
    "invented",
    "discovered",
    "created",
];

/// Subjective/opinion patterns.
const SUBJECTIVE_PATTERNS: &[&str] = &[
    "should i",
    "what should i",
    "do you think",
    "do you recommend",
    "best",
    "worst",
    "better",
    "prefer",
    "favorite",
    "opinion",
    "think about",
    "believe",
    "feel",
    "like",
];

/// Personal advice patterns.
const PERSONAL_ADVICE_PATTERNS: &[&str] = &[
    "should i",
    "what should i do",
    "what should i",
    "advice",
    "recommend",
    "suggest",
    "tell me what to",
    "help me decide",
];

/// Future prediction patterns.
const FUTURE_PATTERNS: &[&str] = &[
    "will",
    "going to",
    "predict",
    "forecast",
    "future",
    "tomorrow",
    "next year",
    "will happen",
    "will it",
];

/// Historical fact indicators.
const HISTORICAL_PATTERNS: &[&str] = &[
    "invented",
    "discovered",
    "created",
    "founded",
    "established",
    "who invented",
    "who discovered",
    "when was",
    "when did",
];

/// Scientific/educational indicators.
const SCIENTIFIC_PATTERNS: &[&str] = &[
    "science",
    "physics",
    "chemistry",
    "biology",
    "math",
    "mathematics",
    "photosynthesis",
    "gravity",
    "temperature",
    "boils at",
    "formula",
    "equation",
    "theory",
    "law of",
];

/// Math operator tokens that suggest a calculation request.
const MATH_OPERATORS: &[&str] = &[
    "+", "-", "*", "×", "÷", "/", "times", "plus", "minus", "equals",
];

/// Hedging words in the reply; each occurrence costs 8 points.
const UNCERTAIN_LANGUAGE: &[&str] = &[
    "maybe",
    "perhaps",
    "might",
    "could",
    "possibly",
    "uncertain",
    "unclear",
    "not sure",
];

/// Evidentiary language in the reply.
const FACTUAL_INDICATORS: &[&str] = &[
    "fact",
    "established",
    "research",
    "study",
    "data",
    "evidence",
    "scientific",
    "verifiable",
];

/// Direct factual-answer words in the reply.
const DIRECT_ANSWER_WORDS: &[&str] = &["equals", "is", "was", "are", "were"];

/// A literal `N op M` arithmetic expression.
static MATH_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[+\-*/×÷]\s*\d+").unwrap());

/// Scorer output: score, band, and ordered human-readable justifications.
#[derive(Debug, Clone)]
pub struct ConfidenceReport {
    pub score: f64,
    pub level: ConfidenceLevel,
    pub reasons: Vec<String>,
}

fn matches_any(lower: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| lower.contains(p))
}

fn is_sensitive(category: Option<SafetyCategory>) -> bool {
    category.is_some()
}

/// Score a generated reply against the query that produced it.
///
/// Deterministic and order-sensitive; see the module docs for the ladder.
pub fn score_response(
    user_message: &str,
    reply: &str,
    category: Option<SafetyCategory>,
) -> ConfidenceReport {
    let lower_message = user_message.to_lowercase();
    let lower_reply = reply.to_lowercase();
    let mut reasons: Vec<String> = Vec::new();

    let is_factual = matches_any(&lower_message, FACTUAL_PATTERNS);
    let is_subjective = matches_any(&lower_message, SUBJECTIVE_PATTERNS);
    let is_personal_advice = matches_any(&lower_message, PERSONAL_ADVICE_PATTERNS);
    let is_future = matches_any(&lower_message, FUTURE_PATTERNS);
    let is_historical = matches_any(&lower_message, HISTORICAL_PATTERNS);
    let is_scientific = matches_any(&lower_message, SCIENTIFIC_PATTERNS);

    // Base score: first matching family wins.
    let mut score: f64 = if is_factual && !is_subjective && !is_personal_advice {
        if matches_any(&lower_message, MATH_OPERATORS) {
            if MATH_EXPRESSION.is_match(&lower_message) {
                reasons.push("Query asks for verifiable mathematical calculation".into());
                100.0
            } else {
                reasons.push("Query asks for mathematical information".into());
                95.0
            }
        } else if lower_message.contains("capital") {
            reasons.push("Query asks for verifiable geographical fact".into());
            100.0
        } else if is_historical {
            reasons.push("Query asks for verifiable historical fact".into());
            95.0
        } else if is_scientific {
            reasons.push("Query asks for verifiable scientific fact".into());
            95.0
        } else if !is_sensitive(category) {
            reasons.push("Query asks for verifiable factual information".into());
            90.0
        } else {
            // Factual framing does not outrank a sensitive category.
            reasons.push("Query is factual but involves sensitive category".into());
            50.0
        }
    } else if is_personal_advice {
        match category {
            Some(SafetyCategory::Medical)
            | Some(SafetyCategory::Financial)
            | Some(SafetyCategory::Legal) => {
                reasons.push("Query requests personal advice in sensitive category".into());
                25.0
            }
            _ if matches_any(&lower_message, &["invest", "buy", "stock"]) => {
                reasons.push("Query requests personal financial advice".into());
                30.0
            }
            _ => {
                reasons.push("Query requests personal advice".into());
                35.0
            }
        }
    } else if is_future {
        if lower_message.contains("weather") {
            reasons.push("Query about weather requires current data".into());
            65.0
        } else {
            reasons.push("Query involves future predictions with uncertainty".into());
            40.0
        }
    } else if category == Some(SafetyCategory::Crisis) {
        reasons.push(
            "Crisis content requires immediate human intervention and professional support"
                .into(),
        );
        15.0
    } else if let Some(cat) = category {
        reasons.push(format!(
            "Topic involves {cat} content requiring professional expertise"
        ));
        30.0
    } else if is_subjective {
        if matches_any(&lower_message, &["best", "worst", "better", "prefer"]) {
            reasons.push("Query requests subjective comparison or opinion".into());
            60.0
        } else {
            reasons.push("Query requests subjective opinion".into());
            55.0
        }
    } else if lower_message.contains("weather") {
        reasons.push("Weather information requires current data".into());
        65.0
    } else if matches_any(&lower_message, &["today", "current", "recent"]) {
        reasons.push("Query about current events requires up-to-date information".into());
        60.0
    } else {
        reasons.push("Standard confidence for general query".into());
        70.0
    };

    // Reply adjustments.
    let uncertain_count = UNCERTAIN_LANGUAGE
        .iter()
        .filter(|w| lower_reply.contains(*w))
        .count();
    if uncertain_count > 0 {
        score = (score - uncertain_count as f64 * 8.0).max(0.0);
        reasons.push("Response contains uncertain language".into());
    }

    if matches_any(&lower_reply, FACTUAL_INDICATORS) && score < 80.0 {
        score = (score + 5.0).min(100.0);
        reasons.push("Response references established facts or evidence".into());
    }

    if is_factual && matches_any(&lower_reply, DIRECT_ANSWER_WORDS) && score < 90.0 {
        score = (score + 3.0).min(100.0);
        reasons.push("Response provides direct factual answer".into());
    }

    let score = score.clamp(0.0, 100.0);

    if score < 30.0 {
        reasons.push(UNCERTAINTY_DISCLOSURE.into());
    }

    ConfidenceReport {
        score,
        level: ConfidenceLevel::from_score(score),
        reasons,
    }
}
