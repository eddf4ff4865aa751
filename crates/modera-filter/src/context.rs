// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-turn conversation context analysis.
//!
//! Inspects the bounded recent window (up to 9 prior turns) for risk
//! escalation, filter-bypass attempts, persistent sensitive topics, and a
//! recency-weighted cumulative risk score. The analysis is recomputed
//! fresh on every turn and never stored on its own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use modera_core::{ConversationTurn, Role, SafetyCategory};

use crate::lexicon::{SafetyLexicon, Severity};

/// How many prior turns the analyzer considers.
pub const HISTORY_WINDOW: usize = 9;

/// A prior user query as echoed back in the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousQuery {
    pub content: String,
    pub category: Option<SafetyCategory>,
    pub confidence: Option<f64>,
}

/// Derived, ephemeral result of a context pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub risk_escalation: bool,
    pub filter_bypass_attempt: bool,
    pub cumulative_risk_score: f64,
    pub persistent_sensitive_topic: bool,
    pub context_flags: Vec<String>,
    pub previous_queries: Vec<PreviousQuery>,
}

impl ContextAnalysis {
    /// True if any context signal fired.
    pub fn any_flag(&self) -> bool {
        self.risk_escalation || self.filter_bypass_attempt || self.persistent_sensitive_topic
    }
}

/// Categories that the bypass detector knows secondary vocabulary for.
const BYPASS_CATEGORIES: &[SafetyCategory] = &[
    SafetyCategory::Medical,
    SafetyCategory::Financial,
    SafetyCategory::Legal,
];

/// Context analyzer over the shared lexicon.
pub struct ContextAnalyzer {
    lexicon: Arc<SafetyLexicon>,
}

impl ContextAnalyzer {
    pub fn new(lexicon: Arc<SafetyLexicon>) -> Self {
        Self { lexicon }
    }

    /// Analyze the new message against the recent window.
    ///
    /// `history` is ordered oldest-first; only the last [`HISTORY_WINDOW`]
    /// turns are examined, and only user turns contribute. Empty history
    /// yields an all-false/zero analysis.
    pub fn analyze(
        &self,
        history: &[ConversationTurn],
        new_message: &str,
        new_category: Option<SafetyCategory>,
        confidence: f64,
    ) -> ContextAnalysis {
        let mut analysis = ContextAnalysis::default();

        if history.is_empty() {
            return analysis;
        }

        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        let recent_user: Vec<&ConversationTurn> = history[window_start..]
            .iter()
            .filter(|t| t.role == Role::User)
            .collect();

        analysis.previous_queries = recent_user
            .iter()
            .map(|t| PreviousQuery {
                content: t.content.clone(),
                category: t.category,
                confidence: t.confidence,
            })
            .collect();

        let lower_new = new_message.to_lowercase();

        if let Some(category) = new_category {
            let previous_same: Vec<&&ConversationTurn> = recent_user
                .iter()
                .filter(|t| t.category == Some(category))
                .collect();

            if !previous_same.is_empty() {
                match category {
                    SafetyCategory::Medical => {
                        let previous_content = previous_same
                            .iter()
                            .map(|t| t.content.to_lowercase())
                            .collect::<Vec<_>>()
                            .join(" ");
                        let new_severity = self.lexicon.severity_of(&lower_new);
                        let prev_severity = self.lexicon.severity_of(&previous_content);

                        let escalated = (prev_severity == Severity::Low
                            && new_severity > Severity::Low)
                            || (prev_severity == Severity::Medium
                                && new_severity == Severity::High);
                        if escalated {
                            analysis.risk_escalation = true;
                            analysis
                                .context_flags
                                .push("Medical risk escalation detected in conversation".into());
                        }
                    }
                    SafetyCategory::Financial => {
                        // General money talk turning into action-oriented requests.
                        let action_verbs = ["invest", "buy", "sell", "trade", "strategy"];
                        let takes_action = action_verbs.iter().any(|v| lower_new.contains(v));
                        let prior_general = previous_same.iter().any(|t| {
                            let lower = t.content.to_lowercase();
                            lower.contains("money") || lower.contains("earn")
                        });
                        if takes_action && prior_general {
                            analysis.risk_escalation = true;
                            analysis
                                .context_flags
                                .push("Financial advice escalation detected".into());
                        }
                    }
                    SafetyCategory::Legal | SafetyCategory::Crisis => {}
                }
            }

            if previous_same.len() >= 2 {
                analysis.persistent_sensitive_topic = true;
                analysis
                    .context_flags
                    .push(format!("Multiple {category} queries in conversation"));
            }
        }

        // Filter-bypass detection: only meaningful when the new message
        // itself evaded every primary lexicon.
        if new_category.is_none() && !recent_user.is_empty() {
            'bypass: for &cat in BYPASS_CATEGORIES {
                let prior_in_cat = recent_user.iter().any(|t| t.category == Some(cat));
                if !prior_in_cat {
                    continue;
                }
                let related = self
                    .lexicon
                    .bypass_terms(cat)
                    .iter()
                    .any(|term| lower_new.contains(term));
                let triggers_primary = self.lexicon.hit_count(cat, &lower_new) > 0;
                if related && !triggers_primary {
                    analysis.filter_bypass_attempt = true;
                    analysis
                        .context_flags
                        .push(format!("Possible filter bypass attempt ({cat} topic)"));
                    break 'bypass;
                }
            }
        }

        analysis.cumulative_risk_score =
            cumulative_risk(&recent_user, new_category, confidence);

        analysis
    }
}

/// Recency-weighted mean over the confidences of sensitive-category turns,
/// the new message included. Weights run 1..N with the most recent turn
/// weighted heaviest; unset confidences default to 0.5.
fn cumulative_risk(
    recent_user: &[&ConversationTurn],
    new_category: Option<SafetyCategory>,
    confidence: f64,
) -> f64 {
    let mut risk_scores: Vec<f64> = recent_user
        .iter()
        .filter(|t| t.category.is_some())
        .map(|t| t.confidence.unwrap_or(0.5))
        .collect();

    if new_category.is_some() {
        risk_scores.push(if confidence > 0.0 { confidence } else { 0.5 });
    }

    if risk_scores.is_empty() {
        return 0.0;
    }

    let weighted: f64 = risk_scores
        .iter()
        .enumerate()
        .map(|(i, s)| s * (i + 1) as f64)
        .sum();
    let weight_total: f64 = (1..=risk_scores.len()).map(|w| w as f64).sum();
    weighted / weight_total
}
