// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learning-mode educational analysis.
//!
//! When the learning toggle is on, each turn carries a structured
//! breakdown of which guardrails fired and why the confidence score
//! landed where it did.

use serde::{Deserialize, Serialize};

use modera_core::{PiiKind, SafetyCategory};
use modera_filter::ContextAnalysis;

/// One factor of the confidence breakdown with its approximate impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownFactor {
    pub factor: String,
    pub impact: String,
}

/// Educational metadata for learning mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningAnalysis {
    pub risk_category: String,
    pub triggered_guardrails: Vec<String>,
    pub confidence_breakdown: Vec<BreakdownFactor>,
    pub safety_tips: Vec<String>,
    pub human_review_reason: Option<String>,
    pub context_analysis: Option<ContextAnalysis>,
}

fn guardrail_name(category: SafetyCategory) -> &'static str {
    match category {
        SafetyCategory::Medical => "medical_advice_detection",
        SafetyCategory::Financial => "financial_advice_detection",
        SafetyCategory::Legal => "legal_advice_detection",
        SafetyCategory::Crisis => "crisis_intervention_detection",
    }
}

fn impact_for(reason: &str) -> &'static str {
    let lower = reason.to_lowercase();
    if lower.contains("uncertain") || lower.contains("uncertainty") {
        "-20%"
    } else if lower.contains("personal advice") {
        "-40%"
    } else if lower.contains("future") || lower.contains("prediction") {
        "-30%"
    } else if lower.contains("sensitive category") {
        "-25%"
    } else if lower.contains("mathematical") {
        "+25%"
    } else if lower.contains("factual") || lower.contains("verifiable") {
        "+15%"
    } else if lower.contains("established") || lower.contains("evidence") {
        "+10%"
    } else {
        "0%"
    }
}

/// Build the educational analysis for one processed turn.
pub fn build_learning_analysis(
    user_message: &str,
    category: Option<SafetyCategory>,
    confidence_score: f64,
    confidence_reasons: &[String],
    pii_types: &[PiiKind],
    context: &ContextAnalysis,
) -> LearningAnalysis {
    let lower = user_message.to_lowercase();

    let risk_category = match category {
        Some(c) => {
            let mut name = c.to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            name
        }
        None => "Safe".to_string(),
    };

    let mut triggered_guardrails = Vec::new();
    let mut safety_tips = Vec::new();
    let mut human_review_reason = None;

    if let Some(c) = category {
        triggered_guardrails.push(guardrail_name(c).to_string());
    }
    if !pii_types.is_empty() {
        triggered_guardrails.push("pii_detection".to_string());
        safety_tips.push("Personal information was automatically redacted for your privacy".into());
    }
    if confidence_score < 50.0 {
        triggered_guardrails.push("low_confidence_auto_flag".to_string());
    }

    let mut confidence_breakdown: Vec<BreakdownFactor> = confidence_reasons
        .iter()
        .map(|reason| BreakdownFactor {
            factor: reason.clone(),
            impact: impact_for(reason).to_string(),
        })
        .collect();

    if matches!(
        category,
        Some(SafetyCategory::Medical) | Some(SafetyCategory::Financial) | Some(SafetyCategory::Legal)
    ) {
        confidence_breakdown.push(BreakdownFactor {
            factor: "Topic risk".into(),
            impact: "-40%".into(),
        });
    }
    if lower.contains("should i") || lower.contains("advice") {
        confidence_breakdown.push(BreakdownFactor {
            factor: "Specificity".into(),
            impact: "-20%".into(),
        });
    }

    match category {
        Some(SafetyCategory::Medical) => {
            safety_tips.push("AI cannot diagnose medical conditions".into());
            safety_tips.push("Consult a healthcare professional for medical advice".into());
            human_review_reason = Some("Medical queries require professional oversight".into());
        }
        Some(SafetyCategory::Financial) => {
            safety_tips.push("AI cannot access your financial situation".into());
            safety_tips
                .push("Financial decisions should be made with professional guidance".into());
            human_review_reason =
                Some("Specific financial advice requires human oversight".into());
        }
        Some(SafetyCategory::Legal) => {
            safety_tips.push("AI cannot provide legal representation".into());
            safety_tips
                .push("Legal matters require consultation with a qualified attorney".into());
            human_review_reason = Some("Legal queries require professional legal review".into());
        }
        Some(SafetyCategory::Crisis) => {
            safety_tips.push(
                "If you're in crisis, please contact emergency services or a crisis hotline"
                    .into(),
            );
            human_review_reason =
                Some("Crisis content requires immediate human intervention".into());
        }
        None => {
            if confidence_score >= 80.0 {
                safety_tips
                    .push("This response has high confidence based on verifiable facts".into());
            } else if confidence_score >= 50.0 {
                safety_tips.push(
                    "This response has moderate confidence - verify important information".into(),
                );
            } else {
                safety_tips.push(
                    "This response has low confidence - exercise caution and verify information"
                        .into(),
                );
            }
        }
    }

    LearningAnalysis {
        risk_category,
        triggered_guardrails,
        confidence_breakdown,
        safety_tips,
        human_review_reason,
        context_analysis: Some(context.clone()),
    }
}
