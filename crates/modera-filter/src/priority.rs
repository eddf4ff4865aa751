// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority resolution for flagged content.
//!
//! A strict, ordered decision ladder: rules are evaluated top to bottom
//! and the first match wins, no fallthrough. The ladder is an explicit
//! rule table so each rung can be unit-tested in isolation and the
//! precedence contract stays auditable.
//!
//! Only invoked for content the aggregator already decided to flag.

use std::sync::Arc;

use modera_core::{PriorityTier, SafetyCategory};

use crate::lexicon::SafetyLexicon;

/// Resolved priority: tier, human-readable escalation reason, and target
/// human response time in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityDecision {
    pub tier: PriorityTier,
    pub reason: String,
    pub target_minutes: u32,
}

/// Inputs to the ladder.
#[derive(Debug, Clone, Copy)]
pub struct PriorityInput<'a> {
    pub category: Option<SafetyCategory>,
    /// Safety-filter confidence (0-1).
    pub safety_confidence: f64,
    /// Redacted message content.
    pub content: &'a str,
    /// Response confidence score (0-100).
    pub confidence_score: f64,
}

struct RuleCtx<'a> {
    input: PriorityInput<'a>,
    lower: String,
    lexicon: &'a SafetyLexicon,
}

type Rule = fn(&RuleCtx) -> Option<PriorityDecision>;

/// The ladder, in contract order.
const RULES: &[Rule] = &[
    crisis_rule,
    medical_rule,
    legal_rule,
    toxicity_rule,
    financial_rule,
    low_confidence_rule,
    controversial_rule,
    political_rule,
    religious_rule,
    residual_category_rule,
];

fn crisis_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    let is_crisis = ctx.input.category == Some(SafetyCategory::Crisis)
        || ctx.lexicon.contains_crisis(&ctx.lower);
    is_crisis.then(|| PriorityDecision {
        tier: PriorityTier::Critical,
        reason: "Mental health crisis detected".into(),
        target_minutes: 0,
    })
}

fn medical_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    (ctx.input.category == Some(SafetyCategory::Medical)).then(|| PriorityDecision {
        tier: PriorityTier::High,
        reason: "Medical advice request requires professional oversight".into(),
        target_minutes: 5,
    })
}

fn legal_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    if ctx.input.category != Some(SafetyCategory::Legal) {
        return None;
    }
    let reason = if ctx.lexicon.has_instructional_intent(&ctx.lower) {
        "Illegal activity inquiry detected"
    } else {
        "Legal advice request"
    };
    Some(PriorityDecision {
        tier: PriorityTier::High,
        reason: reason.into(),
        target_minutes: 5,
    })
}

fn toxicity_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    let count = ctx.lexicon.toxic_indicator_count(&ctx.lower);
    (count >= 2).then(|| PriorityDecision {
        tier: PriorityTier::High,
        reason: format!("High toxicity detected ({count} indicators)"),
        target_minutes: 5,
    })
}

fn financial_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    if ctx.input.category != Some(SafetyCategory::Financial) {
        return None;
    }
    let reason = if ctx.input.confidence_score < 30.0 || ctx.input.safety_confidence < 0.3 {
        "High-risk financial advice with low confidence".to_string()
    } else if ctx.lexicon.has_high_risk_financial(&ctx.lower) {
        "High-risk financial advice detected".to_string()
    } else {
        "Financial advice request".to_string()
    };
    Some(PriorityDecision {
        tier: PriorityTier::Medium,
        reason,
        target_minutes: 15,
    })
}

fn low_confidence_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    let low = ctx.input.confidence_score < 30.0 || ctx.input.safety_confidence < 0.3;
    low.then(|| PriorityDecision {
        tier: PriorityTier::Medium,
        reason: format!(
            "Low confidence response ({:.0}%)",
            ctx.input.confidence_score
        ),
        target_minutes: 15,
    })
}

fn controversial_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    ctx.lexicon.has_controversial(&ctx.lower).then(|| PriorityDecision {
        tier: PriorityTier::Medium,
        reason: "Controversial historical topic".into(),
        target_minutes: 15,
    })
}

fn political_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    ctx.lexicon.has_political(&ctx.lower).then(|| PriorityDecision {
        tier: PriorityTier::Low,
        reason: "Political discussion".into(),
        target_minutes: 60,
    })
}

fn religious_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    ctx.lexicon.has_religious(&ctx.lower).then(|| PriorityDecision {
        tier: PriorityTier::Low,
        reason: "Religious topic".into(),
        target_minutes: 60,
    })
}

fn residual_category_rule(ctx: &RuleCtx) -> Option<PriorityDecision> {
    ctx.input.category.map(|category| {
        let mut name = category.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        PriorityDecision {
            tier: PriorityTier::Medium,
            reason: format!("{name} content flagged"),
            target_minutes: 15,
        }
    })
}

/// Priority resolver over the shared lexicon.
pub struct PriorityResolver {
    lexicon: Arc<SafetyLexicon>,
}

impl PriorityResolver {
    pub fn new(lexicon: Arc<SafetyLexicon>) -> Self {
        Self { lexicon }
    }

    /// Walk the ladder; first matching rule wins.
    pub fn resolve(&self, input: PriorityInput<'_>) -> PriorityDecision {
        let ctx = RuleCtx {
            lower: input.content.to_lowercase(),
            input,
            lexicon: &self.lexicon,
        };
        for rule in RULES {
            if let Some(decision) = rule(&ctx) {
                return decision;
            }
        }
        PriorityDecision {
            tier: PriorityTier::Low,
            reason: "General content review".into(),
            target_minutes: 60,
        }
    }
}
