// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Modera moderation pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Modera workspace. The analyzer crates
//! operate on these types; the storage and gateway crates persist and serve
//! them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ModeraError;
pub use traits::{ModerationStore, ResponseGenerator, CRISIS_RESPONSE, PRIVACY_RESPONSE};
pub use types::{
    category_label, ConfidenceLevel, ConversationId, ConversationTurn, DecisionId,
    HealthCounts, Message, MessageId, ModeratorAction, ModeratorDecision, PiiKind,
    PriorityTier, QueueItem, ReviewState, Role, SafetyCategory, SafetyLevel,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn confidence_level_bands_match_contract() {
        assert_eq!(ConfidenceLevel::from_score(100.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(80.0), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(79.9), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(50.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(49.9), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn priority_tier_orders_critical_first() {
        let mut tiers = vec![
            PriorityTier::Low,
            PriorityTier::Critical,
            PriorityTier::Medium,
            PriorityTier::High,
        ];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![
                PriorityTier::Critical,
                PriorityTier::High,
                PriorityTier::Medium,
                PriorityTier::Low,
            ]
        );
    }

    #[test]
    fn safety_level_thresholds() {
        assert_eq!(SafetyLevel::Strict.flag_threshold(), 70.0);
        assert_eq!(SafetyLevel::Moderate.flag_threshold(), 50.0);
        assert_eq!(SafetyLevel::Lenient.flag_threshold(), 30.0);
        assert_eq!(SafetyLevel::default(), SafetyLevel::Moderate);
    }

    #[test]
    fn moderator_action_parses_lowercase() {
        assert_eq!(
            ModeratorAction::from_str("approve").unwrap(),
            ModeratorAction::Approve
        );
        assert_eq!(
            ModeratorAction::from_str("escalate").unwrap(),
            ModeratorAction::Escalate
        );
        assert!(ModeratorAction::from_str("shred").is_err());
    }

    #[test]
    fn pii_kind_serializes_snake_case() {
        assert_eq!(PiiKind::CreditCard.to_string(), "credit_card");
        assert_eq!(PiiKind::Ssn.to_string(), "ssn");
        let json = serde_json::to_string(&PiiKind::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
    }

    #[test]
    fn category_label_maps_none_to_safe() {
        assert_eq!(category_label(None), "safe");
        assert_eq!(category_label(Some(SafetyCategory::Crisis)), "crisis");
        assert_eq!(
            SafetyCategory::from_str("medical").unwrap(),
            SafetyCategory::Medical
        );
    }
}
