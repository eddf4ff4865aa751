// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword safety classification.
//!
//! Maps message text to a sensitivity category and a raw confidence using
//! case-insensitive substring search over the canonical lexicon. Pure and
//! side-effect free: the same text always yields the same classification.

use std::sync::Arc;

use modera_core::SafetyCategory;

use crate::lexicon::SafetyLexicon;

/// Result of classifying a message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Detected category, or `None` when no lexicon matched.
    pub category: Option<SafetyCategory>,
    /// Safety-filter confidence in [0, 1]. 0.0 when no category matched.
    pub confidence: f64,
}

impl Classification {
    /// A safe (unmatched) classification.
    pub fn safe() -> Self {
        Self {
            category: None,
            confidence: 0.0,
        }
    }
}

/// Keyword classifier over the shared lexicon.
pub struct SafetyClassifier {
    lexicon: Arc<SafetyLexicon>,
}

/// Non-crisis categories in detection precedence order.
const ORDERED_CATEGORIES: &[SafetyCategory] = &[
    SafetyCategory::Medical,
    SafetyCategory::Financial,
    SafetyCategory::Legal,
];

impl SafetyClassifier {
    pub fn new(lexicon: Arc<SafetyLexicon>) -> Self {
        Self { lexicon }
    }

    /// Classify a message.
    ///
    /// Crisis keywords are checked first and take absolute priority: any
    /// crisis hit makes the category `crisis` regardless of other matches.
    /// Crisis confidence is intentionally inverted -- it stays low and
    /// bounded so crisis content is never mistaken for a confident
    /// classification and always trips downstream flagging.
    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        let crisis_hits = self.lexicon.hit_count(SafetyCategory::Crisis, &lower);
        if crisis_hits > 0 {
            return Classification {
                category: Some(SafetyCategory::Crisis),
                confidence: (0.10 + 0.05 * crisis_hits as f64).min(0.30),
            };
        }

        for &category in ORDERED_CATEGORIES {
            let hits = self.lexicon.hit_count(category, &lower);
            if hits > 0 {
                return Classification {
                    category: Some(category),
                    confidence: (0.5 + 0.15 * hits as f64).min(0.95),
                };
            }
        }

        Classification::safe()
    }
}
