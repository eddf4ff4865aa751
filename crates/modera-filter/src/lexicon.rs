// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical safety keyword lexicon.
//!
//! One immutable table owned here and shared (via `Arc`) by every analyzer
//! that needs keyword knowledge -- the classifier, the context analyzer,
//! the priority resolver, and the local generator. Nothing else in the
//! workspace maintains its own keyword lists.

use modera_core::SafetyCategory;

/// Primary trigger keywords per category. Matching is case-insensitive
/// substring search over the lowercased message.
const MEDICAL_KEYWORDS: &[&str] = &[
    "pain", "hurt", "fever", "doctor", "medicine", "sick", "headache",
];

const FINANCIAL_KEYWORDS: &[&str] = &[
    "invest", "money", "bitcoin", "stock", "credit card", "loan",
];

const LEGAL_KEYWORDS: &[&str] = &["lawyer", "legal", "sue", "contract", "illegal"];

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "depressed",
    "kill myself",
    "end my life",
    "hopeless",
    "i want to die",
    "want to die",
    "don't want to live",
    "better off dead",
    "going to kill",
    "end it all",
    "no reason to live",
    "hurt myself",
    "self harm",
    "cutting myself",
    "want to end",
    "not worth living",
];

/// Topically related but non-triggering vocabulary, used by filter-bypass
/// detection: a message that uses these while avoiding every primary
/// keyword of the same category looks like a rephrasing attempt.
const MEDICAL_BYPASS_TERMS: &[&str] = &[
    "health", "body", "feel", "symptom", "doctor", "treatment",
];

const FINANCIAL_BYPASS_TERMS: &[&str] = &[
    "money", "cash", "wealth", "income", "profit", "return",
];

const LEGAL_BYPASS_TERMS: &[&str] = &["law", "right", "legal", "court", "sue", "attorney"];

/// Medical symptom severity tiers for escalation detection.
const SEVERITY_LOW: &[&str] = &["hurt", "ache", "pain", "sore", "uncomfortable"];
const SEVERITY_MEDIUM: &[&str] = &["severe", "sharp", "intense", "persistent", "worsening"];
const SEVERITY_HIGH: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "emergency",
    "urgent",
    "can't breathe",
    "heart",
    "stroke",
];

/// Toxic-language indicators counted by the priority resolver.
const TOXIC_INDICATORS: &[&str] = &[
    "hate", "kill you", "destroy", "attack", "violence", "threat", "harm you",
];

/// Instructional-intent phrasing that upgrades legal matches.
const INSTRUCTIONAL_INTENT: &[&str] = &[
    "how to", "help me", "can you help", "instructions", "guide", "tutorial",
];

const HIGH_RISK_FINANCIAL: &[&str] = &[
    "invest all", "borrow money", "take loan", "credit card debt", "gambling",
];

const CONTROVERSIAL_KEYWORDS: &[&str] = &[
    "holocaust", "genocide", "war crimes", "atrocity", "massacre",
];

const POLITICAL_KEYWORDS: &[&str] = &[
    "president", "election", "political party", "voting", "campaign", "politician",
];

const RELIGIOUS_KEYWORDS: &[&str] = &[
    "god", "religion", "faith", "prayer", "church", "temple", "mosque", "bible", "quran",
];

/// Symptom severity tier for medical escalation comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Immutable keyword tables, built once at process start.
#[derive(Debug, Clone, Default)]
pub struct SafetyLexicon {
    _private: (),
}

impl SafetyLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary trigger keywords for a category.
    pub fn keywords(&self, category: SafetyCategory) -> &'static [&'static str] {
        match category {
            SafetyCategory::Medical => MEDICAL_KEYWORDS,
            SafetyCategory::Financial => FINANCIAL_KEYWORDS,
            SafetyCategory::Legal => LEGAL_KEYWORDS,
            SafetyCategory::Crisis => CRISIS_KEYWORDS,
        }
    }

    /// Secondary related-vocabulary terms for bypass detection.
    /// Crisis has no bypass lexicon; crisis phrasing is always primary.
    pub fn bypass_terms(&self, category: SafetyCategory) -> &'static [&'static str] {
        match category {
            SafetyCategory::Medical => MEDICAL_BYPASS_TERMS,
            SafetyCategory::Financial => FINANCIAL_BYPASS_TERMS,
            SafetyCategory::Legal => LEGAL_BYPASS_TERMS,
            SafetyCategory::Crisis => &[],
        }
    }

    /// Number of a category's keywords present in the lowercased text.
    pub fn hit_count(&self, category: SafetyCategory, lower: &str) -> usize {
        self.keywords(category)
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count()
    }

    /// True if any crisis keyword is present in the lowercased text.
    pub fn contains_crisis(&self, lower: &str) -> bool {
        CRISIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    /// Highest medical severity tier whose keywords appear in the text.
    pub fn severity_of(&self, lower: &str) -> Severity {
        let mut severity = Severity::Low;
        for (tier, keywords) in [
            (Severity::Low, SEVERITY_LOW),
            (Severity::Medium, SEVERITY_MEDIUM),
            (Severity::High, SEVERITY_HIGH),
        ] {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                severity = tier;
            }
        }
        severity
    }

    pub fn toxic_indicator_count(&self, lower: &str) -> usize {
        TOXIC_INDICATORS.iter().filter(|kw| lower.contains(*kw)).count()
    }

    pub fn has_instructional_intent(&self, lower: &str) -> bool {
        INSTRUCTIONAL_INTENT.iter().any(|kw| lower.contains(kw))
    }

    pub fn has_high_risk_financial(&self, lower: &str) -> bool {
        HIGH_RISK_FINANCIAL.iter().any(|kw| lower.contains(kw))
    }

    pub fn has_controversial(&self, lower: &str) -> bool {
        CONTROVERSIAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    pub fn has_political(&self, lower: &str) -> bool {
        POLITICAL_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    pub fn has_religious(&self, lower: &str) -> bool {
        RELIGIOUS_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crisis_keywords_are_detected() {
        let lex = SafetyLexicon::new();
        assert!(lex.contains_crisis("i want to die"));
        assert!(lex.contains_crisis("there is no reason to live anymore"));
        assert!(!lex.contains_crisis("what a lovely day"));
    }

    #[test]
    fn hit_count_counts_distinct_keywords() {
        let lex = SafetyLexicon::new();
        assert_eq!(
            lex.hit_count(SafetyCategory::Medical, "the pain and fever won't stop"),
            2
        );
        assert_eq!(lex.hit_count(SafetyCategory::Legal, "hello"), 0);
    }

    #[test]
    fn severity_picks_highest_matching_tier() {
        let lex = SafetyLexicon::new();
        assert_eq!(lex.severity_of("my arm is sore"), Severity::Low);
        assert_eq!(lex.severity_of("a sharp persistent pain"), Severity::Medium);
        assert_eq!(lex.severity_of("chest pain and can't breathe"), Severity::High);
        assert!(Severity::Low < Severity::High);
    }

    #[test]
    fn crisis_has_no_bypass_lexicon() {
        let lex = SafetyLexicon::new();
        assert!(lex.bypass_terms(SafetyCategory::Crisis).is_empty());
        assert!(!lex.bypass_terms(SafetyCategory::Medical).is_empty());
    }
}
