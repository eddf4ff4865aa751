// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PII detection and redaction for inbound message text.
//!
//! This must run before storage, logging, or any downstream analyzer --
//! no component after this one ever observes the original unredacted text.
//!
//! Matchers are applied in a fixed order (credit card, SSN, phone, email,
//! address) and each one rewrites the progressively redacted string, so a
//! later matcher sees the output of earlier ones. Redaction is a fixed
//! point: running it on already-redacted text changes nothing.

use std::sync::LazyLock;

use regex::Regex;

use modera_core::PiiKind;

/// The redaction placeholder.
const REDACTED: &str = "[REDACTED]";

/// Fixed educational warning returned whenever any PII kind is detected.
pub const PII_WARNING: &str = "I've removed personal information for your safety.";

/// Credit card number patterns. Digit-count validation (13-19 digits)
/// gates these to avoid false positives on arbitrary digit runs.
static CREDIT_CARD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // 4111-1111-1111-1111 / 4111 1111 1111 1111 / 4111111111111111
        Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").unwrap(),
        // Amex: 3782-822463-10005
        Regex::new(r"\b\d{4}[-\s]?\d{6}[-\s]?\d{5}\b").unwrap(),
    ]
});

/// SSN pattern (XXX-XX-XXXX).
static SSN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

/// Bare 10-digit runs are only treated as phone numbers when an adjacent
/// word makes the intent clear ("phone 5551234567"); years and timestamps
/// must not trip this rule.
static PHONE_CONTEXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:phone|call|text|contact|number|tel|mobile)\s*[:\-]?\s*\d{10}\b")
        .unwrap()
});

static BARE_TEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{10}\b").unwrap());

/// Formatted phone number patterns, applied unconditionally.
static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // (123) 456-7890
        Regex::new(r"\(\d{3}\)\s*\d{3}-\d{4}\b").unwrap(),
        // 123-456-7890
        Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").unwrap(),
        // 123.456.7890
        Regex::new(r"\b\d{3}\.\d{3}\.\d{4}\b").unwrap(),
        // +1 123 456 7890
        Regex::new(r"\+\d{1,3}\s*\d{3}\s*\d{3}\s*\d{4}\b").unwrap(),
        // 123 456 7890
        Regex::new(r"\b\d{3}\s+\d{3}\s+\d{4}\b").unwrap(),
    ]
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// Street number + street name ("123 Main St", "456 Oak Avenue").
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Way|Circle|Cir)\b",
    )
    .unwrap()
});

/// Result of a redaction pass.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// The redacted text. Unmodified when nothing was detected.
    pub text: String,
    /// Detected PII kinds in first-seen order, deduplicated.
    pub detected: Vec<PiiKind>,
}

impl Redaction {
    /// True if any PII was detected.
    pub fn pii_detected(&self) -> bool {
        !self.detected.is_empty()
    }

    /// The fixed educational warning, present iff anything was detected.
    pub fn warning(&self) -> Option<&'static str> {
        self.pii_detected().then_some(PII_WARNING)
    }
}

/// Detect and redact PII from raw message text.
///
/// Never fails: absence of any match yields the input unchanged with an
/// empty kind list.
pub fn redact_pii(input: &str) -> Redaction {
    let mut text = input.to_string();
    let mut detected: Vec<PiiKind> = Vec::new();

    let mut mark = |detected: &mut Vec<PiiKind>, kind: PiiKind| {
        if !detected.contains(&kind) {
            detected.push(kind);
        }
    };

    // Credit cards: replace every match that passes the 13-19 digit gate.
    for pattern in CREDIT_CARD_PATTERNS.iter() {
        loop {
            let span = pattern.find_iter(&text).find_map(|m| {
                let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
                (13..=19).contains(&digits).then(|| m.range())
            });
            match span {
                Some(range) => {
                    text.replace_range(range, REDACTED);
                    mark(&mut detected, PiiKind::CreditCard);
                }
                None => break,
            }
        }
    }

    // SSNs.
    if SSN_PATTERN.is_match(&text) {
        text = SSN_PATTERN.replace_all(&text, REDACTED).into_owned();
        mark(&mut detected, PiiKind::Ssn);
    }

    // Context-gated bare 10-digit phone numbers.
    if PHONE_CONTEXT_PATTERN.is_match(&text) {
        text = BARE_TEN_DIGITS.replace_all(&text, REDACTED).into_owned();
        mark(&mut detected, PiiKind::Phone);
    }

    // Formatted phone numbers.
    for pattern in PHONE_PATTERNS.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, REDACTED).into_owned();
            mark(&mut detected, PiiKind::Phone);
        }
    }

    // Email addresses.
    if EMAIL_PATTERN.is_match(&text) {
        text = EMAIL_PATTERN.replace_all(&text, REDACTED).into_owned();
        mark(&mut detected, PiiKind::Email);
    }

    // Physical addresses.
    if ADDRESS_PATTERN.is_match(&text) {
        text = ADDRESS_PATTERN.replace_all(&text, REDACTED).into_owned();
        mark(&mut detected, PiiKind::Address);
    }

    Redaction { text, detected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_ssn() {
        let r = redact_pii("My SSN is 123-45-6789");
        assert_eq!(r.text, "My SSN is [REDACTED]");
        assert_eq!(r.detected, vec![PiiKind::Ssn]);
        assert_eq!(r.warning(), Some(PII_WARNING));
    }

    #[test]
    fn redacts_credit_card_formats() {
        for input in [
            "card 4111-1111-1111-1111 please",
            "card 4111 1111 1111 1111 please",
            "card 4111111111111111 please",
            "amex 3782-822463-10005 please",
        ] {
            let r = redact_pii(input);
            assert!(r.text.contains(REDACTED), "not redacted: {input}");
            assert_eq!(r.detected, vec![PiiKind::CreditCard]);
        }
    }

    #[test]
    fn redacts_multiple_cards_in_one_message() {
        let r = redact_pii("4111-1111-1111-1111 and 5500 0000 0000 0004");
        assert!(!r.text.chars().any(|c| c.is_ascii_digit()));
        assert_eq!(r.detected, vec![PiiKind::CreditCard]);
    }

    #[test]
    fn ignores_overly_long_digit_runs() {
        let r = redact_pii("order id 12345678901234567890123");
        assert_eq!(r.text, "order id 12345678901234567890123");
        assert!(r.detected.is_empty());
        assert!(r.warning().is_none());
    }

    #[test]
    fn redacts_formatted_phone_numbers() {
        for input in [
            "(123) 456-7890",
            "123-456-7890",
            "123.456.7890",
            "+1 123 456 7890",
            "123 456 7890",
        ] {
            let r = redact_pii(input);
            assert!(r.text.contains(REDACTED), "not redacted: {input}");
            assert!(r.detected.contains(&PiiKind::Phone));
        }
    }

    #[test]
    fn bare_ten_digits_need_phone_context() {
        let no_context = redact_pii("the id is 5551234567 thanks");
        assert!(no_context.detected.is_empty());

        let with_context = redact_pii("my phone: 5551234567 thanks");
        assert_eq!(with_context.text, "my phone: [REDACTED] thanks");
        assert_eq!(with_context.detected, vec![PiiKind::Phone]);
    }

    #[test]
    fn redacts_email_addresses() {
        let r = redact_pii("reach me at jane.doe+test@example.co.uk today");
        assert_eq!(r.text, "reach me at [REDACTED] today");
        assert_eq!(r.detected, vec![PiiKind::Email]);
    }

    #[test]
    fn redacts_street_addresses() {
        let r = redact_pii("I live at 123 Main Street in town");
        assert!(r.text.contains(REDACTED));
        assert!(!r.text.contains("Main Street"));
        assert_eq!(r.detected, vec![PiiKind::Address]);
    }

    #[test]
    fn detected_kinds_keep_first_seen_order() {
        let r = redact_pii("ssn 123-45-6789, mail a@b.com, card 4111 1111 1111 1111");
        assert_eq!(
            r.detected,
            vec![PiiKind::CreditCard, PiiKind::Ssn, PiiKind::Email]
        );
    }

    #[test]
    fn clean_text_passes_through_unchanged() {
        let input = "What is the capital of France?";
        let r = redact_pii(input);
        assert_eq!(r.text, input);
        assert!(r.detected.is_empty());
    }

    #[test]
    fn redaction_is_idempotent() {
        let first = redact_pii("ssn 123-45-6789 phone (123) 456-7890 at 9 Oak Ave");
        let second = redact_pii(&first.text);
        assert_eq!(second.text, first.text);
        assert!(second.detected.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn redaction_fixed_point(input in "\\PC{0,120}") {
            let first = redact_pii(&input);
            let second = redact_pii(&first.text);
            proptest::prop_assert_eq!(&second.text, &first.text);
        }
    }
}
