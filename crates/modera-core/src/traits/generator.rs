// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generator trait for the external text-generation collaborator.

use async_trait::async_trait;

use crate::error::ModeraError;
use crate::types::{PiiKind, SafetyCategory};

/// Fixed crisis-resources reply. Part of the generator contract: crisis
/// content short-circuits to this message, produced locally, never
/// depending on an external call succeeding.
pub const CRISIS_RESPONSE: &str = "I'm concerned about what you've shared. If you're in immediate danger, please call emergency services (911) or your local crisis hotline right away.\n\n\
**Crisis Resources:**\n\
\u{2022} National Suicide Prevention Lifeline: 988 (24/7)\n\
\u{2022} Crisis Text Line: Text HOME to 741741\n\
\u{2022} International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/\n\n\
This message has been flagged for immediate human review. A trained professional will reach out to provide support. You are not alone, and help is available.";

/// Fixed privacy-education reply returned whenever PII was redacted.
pub const PRIVACY_RESPONSE: &str = "I've detected personal information in your message. For privacy protection, I've redacted it. Remember: AI systems should never ask for or store personal details like emails, passwords, or identification numbers.";

/// Produces the assistant reply for a processed user message.
///
/// Contract: implementations receive only redacted text, never raw input.
/// Crisis content must short-circuit to a fixed crisis-resources message
/// without any further generation, and detected PII must yield the fixed
/// privacy-education response. The pipeline enforces the crisis rule
/// locally as well, so a remote implementation failing this contract can
/// never reach the user on the crisis path.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate a reply for `text`, informed by the classified category and
    /// any detected PII kinds.
    async fn generate(
        &self,
        text: &str,
        category: Option<SafetyCategory>,
        pii_types: &[PiiKind],
    ) -> Result<String, ModeraError>;
}
