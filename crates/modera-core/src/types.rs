// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Modera moderation pipeline.
//!
//! Everything here is plain data: the pipeline stages are pure functions
//! over these types, and the storage layer persists them. Raw unredacted
//! text never appears in any of these structs -- redaction happens before
//! a [`Message`] is ever constructed.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a moderator decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub String);

/// Which side of the conversation a message belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Sensitive content category assigned by the safety classifier.
///
/// `None` in an `Option<SafetyCategory>` means the message is safe; the
/// storage layer serializes that as the literal string `"safe"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SafetyCategory {
    Medical,
    Financial,
    Legal,
    Crisis,
}

/// Storage/display label for an optional category.
pub fn category_label(category: Option<SafetyCategory>) -> String {
    match category {
        Some(c) => c.to_string(),
        None => "safe".to_string(),
    }
}

/// Three-band label for a response confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Band boundaries: >= 80 High, >= 50 Medium, below Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceLevel::High
        } else if score >= 50.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Urgency tier for flagged content.
///
/// Derive order is the queue sort order: `Critical` sorts before `High`
/// before `Medium` before `Low`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

/// Actions a moderator can take on a flagged message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModeratorAction {
    Approve,
    Reject,
    Edit,
    Clarify,
    Escalate,
}

/// Flagging strictness selected by the caller.
///
/// Governs the response-confidence threshold below which a message is
/// flagged for review.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Strict,
    #[default]
    Moderate,
    Lenient,
}

impl SafetyLevel {
    /// Confidence-score threshold (0-100) below which content is flagged.
    pub fn flag_threshold(&self) -> f64 {
        match self {
            SafetyLevel::Strict => 70.0,
            SafetyLevel::Moderate => 50.0,
            SafetyLevel::Lenient => 30.0,
        }
    }
}

/// Kinds of personal data the redactor can detect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    CreditCard,
    Ssn,
    Phone,
    Email,
    Address,
}

/// Review lifecycle state of a flagged message.
///
/// `Pending` is derived from the absence of a decision row; it is never a
/// mutable column on the message itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Resolved,
}

/// One processed turn of a conversation, with its full safety metadata.
///
/// Immutable once created; the only later linkage is a decision row that
/// references it by id. `content` is always the redacted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: Role,
    /// Redacted text content. Raw input is never persisted.
    pub content: String,
    pub category: Option<SafetyCategory>,
    /// Safety-filter confidence (0-1). Only meaningful when flagged.
    pub safety_confidence: Option<f64>,
    /// Response confidence score (0-100). Assistant turns only.
    pub confidence_score: Option<f64>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub flagged: bool,
    pub pii_detected: bool,
    pub pii_types: Vec<PiiKind>,
    pub priority: Option<PriorityTier>,
    pub escalation_reason: Option<String>,
    /// Target human response time in minutes, set when flagged.
    pub target_response_minutes: Option<u32>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// A prior turn as seen by the context analyzer.
///
/// Supplied by the storage collaborator as the bounded recent window;
/// never persisted by the analyzer itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub category: Option<SafetyCategory>,
    pub confidence: Option<f64>,
    pub created_at: String,
}

/// An immutable audit record of one moderator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorDecision {
    pub id: DecisionId,
    pub message_id: MessageId,
    /// Acting moderator identity. `None` for anonymous action.
    pub moderator: Option<String>,
    pub action: ModeratorAction,
    pub original_response: Option<String>,
    /// The edited (for `edit`) or alternative (for `reject`) response.
    pub edited_response: Option<String>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub review_seconds: Option<f64>,
    pub created_at: String,
}

/// A pending moderator-queue row: the flagged user message joined with its
/// assistant reply and the safety metadata a reviewer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub message_id: MessageId,
    pub created_at: String,
    pub user_message: String,
    pub assistant_response: String,
    pub category: Option<SafetyCategory>,
    pub safety_confidence: Option<f64>,
    pub confidence_score: Option<f64>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub priority: Option<PriorityTier>,
    pub escalation_reason: Option<String>,
    pub target_response_minutes: Option<u32>,
}

/// Aggregate counters for the health endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthCounts {
    pub flagged: i64,
    pub total: i64,
    pub low_confidence: i64,
}
