// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for conversation history and the moderator queue.

use async_trait::async_trait;

use crate::error::ModeraError;
use crate::types::{
    ConversationId, ConversationTurn, HealthCounts, Message, MessageId, ModeratorDecision,
    QueueItem, ReviewState,
};

/// Persistence collaborator for the moderation pipeline.
///
/// The store guarantees read-after-write visibility: a decision written
/// through [`insert_decision`](ModerationStore::insert_decision) is visible
/// to the next [`pending_queue`](ModerationStore::pending_queue) read. No
/// stronger isolation is required; concurrent decisions on one message are
/// a tolerated last-write-wins race.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Initializes the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), ModeraError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), ModeraError>;

    /// The last `limit` turns of a conversation, oldest first.
    async fn recent_turns(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, ModeraError>;

    /// Persist a finalized message. Content must already be redacted.
    async fn insert_message(&self, message: &Message) -> Result<(), ModeraError>;

    /// Fetch a single message by id.
    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, ModeraError>;

    /// The assistant reply that followed the given user message, if any.
    async fn assistant_reply_for(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Message>, ModeraError>;

    /// Messages of a conversation in chronological order, newest `limit`.
    async fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ModeraError>;

    /// All flagged user messages with no decision row, sorted by priority
    /// tier (critical first) then newest first within a tier.
    async fn pending_queue(&self) -> Result<Vec<QueueItem>, ModeraError>;

    /// Derived review state: `Resolved` iff a decision row exists.
    async fn review_state(&self, message_id: &MessageId) -> Result<ReviewState, ModeraError>;

    /// Append a moderator decision. Decisions are append-only and never
    /// mutate the message they resolve.
    async fn insert_decision(&self, decision: &ModeratorDecision) -> Result<(), ModeraError>;

    /// Aggregate counters for the health surface.
    async fn health_counts(&self) -> Result<HealthCounts, ModeraError>;
}
