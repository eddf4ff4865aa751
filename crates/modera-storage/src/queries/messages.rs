// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::params;

use modera_core::{
    category_label, ConversationId, ConversationTurn, HealthCounts, Message, MessageId,
    ModeraError,
};

use crate::database::Database;
use crate::models::{message_from_row, pii_types_to_column, MESSAGE_COLUMNS};

/// Insert a new message. Content must already be redacted.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ModeraError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, conversation_id, role, content, category,
                     safety_confidence, confidence_score, confidence_level, flagged,
                     pii_detected, pii_types, priority, escalation_reason,
                     target_response_minutes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    msg.id.0,
                    msg.conversation_id.0,
                    msg.role.to_string(),
                    msg.content,
                    category_label(msg.category),
                    msg.safety_confidence,
                    msg.confidence_score,
                    msg.confidence_level.map(|l| l.to_string()),
                    msg.flagged,
                    msg.pii_detected,
                    pii_types_to_column(&msg.pii_types),
                    msg.priority.map(|p| p.to_string()),
                    msg.escalation_reason,
                    msg.target_response_minutes,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a single message by id.
pub async fn get_message(db: &Database, id: &MessageId) -> Result<Option<Message>, ModeraError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], message_from_row);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The last `limit` turns of a conversation, oldest first, as context input.
pub async fn recent_turns(
    db: &Database,
    conversation_id: &ConversationId,
    limit: i64,
) -> Result<Vec<ConversationTurn>, ModeraError> {
    let messages = latest_messages(db, conversation_id, limit).await?;
    Ok(messages
        .into_iter()
        .map(|m| ConversationTurn {
            role: m.role,
            content: m.content,
            category: m.category,
            confidence: m.safety_confidence,
            created_at: m.created_at,
        })
        .collect())
}

/// The newest `limit` messages of a conversation in chronological order.
pub async fn latest_messages(
    db: &Database,
    conversation_id: &ConversationId,
    limit: i64,
) -> Result<Vec<Message>, ModeraError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            // Newest-first from the query; flip to chronological.
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The assistant reply that directly followed the given user message.
///
/// Insertion order (rowid) breaks ties between same-timestamp rows.
pub async fn assistant_reply_for(
    db: &Database,
    message_id: &MessageId,
) -> Result<Option<Message>, ModeraError> {
    let message_id = message_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE role = 'assistant'
                   AND conversation_id = (SELECT conversation_id FROM messages WHERE id = ?1)
                   AND rowid > (SELECT rowid FROM messages WHERE id = ?1)
                 ORDER BY rowid ASC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![message_id], message_from_row);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate counters for the health surface.
pub async fn health_counts(db: &Database) -> Result<HealthCounts, ModeraError> {
    db.connection()
        .call(|conn| {
            let flagged: i64 =
                conn.query_row("SELECT COUNT(*) FROM messages WHERE flagged = 1", [], |r| {
                    r.get(0)
                })?;
            let total: i64 =
                conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?;
            let low_confidence: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE role = 'assistant' AND confidence_score < 50.0",
                [],
                |r| r.get(0),
            )?;
            Ok(HealthCounts {
                flagged,
                total,
                low_confidence,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}
