// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the canonical domain types.
//!
//! The canonical types are defined in `modera-core::types` for use across
//! trait boundaries. This module re-exports them and holds the shared
//! row-to-struct conversions used by the query modules.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;

pub use modera_core::types::{
    ConfidenceLevel, ConversationId, Message, MessageId, ModeratorDecision, PiiKind,
    PriorityTier, QueueItem, Role, SafetyCategory,
};

/// Parse a required enum column, surfacing bad data as a conversion error.
fn parse_column<T>(idx: usize, value: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Category column: the literal `"safe"` round-trips to `None`.
pub(crate) fn category_from_column(
    idx: usize,
    value: &str,
) -> Result<Option<SafetyCategory>, rusqlite::Error> {
    if value == "safe" {
        Ok(None)
    } else {
        parse_column(idx, value).map(Some)
    }
}

/// PII kinds column: stored as a JSON array of snake_case tags.
pub(crate) fn pii_types_from_column(
    idx: usize,
    value: Option<String>,
) -> Result<Vec<PiiKind>, rusqlite::Error> {
    match value {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

pub(crate) fn pii_types_to_column(kinds: &[PiiKind]) -> Option<String> {
    if kinds.is_empty() {
        None
    } else {
        serde_json::to_string(kinds).ok()
    }
}

/// Map a full `messages` row (columns in schema order) to a [`Message`].
pub(crate) fn message_from_row(row: &Row<'_>) -> Result<Message, rusqlite::Error> {
    let category: String = row.get(4)?;
    let confidence_level: Option<String> = row.get(7)?;
    let pii_types: Option<String> = row.get(10)?;
    let priority: Option<String> = row.get(11)?;

    Ok(Message {
        id: MessageId(row.get(0)?),
        conversation_id: ConversationId(row.get(1)?),
        role: parse_column(2, &row.get::<_, String>(2)?)?,
        content: row.get(3)?,
        category: category_from_column(4, &category)?,
        safety_confidence: row.get(5)?,
        confidence_score: row.get(6)?,
        confidence_level: confidence_level
            .map(|v| parse_column(7, &v))
            .transpose()?,
        flagged: row.get(8)?,
        pii_detected: row.get(9)?,
        pii_types: pii_types_from_column(10, pii_types)?,
        priority: priority.map(|v| parse_column(11, &v)).transpose()?,
        escalation_reason: row.get(12)?,
        target_response_minutes: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Column list matching [`message_from_row`]'s expectations.
pub(crate) const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, category, \
     safety_confidence, confidence_score, confidence_level, flagged, pii_detected, \
     pii_types, priority, escalation_reason, target_response_minutes, created_at";
