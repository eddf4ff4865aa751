// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderator decision records and the pending-queue view.
//!
//! Decisions are append-only. The pending queue is derived: flagged user
//! messages with no decision row, never a mutable state column.

use rusqlite::params;

use modera_core::{
    DecisionId, MessageId, ModeraError, ModeratorDecision, QueueItem, ReviewState,
};

use crate::database::Database;
use crate::models::category_from_column;

/// Append a moderator decision.
pub async fn insert_decision(
    db: &Database,
    decision: &ModeratorDecision,
) -> Result<(), ModeraError> {
    let decision = decision.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO moderator_decisions (id, message_id, moderator, action,
                     original_response, edited_response, rejection_reason, notes,
                     review_seconds, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    decision.id.0,
                    decision.message_id.0,
                    decision.moderator,
                    decision.action.to_string(),
                    decision.original_response,
                    decision.edited_response,
                    decision.rejection_reason,
                    decision.notes,
                    decision.review_seconds,
                    decision.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Derived review state: resolved iff any decision row exists.
pub async fn review_state(
    db: &Database,
    message_id: &MessageId,
) -> Result<ReviewState, ModeraError> {
    let message_id = message_id.0.clone();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM moderator_decisions WHERE message_id = ?1",
                params![message_id],
                |r| r.get(0),
            )?;
            Ok(if count > 0 {
                ReviewState::Resolved
            } else {
                ReviewState::Pending
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All decisions recorded for a message, oldest first.
pub async fn decisions_for_message(
    db: &Database,
    message_id: &MessageId,
) -> Result<Vec<ModeratorDecision>, ModeraError> {
    let message_id = message_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, message_id, moderator, action, original_response,
                        edited_response, rejection_reason, notes, review_seconds, created_at
                 FROM moderator_decisions WHERE message_id = ?1 ORDER BY rowid ASC",
            )?;
            let rows = stmt.query_map(params![message_id], |row| {
                let action: String = row.get(3)?;
                Ok(ModeratorDecision {
                    id: DecisionId(row.get(0)?),
                    message_id: MessageId(row.get(1)?),
                    moderator: row.get(2)?,
                    action: action.parse().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            3,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    original_response: row.get(4)?,
                    edited_response: row.get(5)?,
                    rejection_reason: row.get(6)?,
                    notes: row.get(7)?,
                    review_seconds: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?;
            let mut decisions = Vec::new();
            for row in rows {
                decisions.push(row?);
            }
            Ok(decisions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flagged user messages with no decision row, joined with their assistant
/// replies, sorted by priority tier (critical first) then newest first.
pub async fn pending_queue(db: &Database) -> Result<Vec<QueueItem>, ModeraError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.created_at, m.content, m.category, m.safety_confidence,
                        a.content, a.confidence_score, a.confidence_level,
                        a.priority, a.escalation_reason, a.target_response_minutes
                 FROM messages m
                 LEFT JOIN messages a ON a.rowid = (
                     SELECT MIN(r.rowid) FROM messages r
                     WHERE r.conversation_id = m.conversation_id
                       AND r.role = 'assistant'
                       AND r.rowid > m.rowid)
                 WHERE m.role = 'user'
                   AND m.flagged = 1
                   AND NOT EXISTS (
                       SELECT 1 FROM moderator_decisions d WHERE d.message_id = m.id)
                 ORDER BY CASE COALESCE(a.priority, 'low')
                              WHEN 'critical' THEN 0
                              WHEN 'high' THEN 1
                              WHEN 'medium' THEN 2
                              ELSE 3
                          END,
                          m.created_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                let category: String = row.get(3)?;
                let confidence_level: Option<String> = row.get(7)?;
                let priority: Option<String> = row.get(8)?;
                Ok(QueueItem {
                    message_id: MessageId(row.get(0)?),
                    created_at: row.get(1)?,
                    user_message: row.get(2)?,
                    assistant_response: row
                        .get::<_, Option<String>>(5)?
                        .unwrap_or_else(|| "No response yet".to_string()),
                    category: category_from_column(3, &category)?,
                    safety_confidence: row.get(4)?,
                    confidence_score: row.get(6)?,
                    confidence_level: confidence_level
                        .map(|v| {
                            v.parse().map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    7,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })
                        })
                        .transpose()?,
                    priority: priority
                        .map(|v| {
                            v.parse().map_err(|e| {
                                rusqlite::Error::FromSqlConversionFailure(
                                    8,
                                    rusqlite::types::Type::Text,
                                    Box::new(e),
                                )
                            })
                        })
                        .transpose()?,
                    escalation_reason: row.get(9)?,
                    target_response_minutes: row.get(10)?,
                })
            })?;
            let mut items = Vec::new();
            for row in rows {
                items.push(row?);
            }
            Ok(items)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::insert_message;
    use modera_core::{
        ConversationId, Message, ModeratorAction, PriorityTier, Role, SafetyCategory,
    };
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn flagged_user(id: &str, conv: &str, priority_on_reply: Option<PriorityTier>, ts: &str) -> (Message, Message) {
        let user = Message {
            id: MessageId(id.to_string()),
            conversation_id: ConversationId(conv.to_string()),
            role: Role::User,
            content: format!("flagged content {id}"),
            category: Some(SafetyCategory::Medical),
            safety_confidence: Some(0.65),
            confidence_score: None,
            confidence_level: None,
            flagged: true,
            pii_detected: false,
            pii_types: Vec::new(),
            priority: None,
            escalation_reason: None,
            target_response_minutes: None,
            created_at: ts.to_string(),
        };
        let reply = Message {
            id: MessageId(format!("{id}-reply")),
            conversation_id: ConversationId(conv.to_string()),
            role: Role::Assistant,
            content: format!("reply to {id}"),
            category: Some(SafetyCategory::Medical),
            safety_confidence: Some(0.65),
            confidence_score: Some(30.0),
            confidence_level: None,
            flagged: true,
            pii_detected: false,
            pii_types: Vec::new(),
            priority: priority_on_reply,
            escalation_reason: Some("reason".to_string()),
            target_response_minutes: Some(5),
            created_at: ts.to_string(),
        };
        (user, reply)
    }

    fn decision(id: &str, message_id: &str, action: ModeratorAction) -> ModeratorDecision {
        ModeratorDecision {
            id: DecisionId(id.to_string()),
            message_id: MessageId(message_id.to_string()),
            moderator: Some("mod-1".to_string()),
            action,
            original_response: Some("original".to_string()),
            edited_response: None,
            rejection_reason: None,
            notes: None,
            review_seconds: Some(12.5),
            created_at: "2026-01-01T00:00:10Z".to_string(),
        }
    }

    #[tokio::test]
    async fn queue_lists_undecided_flagged_messages_only() {
        let (db, _dir) = setup_db().await;

        let (u1, a1) = flagged_user("u1", "c1", Some(PriorityTier::High), "2026-01-01T00:00:01Z");
        insert_message(&db, &u1).await.unwrap();
        insert_message(&db, &a1).await.unwrap();

        let (u2, a2) = flagged_user("u2", "c2", Some(PriorityTier::High), "2026-01-01T00:00:02Z");
        insert_message(&db, &u2).await.unwrap();
        insert_message(&db, &a2).await.unwrap();

        assert_eq!(pending_queue(&db).await.unwrap().len(), 2);

        insert_decision(&db, &decision("d1", "u1", ModeratorAction::Approve))
            .await
            .unwrap();

        let queue = pending_queue(&db).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].message_id.0, "u2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_sorts_by_priority_then_newest() {
        let (db, _dir) = setup_db().await;

        let (u1, a1) = flagged_user("u1", "c1", Some(PriorityTier::Medium), "2026-01-01T00:00:01Z");
        let (u2, a2) = flagged_user("u2", "c2", Some(PriorityTier::Critical), "2026-01-01T00:00:02Z");
        let (u3, a3) = flagged_user("u3", "c3", Some(PriorityTier::Medium), "2026-01-01T00:00:03Z");
        for (u, a) in [(u1, a1), (u2, a2), (u3, a3)] {
            insert_message(&db, &u).await.unwrap();
            insert_message(&db, &a).await.unwrap();
        }

        let queue = pending_queue(&db).await.unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue[0].message_id.0, "u2", "critical first");
        // Within the medium tier, newest first.
        assert_eq!(queue[1].message_id.0, "u3");
        assert_eq!(queue[2].message_id.0, "u1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_item_carries_reply_metadata() {
        let (db, _dir) = setup_db().await;

        let (u1, a1) = flagged_user("u1", "c1", Some(PriorityTier::High), "2026-01-01T00:00:01Z");
        insert_message(&db, &u1).await.unwrap();
        insert_message(&db, &a1).await.unwrap();

        let queue = pending_queue(&db).await.unwrap();
        let item = &queue[0];
        assert_eq!(item.assistant_response, "reply to u1");
        assert_eq!(item.confidence_score, Some(30.0));
        assert_eq!(item.priority, Some(PriorityTier::High));
        assert_eq!(item.escalation_reason.as_deref(), Some("reason"));
        assert_eq!(item.target_response_minutes, Some(5));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_item_without_reply_says_so() {
        let (db, _dir) = setup_db().await;

        let (u1, _) = flagged_user("u1", "c1", None, "2026-01-01T00:00:01Z");
        insert_message(&db, &u1).await.unwrap();

        let queue = pending_queue(&db).await.unwrap();
        assert_eq!(queue[0].assistant_response, "No response yet");
        assert_eq!(queue[0].priority, None);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn decided_message_never_reappears() {
        let (db, _dir) = setup_db().await;

        let (u1, a1) = flagged_user("u1", "c1", Some(PriorityTier::High), "2026-01-01T00:00:01Z");
        insert_message(&db, &u1).await.unwrap();
        insert_message(&db, &a1).await.unwrap();

        assert_eq!(
            review_state(&db, &MessageId("u1".into())).await.unwrap(),
            ReviewState::Pending
        );

        insert_decision(&db, &decision("d1", "u1", ModeratorAction::Edit))
            .await
            .unwrap();
        assert_eq!(
            review_state(&db, &MessageId("u1".into())).await.unwrap(),
            ReviewState::Resolved
        );
        assert!(pending_queue(&db).await.unwrap().is_empty());

        // Append-only: a second decision coexists with the first.
        insert_decision(&db, &decision("d2", "u1", ModeratorAction::Approve))
            .await
            .unwrap();
        let history = decisions_for_message(&db, &MessageId("u1".into()))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, ModeratorAction::Edit);
        assert_eq!(history[1].action, ModeratorAction::Approve);
        assert!(pending_queue(&db).await.unwrap().is_empty());

        db.close().await.unwrap();
    }
}
