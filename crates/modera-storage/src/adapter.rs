// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ModerationStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use modera_config::model::StorageConfig;
use modera_core::{
    ConversationId, ConversationTurn, HealthCounts, Message, MessageId, ModeraError,
    ModerationStore, ModeratorDecision, QueueItem, ReviewState,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed moderation store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`ModerationStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ModeraError> {
        self.db.get().ok_or_else(|| ModeraError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ModerationStore for SqliteStore {
    async fn initialize(&self) -> Result<(), ModeraError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| ModeraError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ModeraError> {
        self.db()?.close().await
    }

    async fn recent_turns(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, ModeraError> {
        queries::messages::recent_turns(self.db()?, conversation_id, limit).await
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ModeraError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, ModeraError> {
        queries::messages::get_message(self.db()?, id).await
    }

    async fn assistant_reply_for(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Message>, ModeraError> {
        queries::messages::assistant_reply_for(self.db()?, message_id).await
    }

    async fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ModeraError> {
        queries::messages::latest_messages(self.db()?, conversation_id, limit).await
    }

    async fn pending_queue(&self) -> Result<Vec<QueueItem>, ModeraError> {
        queries::decisions::pending_queue(self.db()?).await
    }

    async fn review_state(&self, message_id: &MessageId) -> Result<ReviewState, ModeraError> {
        queries::decisions::review_state(self.db()?, message_id).await
    }

    async fn insert_decision(&self, decision: &ModeratorDecision) -> Result<(), ModeraError> {
        queries::decisions::insert_decision(self.db()?, decision).await
    }

    async fn health_counts(&self) -> Result<HealthCounts, ModeraError> {
        queries::messages::health_counts(self.db()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modera_core::Role;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.pending_queue().await.is_err());
    }

    #[tokio::test]
    async fn message_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        let message = Message {
            id: MessageId("m1".to_string()),
            conversation_id: ConversationId("c1".to_string()),
            role: Role::User,
            content: "hello".to_string(),
            category: None,
            safety_confidence: None,
            confidence_score: None,
            confidence_level: None,
            flagged: false,
            pii_detected: false,
            pii_types: Vec::new(),
            priority: None,
            escalation_reason: None,
            target_response_minutes: None,
            created_at: "2026-01-01T00:00:01Z".to_string(),
        };
        store.insert_message(&message).await.unwrap();

        let fetched = store
            .get_message(&MessageId("m1".into()))
            .await
            .unwrap()
            .expect("message should exist");
        assert_eq!(fetched.content, "hello");

        let turns = store
            .recent_turns(&ConversationId("c1".into()), 9)
            .await
            .unwrap();
        assert_eq!(turns.len(), 1);

        let counts = store.health_counts().await.unwrap();
        assert_eq!(counts.total, 1);

        store.close().await.unwrap();
    }
}
