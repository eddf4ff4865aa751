// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios over the full stack: pipeline + SQLite store.

use std::sync::Arc;

use modera_config::model::StorageConfig;
use modera_core::{
    ConversationId, ModerationStore, ModeratorAction, PriorityTier, ReviewState,
    SafetyCategory,
};
use modera_filter::SafetyLexicon;
use modera_pipeline::{
    LocalGenerator, ModerationPipeline, PipelineSettings, ReviewRequest,
};
use modera_storage::SqliteStore;

async fn full_stack(dir: &tempfile::TempDir) -> ModerationPipeline {
    let db_path = dir.path().join("e2e.db");
    let store = SqliteStore::new(StorageConfig {
        database_path: db_path.to_string_lossy().into_owned(),
        wal_mode: true,
    });
    store.initialize().await.unwrap();

    let lexicon = Arc::new(SafetyLexicon::new());
    let generator = Arc::new(LocalGenerator::new(lexicon.clone()));
    ModerationPipeline::new(
        lexicon,
        generator,
        Arc::new(store),
        PipelineSettings::default(),
    )
}

#[tokio::test]
async fn crisis_turn_through_review_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = full_stack(&dir).await;

    let outcome = pipeline.process(None, "I want to die", None).await.unwrap();
    assert_eq!(outcome.category, Some(SafetyCategory::Crisis));
    assert!(outcome.flagged);
    assert!(outcome.response.contains("988"));
    let priority = outcome.priority.as_ref().unwrap();
    assert_eq!(priority.tier, PriorityTier::Critical);
    assert_eq!(priority.target_minutes, 0);

    // The flagged message is pending until a decision lands.
    let queue = pipeline.pending_queue().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(
        pipeline.review_state(&outcome.message_id).await.unwrap(),
        ReviewState::Pending
    );

    let review = pipeline
        .submit_review(
            &outcome.message_id,
            ReviewRequest {
                action: Some(ModeratorAction::Approve),
                moderator: Some("mod-1".into()),
                review_seconds: Some(42.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(review.final_response, review.original_response);

    assert_eq!(
        pipeline.review_state(&outcome.message_id).await.unwrap(),
        ReviewState::Resolved
    );
    assert!(pipeline.pending_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn history_feeds_context_across_turns() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = full_stack(&dir).await;
    let conversation = ConversationId("conv-ctx".to_string());

    pipeline
        .process(Some(conversation.clone()), "my arm hurts a little", None)
        .await
        .unwrap();
    let second = pipeline
        .process(
            Some(conversation.clone()),
            "the pain is sharp and intense now",
            None,
        )
        .await
        .unwrap();

    assert!(second.flagged);
    assert!(second.moderator_summary.contains("risk escalation"));

    // Both turns of both exchanges were persisted.
    let history = pipeline.conversation_history(&conversation, 10).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn redacted_text_is_what_reaches_storage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = full_stack(&dir).await;
    let conversation = ConversationId("conv-pii".to_string());

    let outcome = pipeline
        .process(
            Some(conversation.clone()),
            "call me at (123) 456-7890 about my SSN 123-45-6789",
            None,
        )
        .await
        .unwrap();
    assert!(outcome.pii_warning.is_some());

    let history = pipeline.conversation_history(&conversation, 10).await.unwrap();
    let user_turn = &history[0];
    assert!(!user_turn.content.contains("123-45-6789"));
    assert!(!user_turn.content.contains("456-7890"));
    assert!(user_turn.pii_detected);
}

#[tokio::test]
async fn health_counters_track_processed_turns() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = full_stack(&dir).await;

    pipeline.process(None, "What is 2+2?", None).await.unwrap();
    pipeline.process(None, "I want to die", None).await.unwrap();

    let counts = pipeline.health_counts().await.unwrap();
    assert_eq!(counts.total, 4);
    assert!(counts.flagged >= 2);
    assert!(counts.low_confidence >= 1);
}
