// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over an in-memory store.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use modera_core::{
    ConfidenceLevel, ConversationId, ConversationTurn, HealthCounts, Message, MessageId,
    ModeraError, ModerationStore, ModeratorAction, ModeratorDecision, PiiKind, PriorityTier,
    QueueItem, ReviewState, Role, SafetyCategory, SafetyLevel,
};
use modera_filter::SafetyLexicon;
use modera_pipeline::{
    LocalGenerator, ModerationPipeline, PipelineSettings, ReviewRequest, CLARIFICATION_PROMPT,
    PRIVACY_RESPONSE,
};

/// Minimal in-memory store mirroring the SQLite adapter's contract.
#[derive(Default)]
struct MemoryStore {
    messages: Mutex<Vec<Message>>,
    decisions: Mutex<Vec<ModeratorDecision>>,
}

#[async_trait]
impl ModerationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), ModeraError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ModeraError> {
        Ok(())
    }

    async fn recent_turns(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, ModeraError> {
        let messages = self.messages.lock().unwrap();
        let turns: Vec<ConversationTurn> = messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .map(|m| ConversationTurn {
                role: m.role,
                content: m.content.clone(),
                category: m.category,
                confidence: m.safety_confidence,
                created_at: m.created_at.clone(),
            })
            .collect();
        let start = turns.len().saturating_sub(limit as usize);
        Ok(turns[start..].to_vec())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ModeraError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, ModeraError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }

    async fn assistant_reply_for(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Message>, ModeraError> {
        let messages = self.messages.lock().unwrap();
        let position = messages.iter().position(|m| &m.id == message_id);
        Ok(position.and_then(|idx| {
            let user = &messages[idx];
            messages[idx + 1..]
                .iter()
                .find(|m| {
                    m.conversation_id == user.conversation_id && m.role == Role::Assistant
                })
                .cloned()
        }))
    }

    async fn conversation_messages(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ModeraError> {
        let messages = self.messages.lock().unwrap();
        let all: Vec<Message> = messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        let start = all.len().saturating_sub(limit as usize);
        Ok(all[start..].to_vec())
    }

    async fn pending_queue(&self) -> Result<Vec<QueueItem>, ModeraError> {
        let messages = self.messages.lock().unwrap();
        let decisions = self.decisions.lock().unwrap();
        let mut items = Vec::new();
        for (idx, m) in messages.iter().enumerate() {
            if m.role != Role::User || !m.flagged {
                continue;
            }
            if decisions.iter().any(|d| d.message_id == m.id) {
                continue;
            }
            let reply = messages[idx + 1..]
                .iter()
                .find(|r| r.conversation_id == m.conversation_id && r.role == Role::Assistant);
            items.push(QueueItem {
                message_id: m.id.clone(),
                created_at: m.created_at.clone(),
                user_message: m.content.clone(),
                assistant_response: reply
                    .map(|r| r.content.clone())
                    .unwrap_or_else(|| "No response yet".to_string()),
                category: m.category,
                safety_confidence: m.safety_confidence,
                confidence_score: reply.and_then(|r| r.confidence_score),
                confidence_level: reply.and_then(|r| r.confidence_level),
                priority: reply.and_then(|r| r.priority),
                escalation_reason: reply.and_then(|r| r.escalation_reason.clone()),
                target_response_minutes: reply.and_then(|r| r.target_response_minutes),
            });
        }
        items.sort_by(|a, b| {
            let rank = |p: &Option<PriorityTier>| p.unwrap_or(PriorityTier::Low);
            rank(&a.priority)
                .cmp(&rank(&b.priority))
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn review_state(&self, message_id: &MessageId) -> Result<ReviewState, ModeraError> {
        let resolved = self
            .decisions
            .lock()
            .unwrap()
            .iter()
            .any(|d| &d.message_id == message_id);
        Ok(if resolved {
            ReviewState::Resolved
        } else {
            ReviewState::Pending
        })
    }

    async fn insert_decision(&self, decision: &ModeratorDecision) -> Result<(), ModeraError> {
        self.decisions.lock().unwrap().push(decision.clone());
        Ok(())
    }

    async fn health_counts(&self) -> Result<HealthCounts, ModeraError> {
        let messages = self.messages.lock().unwrap();
        Ok(HealthCounts {
            flagged: messages.iter().filter(|m| m.flagged).count() as i64,
            total: messages.len() as i64,
            low_confidence: messages
                .iter()
                .filter(|m| {
                    m.role == Role::Assistant
                        && m.confidence_score.is_some_and(|s| s < 50.0)
                })
                .count() as i64,
        })
    }
}

fn pipeline_with(settings: PipelineSettings) -> (ModerationPipeline, Arc<MemoryStore>) {
    let lexicon = Arc::new(SafetyLexicon::new());
    let store = Arc::new(MemoryStore::default());
    let generator = Arc::new(LocalGenerator::new(lexicon.clone()));
    let pipeline = ModerationPipeline::new(lexicon, generator, store.clone(), settings);
    (pipeline, store)
}

fn pipeline() -> (ModerationPipeline, Arc<MemoryStore>) {
    pipeline_with(PipelineSettings::default())
}

#[tokio::test]
async fn crisis_turn_is_critical_and_queued() {
    let (pipeline, _store) = pipeline();
    let outcome = pipeline.process(None, "I want to die", None).await.unwrap();

    assert_eq!(outcome.category, Some(SafetyCategory::Crisis));
    assert!(outcome.flagged);
    assert!(outcome.safety_confidence > 0.0 && outcome.safety_confidence <= 0.30);
    assert!(outcome.response.contains("988"), "crisis hotline expected");

    let priority = outcome.priority.expect("flagged turn must carry priority");
    assert_eq!(priority.tier, PriorityTier::Critical);
    assert_eq!(priority.target_minutes, 0);

    let queue = pipeline.pending_queue().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].priority, Some(PriorityTier::Critical));
}

#[tokio::test]
async fn factual_math_is_safe_high_confidence() {
    let (pipeline, _store) = pipeline();
    let outcome = pipeline.process(None, "What is 2+2?", None).await.unwrap();

    assert_eq!(outcome.category, None);
    assert_eq!(outcome.confidence_score, 100.0);
    assert_eq!(outcome.confidence_level, ConfidenceLevel::High);
    assert!(!outcome.flagged);
    assert_eq!(outcome.safety_confidence, 1.0);
    assert!(pipeline.pending_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn ssn_is_redacted_before_storage_and_reply_educates() {
    let (pipeline, store) = pipeline();
    let outcome = pipeline
        .process(None, "My SSN is 123-45-6789", None)
        .await
        .unwrap();

    assert_eq!(outcome.response, PRIVACY_RESPONSE);
    assert!(outcome.pii_warning.is_some());

    let stored = store.messages.lock().unwrap();
    let user_msg = stored.iter().find(|m| m.role == Role::User).unwrap();
    assert!(!user_msg.content.contains("123-45-6789"));
    assert!(user_msg.content.contains("[REDACTED]"));
    assert!(user_msg.pii_detected);
    assert_eq!(user_msg.pii_types, vec![PiiKind::Ssn]);
}

#[tokio::test]
async fn strict_level_flags_what_lenient_allows() {
    let strict_settings = PipelineSettings {
        safety_level: SafetyLevel::Strict,
        ..Default::default()
    };
    let (strict, _) = pipeline_with(strict_settings);
    let outcome = strict
        .process(None, "Which is the best color?", None)
        .await
        .unwrap();
    assert_eq!(outcome.confidence_score, 60.0);
    assert!(outcome.flagged, "60 < 70 under strict");

    let lenient_settings = PipelineSettings {
        safety_level: SafetyLevel::Lenient,
        ..Default::default()
    };
    let (lenient, _) = pipeline_with(lenient_settings);
    let outcome = lenient
        .process(None, "Which is the best color?", None)
        .await
        .unwrap();
    assert_eq!(outcome.confidence_score, 60.0);
    assert!(!outcome.flagged, "60 >= 30 under lenient");
}

#[tokio::test]
async fn empty_message_is_rejected_before_any_processing() {
    let (pipeline, store) = pipeline();
    let err = pipeline.process(None, "   ", None).await.unwrap_err();
    assert!(matches!(err, ModeraError::InvalidInput(_)));
    assert!(store.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn medical_escalation_across_turns_flags_context() {
    let (pipeline, _store) = pipeline();
    let conversation = ConversationId("conv-esc".to_string());

    let first = pipeline
        .process(Some(conversation.clone()), "my arm hurts a little", None)
        .await
        .unwrap();
    assert_eq!(first.category, Some(SafetyCategory::Medical));

    let second = pipeline
        .process(
            Some(conversation),
            "the pain is sharp and intense now",
            None,
        )
        .await
        .unwrap();
    assert!(second.flagged);
    assert!(
        second.moderator_summary.contains("risk escalation"),
        "summary was: {}",
        second.moderator_summary
    );
}

#[tokio::test]
async fn review_lifecycle_resolves_and_leaves_queue() {
    let (pipeline, _store) = pipeline();
    let outcome = pipeline.process(None, "I want to die", None).await.unwrap();
    let message_id = outcome.message_id.clone();

    assert_eq!(
        pipeline.review_state(&message_id).await.unwrap(),
        ReviewState::Pending
    );

    // Edit without the replacement text is rejected up front.
    let bad = ReviewRequest {
        action: Some(ModeratorAction::Edit),
        ..Default::default()
    };
    assert!(pipeline.submit_review(&message_id, bad).await.is_err());
    assert_eq!(pipeline.pending_queue().await.unwrap().len(), 1);

    // A valid edit resolves the item.
    let edit = ReviewRequest {
        action: Some(ModeratorAction::Edit),
        edited_response: Some("a reviewed reply".into()),
        moderator: Some("mod-1".into()),
        ..Default::default()
    };
    let review = pipeline.submit_review(&message_id, edit).await.unwrap();
    assert_eq!(review.final_response, "a reviewed reply");

    assert_eq!(
        pipeline.review_state(&message_id).await.unwrap(),
        ReviewState::Resolved
    );
    assert!(pipeline.pending_queue().await.unwrap().is_empty());

    // Decisions are append-only: a second action still succeeds and the
    // message stays out of the queue.
    let approve = ReviewRequest {
        action: Some(ModeratorAction::Approve),
        ..Default::default()
    };
    let second = pipeline.submit_review(&message_id, approve).await.unwrap();
    assert_ne!(second.decision_id, review.decision_id);
    assert!(pipeline.pending_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn clarify_substitutes_fixed_prompt() {
    let (pipeline, _store) = pipeline();
    let outcome = pipeline
        .process(None, "should I take this medicine?", None)
        .await
        .unwrap();
    assert!(outcome.flagged);

    let clarify = ReviewRequest {
        action: Some(ModeratorAction::Clarify),
        ..Default::default()
    };
    let review = pipeline
        .submit_review(&outcome.message_id, clarify)
        .await
        .unwrap();
    assert_eq!(review.final_response, CLARIFICATION_PROMPT);
}

#[tokio::test]
async fn queue_orders_by_priority_then_newest() {
    let (pipeline, _store) = pipeline();

    // Low-ish priority: flagged by low confidence only.
    pipeline
        .process(None, "should I repaint the fence?", None)
        .await
        .unwrap();
    // Critical: crisis.
    pipeline.process(None, "I want to die", None).await.unwrap();
    // High: medical.
    pipeline
        .process(None, "which medicine helps a headache?", None)
        .await
        .unwrap();

    let queue = pipeline.pending_queue().await.unwrap();
    assert_eq!(queue.len(), 3);
    assert_eq!(queue[0].priority, Some(PriorityTier::Critical));
    assert_eq!(queue[1].priority, Some(PriorityTier::High));
    let tail_rank = queue[2].priority.unwrap_or(PriorityTier::Low);
    assert!(tail_rank > PriorityTier::High);
}

#[tokio::test]
async fn learning_mode_attaches_educational_analysis() {
    let settings = PipelineSettings {
        learning_mode: true,
        ..Default::default()
    };
    let (configured, _store) = pipeline_with(settings);
    let outcome = configured
        .process(None, "which medicine helps a headache?", None)
        .await
        .unwrap();
    let analysis = outcome.learning_analysis.expect("learning analysis expected");
    assert_eq!(analysis.risk_category, "Medical");
    assert!(analysis
        .triggered_guardrails
        .contains(&"medical_advice_detection".to_string()));

    let (plain, _store) = pipeline();
    let outcome = plain
        .process(None, "which medicine helps a headache?", None)
        .await
        .unwrap();
    assert!(outcome.learning_analysis.is_none());
}

#[tokio::test]
async fn transparency_toggle_governs_guardrail_explanation() {
    let (pipeline, _store) = pipeline();
    let outcome = pipeline
        .process(None, "which medicine helps a headache?", None)
        .await
        .unwrap();
    assert!(outcome
        .guardrail_explanation
        .as_deref()
        .is_some_and(|e| e.contains("Medical")));

    let silent_settings = PipelineSettings {
        transparency: false,
        ..Default::default()
    };
    let (silent, _store) = pipeline_with(silent_settings);
    let outcome = silent
        .process(None, "which medicine helps a headache?", None)
        .await
        .unwrap();
    assert!(outcome.guardrail_explanation.is_none());
}
