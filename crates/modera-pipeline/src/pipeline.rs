// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline orchestration: one entry point per conversational turn.
//!
//! raw message -> PII redaction -> classification -> context analysis ->
//! generation -> confidence scoring -> flag aggregation -> priority ->
//! persistence. Redaction runs first; nothing downstream (storage,
//! logging, generation) ever sees the unredacted text.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use modera_core::{
    category_label, ConfidenceLevel, ConversationId, DecisionId, HealthCounts, Message,
    MessageId, ModeraError, ModerationStore, ModeratorDecision, PiiKind, QueueItem,
    ResponseGenerator, ReviewState, Role, SafetyCategory, SafetyLevel,
};
use modera_filter::{
    score_response, ContextAnalyzer, PriorityDecision, PriorityInput, PriorityResolver,
    SafetyClassifier, SafetyLexicon, HISTORY_WINDOW, UNCERTAINTY_DISCLOSURE,
};
use modera_redact::redact_pii;

use crate::aggregate::{apply_context_signals, decide_flag};
use crate::generate::CRISIS_RESPONSE;
use crate::learning::{build_learning_analysis, LearningAnalysis};
use crate::review::{resolve_action, ReviewRequest};

/// Per-turn pipeline settings, usually sourced from configuration and
/// optionally overridden per caller.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub safety_level: SafetyLevel,
    /// Produce a guardrail explanation string for flagged turns.
    pub transparency: bool,
    /// Produce the full educational breakdown.
    pub learning_mode: bool,
    /// Governs persistence; crisis content is always persisted.
    pub data_logging: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            safety_level: SafetyLevel::Moderate,
            transparency: true,
            learning_mode: false,
            data_logging: false,
        }
    }
}

/// Everything the caller gets back for one processed turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub response: String,
    pub category: Option<SafetyCategory>,
    /// Safety-filter confidence; 1.0 when the message was not flagged by
    /// the classifier.
    pub safety_confidence: f64,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub confidence_reasons: Vec<String>,
    pub flagged: bool,
    pub moderator_summary: String,
    pub pii_warning: Option<String>,
    pub priority: Option<PriorityDecision>,
    pub guardrail_explanation: Option<String>,
    pub learning_analysis: Option<LearningAnalysis>,
}

/// Result of submitting a moderator decision.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub decision_id: DecisionId,
    pub message_id: MessageId,
    pub original_response: String,
    pub final_response: String,
}

/// The assembled moderation pipeline.
///
/// All analyzer stages are pure; the only suspension points are the
/// external generator call and storage I/O, so one instance may serve any
/// number of concurrent request contexts.
pub struct ModerationPipeline {
    classifier: SafetyClassifier,
    context: ContextAnalyzer,
    priority: PriorityResolver,
    generator: Arc<dyn ResponseGenerator>,
    store: Arc<dyn ModerationStore>,
    defaults: PipelineSettings,
}

impl ModerationPipeline {
    pub fn new(
        lexicon: Arc<SafetyLexicon>,
        generator: Arc<dyn ResponseGenerator>,
        store: Arc<dyn ModerationStore>,
        defaults: PipelineSettings,
    ) -> Self {
        Self {
            classifier: SafetyClassifier::new(lexicon.clone()),
            context: ContextAnalyzer::new(lexicon.clone()),
            priority: PriorityResolver::new(lexicon),
            generator,
            store,
            defaults,
        }
    }

    /// Process one user turn end to end.
    ///
    /// Within one conversation, callers must invoke this in arrival order;
    /// the context analyzer depends on correctly ordered history.
    pub async fn process(
        &self,
        conversation_id: Option<ConversationId>,
        raw_message: &str,
        overrides: Option<PipelineSettings>,
    ) -> Result<ChatOutcome, ModeraError> {
        let trimmed = raw_message.trim();
        if trimmed.is_empty() {
            return Err(ModeraError::InvalidInput("message cannot be empty".into()));
        }

        let settings = overrides.unwrap_or(self.defaults);
        let conversation_id =
            conversation_id.unwrap_or_else(|| ConversationId(Uuid::new_v4().to_string()));

        // Redact before anything else observes the text.
        let redaction = redact_pii(trimmed);
        let text = redaction.text.clone();

        // History fetch failure degrades to an empty window rather than
        // failing the turn; the recovery is observable in the logs only.
        let history = match self
            .store
            .recent_turns(&conversation_id, HISTORY_WINDOW as i64)
            .await
        {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, conversation = %conversation_id.0, "history fetch failed, continuing with empty context");
                Vec::new()
            }
        };

        let classification = self.classifier.classify(&text);
        let context = self.context.analyze(
            &history,
            &text,
            classification.category,
            if classification.category.is_some() {
                classification.confidence
            } else {
                0.0
            },
        );

        let (classification, classifier_flagged) =
            apply_context_signals(classification, &context);
        let category = classification.category;

        if category == Some(SafetyCategory::Crisis) {
            warn!(conversation = %conversation_id.0, "crisis content detected");
        }

        // Crisis replies are produced locally before any external call.
        let response = if category == Some(SafetyCategory::Crisis) {
            CRISIS_RESPONSE.to_string()
        } else {
            self.generator
                .generate(&text, category, &redaction.detected)
                .await?
        };

        let report = score_response(&text, &response, category);
        let mut confidence_reasons = report.reasons;

        let outcome = decide_flag(
            classifier_flagged,
            category,
            report.score,
            settings.safety_level,
            &context,
            &text,
        );
        let confidence_score = outcome.adjusted_score;
        let confidence_level = ConfidenceLevel::from_score(confidence_score);

        // The risk penalty can push an otherwise-confident score under the
        // disclosure line; make sure the reason is present either way.
        if confidence_score < 30.0
            && !confidence_reasons.iter().any(|r| r == UNCERTAINTY_DISCLOSURE)
        {
            confidence_reasons.push(UNCERTAINTY_DISCLOSURE.into());
        }

        let priority = outcome.flagged.then(|| {
            self.priority.resolve(PriorityInput {
                category,
                safety_confidence: classification.confidence,
                content: &text,
                confidence_score,
            })
        });
        if let Some(p) = &priority {
            debug!(tier = %p.tier, reason = %p.reason, target_minutes = p.target_minutes, "priority resolved");
        }

        let guardrail_explanation =
            self.explain_guardrail(&settings, &outcome, category, confidence_score);

        let learning_analysis = settings.learning_mode.then(|| {
            build_learning_analysis(
                &text,
                category,
                confidence_score,
                &confidence_reasons,
                &redaction.detected,
                &context,
            )
        });

        let (user_message_id, _) = self
            .persist_turn(
                &settings,
                &conversation_id,
                &text,
                &response,
                category,
                &classification,
                classifier_flagged,
                &outcome,
                confidence_score,
                confidence_level,
                &priority,
                &redaction.detected,
            )
            .await?;

        Ok(ChatOutcome {
            conversation_id,
            message_id: user_message_id,
            response,
            category,
            safety_confidence: if classifier_flagged {
                classification.confidence
            } else {
                1.0
            },
            confidence_score,
            confidence_level,
            confidence_reasons,
            flagged: outcome.flagged,
            moderator_summary: outcome.moderator_summary,
            pii_warning: redaction.warning().map(String::from),
            priority,
            guardrail_explanation,
            learning_analysis,
        })
    }

    fn explain_guardrail(
        &self,
        settings: &PipelineSettings,
        outcome: &crate::aggregate::FlagOutcome,
        category: Option<SafetyCategory>,
        confidence_score: f64,
    ) -> Option<String> {
        if !settings.transparency || !(outcome.flagged || category.is_some()) {
            return None;
        }
        if let Some(cat) = category {
            let mut name = cat.to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            Some(format!(
                "Guardrail triggered: {name} content detected. This query was flagged for review to ensure appropriate handling."
            ))
        } else if outcome.confidence_flagged {
            Some(format!(
                "Guardrail triggered: Low confidence response ({confidence_score:.0}%). This response may be inaccurate or uncertain."
            ))
        } else {
            None
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_turn(
        &self,
        settings: &PipelineSettings,
        conversation_id: &ConversationId,
        text: &str,
        response: &str,
        category: Option<SafetyCategory>,
        classification: &modera_filter::Classification,
        classifier_flagged: bool,
        outcome: &crate::aggregate::FlagOutcome,
        confidence_score: f64,
        confidence_level: ConfidenceLevel,
        priority: &Option<PriorityDecision>,
        pii_types: &[PiiKind],
    ) -> Result<(MessageId, MessageId), ModeraError> {
        // Crisis is always persisted. For everything else the data_logging
        // toggle is currently overridden: context analysis reads history
        // from storage, so skipping persistence would blind the analyzer.
        // TODO: keep an in-memory context window so disabled data_logging
        // can actually skip persistence for non-crisis turns.
        let _ = settings.data_logging;
        let store_messages = true;

        let user_message_id = MessageId(Uuid::new_v4().to_string());
        let assistant_message_id = MessageId(Uuid::new_v4().to_string());

        if store_messages {
            let now = chrono::Utc::now().to_rfc3339();
            let user_message = Message {
                id: user_message_id.clone(),
                conversation_id: conversation_id.clone(),
                role: Role::User,
                content: text.to_string(),
                category,
                safety_confidence: classifier_flagged.then_some(classification.confidence),
                confidence_score: None,
                confidence_level: None,
                flagged: classifier_flagged,
                pii_detected: !pii_types.is_empty(),
                pii_types: pii_types.to_vec(),
                priority: None,
                escalation_reason: None,
                target_response_minutes: None,
                created_at: now.clone(),
            };
            self.store.insert_message(&user_message).await?;

            let assistant_message = Message {
                id: assistant_message_id.clone(),
                conversation_id: conversation_id.clone(),
                role: Role::Assistant,
                content: response.to_string(),
                category,
                safety_confidence: classifier_flagged.then_some(classification.confidence),
                confidence_score: Some(confidence_score),
                confidence_level: Some(confidence_level),
                flagged: outcome.flagged,
                pii_detected: false,
                pii_types: Vec::new(),
                priority: priority.as_ref().map(|p| p.tier),
                escalation_reason: priority.as_ref().map(|p| p.reason.clone()),
                target_response_minutes: priority.as_ref().map(|p| p.target_minutes),
                created_at: now,
            };
            self.store.insert_message(&assistant_message).await?;
            debug!(conversation = %conversation_id.0, category = %category_label(category), flagged = outcome.flagged, "turn persisted");
        }

        Ok((user_message_id, assistant_message_id))
    }

    /// Pending moderator queue, sorted per the review contract.
    pub async fn pending_queue(&self) -> Result<Vec<QueueItem>, ModeraError> {
        self.store.pending_queue().await
    }

    /// Submit a moderator decision for a flagged message.
    ///
    /// Writes are append-only; a concurrent double-decision on one message
    /// is tolerated with last-write-wins semantics.
    pub async fn submit_review(
        &self,
        message_id: &MessageId,
        request: ReviewRequest,
    ) -> Result<ReviewOutcome, ModeraError> {
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| ModeraError::NotFound {
                what: "message".into(),
                id: message_id.0.clone(),
            })?;

        let original_response = match self.store.assistant_reply_for(message_id).await? {
            Some(reply) => reply.content,
            None => message.content.clone(),
        };

        let resolution = resolve_action(&request, &original_response)?;

        let decision = ModeratorDecision {
            id: DecisionId(Uuid::new_v4().to_string()),
            message_id: message_id.clone(),
            moderator: request.moderator.clone(),
            action: resolution.action,
            original_response: Some(original_response.clone()),
            edited_response: resolution.edited_response.clone(),
            rejection_reason: request.rejection_reason.clone(),
            notes: request.notes.clone(),
            review_seconds: request.review_seconds,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store.insert_decision(&decision).await?;
        debug!(message = %message_id.0, action = %resolution.action, "moderator decision recorded");

        Ok(ReviewOutcome {
            decision_id: decision.id,
            message_id: message_id.clone(),
            original_response,
            final_response: resolution.final_response,
        })
    }

    /// Derived review state for a message.
    pub async fn review_state(&self, message_id: &MessageId) -> Result<ReviewState, ModeraError> {
        self.store.review_state(message_id).await
    }

    /// Chronological message history for a conversation.
    pub async fn conversation_history(
        &self,
        conversation_id: &ConversationId,
        limit: i64,
    ) -> Result<Vec<Message>, ModeraError> {
        self.store.conversation_messages(conversation_id, limit).await
    }

    /// Aggregate counters for the health surface.
    pub async fn health_counts(&self) -> Result<HealthCounts, ModeraError> {
        self.store.health_counts().await
    }
}
