// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/chat, the moderator queue endpoints, conversation
//! history, confidence examples, and health. All reads are idempotent;
//! decision submission is the only mutating moderator endpoint.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use modera_core::{
    category_label, ConversationId, MessageId, ModeraError, ModeratorAction, QueueItem, Role,
    SafetyLevel,
};
use modera_pipeline::{LearningAnalysis, PipelineSettings, ReviewRequest};

use crate::server::GatewayState;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Raw message text. Redacted before any processing or storage.
    pub message: String,
    /// Optional conversation to continue; a new one is created otherwise.
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Optional per-request settings override.
    #[serde(default)]
    pub settings: Option<SettingsOverride>,
}

/// Per-request pipeline settings override.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsOverride {
    #[serde(default)]
    pub safety_level: Option<SafetyLevel>,
    #[serde(default)]
    pub transparency: Option<bool>,
    #[serde(default)]
    pub learning_mode: Option<bool>,
    #[serde(default)]
    pub data_logging: Option<bool>,
}

impl SettingsOverride {
    fn merge_into(&self, base: PipelineSettings) -> PipelineSettings {
        PipelineSettings {
            safety_level: self.safety_level.unwrap_or(base.safety_level),
            transparency: self.transparency.unwrap_or(base.transparency),
            learning_mode: self.learning_mode.unwrap_or(base.learning_mode),
            data_logging: self.data_logging.unwrap_or(base.data_logging),
        }
    }
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub category: String,
    pub confidence: f64,
    pub confidence_score: f64,
    pub confidence_level: String,
    pub confidence_reasons: Vec<String>,
    pub flagged: bool,
    pub message_for_moderator: String,
    pub conversation_id: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_response_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrail_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_analysis: Option<LearningAnalysis>,
}

/// Request body for POST /v1/moderator/queue/{id}/action.
#[derive(Debug, Deserialize)]
pub struct ModeratorActionRequest {
    /// approve, reject, edit, clarify, or escalate.
    pub action: String,
    #[serde(default)]
    pub edited_response: Option<String>,
    #[serde(default)]
    pub alternative_response: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub review_time_seconds: Option<f64>,
    #[serde(default)]
    pub moderator: Option<String>,
}

/// Response body for a recorded moderator action.
#[derive(Debug, Serialize)]
pub struct ModeratorActionResponse {
    pub message: String,
    pub id: String,
    pub decision_id: String,
    pub original_response: String,
    pub final_response: String,
}

/// One message of a conversation history listing.
#[derive(Debug, Serialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: String,
}

/// Response body for GET /v1/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub flagged_count: i64,
    pub total_messages: i64,
    pub low_confidence_responses: i64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: ModeraError) -> Response {
    let status = match &err {
        ModeraError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ModeraError::NotFound { .. } => StatusCode::NOT_FOUND,
        ModeraError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// POST /v1/chat
///
/// Runs the full moderation pipeline on one user turn.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let conversation_id = body.conversation_id.map(ConversationId);
    let overrides = body
        .settings
        .map(|s| s.merge_into(state.default_settings));

    match state
        .pipeline
        .process(conversation_id, &body.message, overrides)
        .await
    {
        Ok(outcome) => {
            let response = ChatResponse {
                response: outcome.response,
                category: category_label(outcome.category),
                confidence: outcome.safety_confidence,
                confidence_score: outcome.confidence_score,
                confidence_level: outcome.confidence_level.to_string(),
                confidence_reasons: outcome.confidence_reasons,
                flagged: outcome.flagged,
                message_for_moderator: outcome.moderator_summary,
                conversation_id: outcome.conversation_id.0,
                message_id: outcome.message_id.0,
                pii_warning: outcome.pii_warning,
                priority_level: outcome.priority.as_ref().map(|p| p.tier.to_string()),
                escalation_reason: outcome.priority.as_ref().map(|p| p.reason.clone()),
                target_response_time: outcome.priority.as_ref().map(|p| p.target_minutes),
                guardrail_explanation: outcome.guardrail_explanation,
                learning_analysis: outcome.learning_analysis,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// GET /v1/moderator/queue
///
/// Pending flagged messages, critical first, newest first within a tier.
pub async fn get_moderator_queue(State(state): State<GatewayState>) -> Response {
    match state.pipeline.pending_queue().await {
        Ok(items) => {
            let items: Vec<_> = items.into_iter().map(queue_item_json).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn queue_item_json(item: QueueItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.message_id.0,
        "timestamp": item.created_at,
        "user_message": item.user_message,
        "ai_response": item.assistant_response,
        "category": category_label(item.category),
        "confidence": item.safety_confidence,
        "confidence_score": item.confidence_score,
        "confidence_level": item.confidence_level.map(|l| l.to_string()),
        "priority_level": item.priority.map(|p| p.to_string()),
        "escalation_reason": item.escalation_reason,
        "target_response_time": item.target_response_minutes,
    })
}

/// POST /v1/moderator/queue/{id}/action
///
/// Records a moderator decision. The only non-idempotent moderator
/// endpoint; decisions are append-only.
pub async fn post_moderator_action(
    State(state): State<GatewayState>,
    Path(message_id): Path<String>,
    Json(body): Json<ModeratorActionRequest>,
) -> Response {
    let action = match ModeratorAction::from_str(&body.action) {
        Ok(action) => action,
        Err(_) => {
            return error_response(ModeraError::InvalidInput(format!(
                "unknown action: {}",
                body.action
            )));
        }
    };

    let request = ReviewRequest {
        action: Some(action),
        edited_response: body.edited_response,
        alternative_response: body.alternative_response,
        rejection_reason: body.rejection_reason,
        notes: body.notes,
        review_seconds: body.review_time_seconds,
        moderator: body.moderator,
    };

    match state
        .pipeline
        .submit_review(&MessageId(message_id.clone()), request)
        .await
    {
        Ok(outcome) => {
            let response = ModeratorActionResponse {
                message: format!("Action '{}' recorded", body.action),
                id: message_id,
                decision_id: outcome.decision_id.0,
                original_response: outcome.original_response,
                final_response: outcome.final_response,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// GET /v1/conversations/{id}/messages
///
/// Last 10 messages of a conversation in chronological order.
pub async fn get_conversation_messages(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
) -> Response {
    match state
        .pipeline
        .conversation_history(&ConversationId(conversation_id), 10)
        .await
    {
        Ok(messages) => {
            let history: Vec<ConversationMessage> = messages
                .into_iter()
                .map(|m| ConversationMessage {
                    role: m.role.to_string(),
                    content: m.content,
                    category: category_label(m.category),
                    confidence: if m.role == Role::Assistant {
                        m.confidence_score
                    } else {
                        m.safety_confidence
                    },
                    timestamp: m.created_at,
                })
                .collect();
            (StatusCode::OK, Json(history)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// GET /v1/confidence/examples
///
/// Fixed educational table of sample queries and their expected scores.
pub async fn get_confidence_examples() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "examples": [
            {
                "query": "Capital of France?",
                "expected_confidence": 100.0,
                "confidence_level": "High",
                "reasons": ["Query asks for verifiable geographical fact"],
                "category": "safe",
            },
            {
                "query": "What is 2+2?",
                "expected_confidence": 100.0,
                "confidence_level": "High",
                "reasons": ["Query asks for verifiable mathematical calculation"],
                "category": "safe",
            },
            {
                "query": "Who invented the telephone?",
                "expected_confidence": 95.0,
                "confidence_level": "High",
                "reasons": ["Query asks for verifiable historical fact"],
                "category": "safe",
            },
            {
                "query": "Explain photosynthesis",
                "expected_confidence": 95.0,
                "confidence_level": "High",
                "reasons": ["Query asks for verifiable scientific fact"],
                "category": "safe",
            },
            {
                "query": "Best programming language?",
                "expected_confidence": 60.0,
                "confidence_level": "Medium",
                "reasons": ["Query requests subjective comparison or opinion"],
                "category": "safe",
            },
            {
                "query": "Should I buy a house?",
                "expected_confidence": 30.0,
                "confidence_level": "Low",
                "reasons": ["Query requests personal financial advice"],
                "category": "financial",
            },
            {
                "query": "Will AI take all jobs?",
                "expected_confidence": 40.0,
                "confidence_level": "Low",
                "reasons": ["Query involves future predictions with uncertainty"],
                "category": "safe",
            },
            {
                "query": "What is the weather today?",
                "expected_confidence": 65.0,
                "confidence_level": "Medium",
                "reasons": ["Weather information requires current data"],
                "category": "safe",
            },
        ],
        "confidence_levels": {
            "High": "80-100% - Factual, well-established information",
            "Medium": "50-79% - Some uncertainty or subjective elements",
            "Low": "0-49% - High uncertainty, requires human review",
        },
        "auto_flagging": {
            "threshold": 50.0,
            "description": "Responses with confidence below the configured safety level threshold are automatically flagged for review",
        },
    }))
}

/// GET /v1/health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    match state.pipeline.health_counts().await {
        Ok(counts) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                flagged_count: counts.flagged,
                total_messages: counts.total,
                low_confidence_responses: counts.low_confidence,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
