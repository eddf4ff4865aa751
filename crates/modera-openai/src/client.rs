// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible chat-completions endpoint.
//!
//! Implements [`ResponseGenerator`] with the collaborator contract from
//! the pipeline: crisis content short-circuits to the fixed resources
//! message without any network call, and only redacted text is ever sent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use modera_config::model::GeneratorConfig;
use modera_core::{
    ModeraError, PiiKind, ResponseGenerator, SafetyCategory, CRISIS_RESPONSE,
};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

/// System prompt steering the remote model toward the pipeline's fixed
/// behaviors for PII and sensitive categories.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions directly and accurately.\n\
- For simple factual questions, give the direct answer first.\n\
- For sensitive topics (medical, financial, legal), provide helpful information with a short disclaimer to consult a professional.\n\
- If the system note says personal information was detected and redacted, respond EXACTLY with: \"I've detected personal information in your message. For privacy protection, I've redacted it. Remember: AI systems should never ask for or store personal details like emails, passwords, or identification numbers.\"\n\
- For uncertain or subjective topics, acknowledge uncertainty.\n\
Answer the question first; add safety context only when needed.";

/// Chat-completions client for remote response generation.
///
/// Manages authentication headers, connection pooling, and one retry on
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    base_url: String,
}

impl OpenAiGenerator {
    /// Creates a new generator client from configuration.
    ///
    /// Fails if no API key is configured or the key is not a valid header
    /// value.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ModeraError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ModeraError::Config("generator.api_key is not set".into()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ModeraError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModeraError::Generator {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: 1,
            base_url: config.base_url.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ModeraError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(request)
                .send()
                .await
                .map_err(|e| ModeraError::Generator {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body: ChatResponse =
                    response.json().await.map_err(|e| ModeraError::Generator {
                        message: format!("malformed completion response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let content = body
                    .choices
                    .first()
                    .map(|c| c.message.content.trim().to_string())
                    .unwrap_or_default();
                if content.is_empty() {
                    return Err(ModeraError::Generator {
                        message: "completion response carried no content".into(),
                        source: None,
                    });
                }
                return Ok(content);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(ModeraError::Generator {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "chat API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(ModeraError::Generator {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| ModeraError::Generator {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        text: &str,
        category: Option<SafetyCategory>,
        pii_types: &[PiiKind],
    ) -> Result<String, ModeraError> {
        // Crisis never reaches the remote model.
        if category == Some(SafetyCategory::Crisis) {
            return Ok(CRISIS_RESPONSE.to_string());
        }

        let user_prompt = if pii_types.is_empty() {
            text.to_string()
        } else {
            format!(
                "[SYSTEM NOTE: Personal information was detected and redacted in the user's original message. Respond with the exact privacy education message as specified in your instructions.]\n\nUser message: {text}"
            )
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: self.max_tokens,
        };

        self.complete(&request).await
    }
}
