// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.
//! Authentication and session issuance are external concerns; this
//! surface records moderator identity verbatim from the request body.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use modera_core::ModeraError;
use modera_pipeline::{ModerationPipeline, PipelineSettings};

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The assembled moderation pipeline.
    pub pipeline: Arc<ModerationPipeline>,
    /// Default settings applied when a request carries no override.
    pub default_settings: PipelineSettings,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Exposed separately from [`start_server`] so tests can drive the
/// router without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/moderator/queue", get(handlers::get_moderator_queue))
        .route(
            "/v1/moderator/queue/{id}/action",
            post(handlers::post_moderator_action),
        )
        .route(
            "/v1/conversations/{id}/messages",
            get(handlers::get_conversation_messages),
        )
        .route(
            "/v1/confidence/examples",
            get(handlers::get_confidence_examples),
        )
        .route("/v1/health", get(handlers::get_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ModeraError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ModeraError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ModeraError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
