// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modera serve` command implementation.
//!
//! Assembles the full stack: SQLite store, response generator (remote with
//! local fallback when an API key is configured, local-only otherwise),
//! the moderation pipeline, and the HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use modera_config::ModeraConfig;
use modera_core::{ModeraError, ModerationStore, ResponseGenerator};
use modera_filter::SafetyLexicon;
use modera_gateway::{start_server, GatewayState, ServerConfig};
use modera_openai::OpenAiGenerator;
use modera_pipeline::{FallbackGenerator, LocalGenerator, ModerationPipeline, PipelineSettings};
use modera_storage::SqliteStore;

/// Initialize the tracing subscriber from the configured log level.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the `modera serve` command.
pub async fn run_serve(config: ModeraConfig) -> Result<(), ModeraError> {
    init_tracing(&config.service.log_level);

    let lexicon = Arc::new(SafetyLexicon::new());

    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let store: Arc<dyn ModerationStore> = Arc::new(store);

    let generator: Arc<dyn ResponseGenerator> = if config.generator.api_key.is_some() {
        let remote = OpenAiGenerator::new(&config.generator)?;
        info!(model = %config.generator.model, "remote generator enabled with local fallback");
        Arc::new(FallbackGenerator::new(
            Arc::new(remote),
            lexicon.clone(),
            Duration::from_secs(config.generator.timeout_secs),
        ))
    } else {
        info!("no generator API key configured, using local generator");
        Arc::new(LocalGenerator::new(lexicon.clone()))
    };

    let settings = PipelineSettings {
        safety_level: config.pipeline.safety_level,
        transparency: config.pipeline.transparency,
        learning_mode: config.pipeline.learning_mode,
        data_logging: config.pipeline.data_logging,
    };

    let pipeline = Arc::new(ModerationPipeline::new(
        lexicon,
        generator,
        store.clone(),
        settings,
    ));

    let state = GatewayState {
        pipeline,
        default_settings: settings,
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    info!(
        safety_level = %config.pipeline.safety_level,
        "moderation pipeline assembled"
    );

    let result = start_server(&server_config, state).await;

    store.close().await?;
    result
}
