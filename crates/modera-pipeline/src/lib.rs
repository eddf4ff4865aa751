// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Modera safety moderation pipeline.
//!
//! Wires the pure analyzers from `modera-filter` and the redactor from
//! `modera-redact` into one turn-processing entry point, aggregates the
//! flagging decision, and drives the moderator review workflow.

pub mod aggregate;
pub mod generate;
pub mod learning;
pub mod pipeline;
pub mod review;

pub use aggregate::{apply_context_signals, decide_flag, FlagOutcome};
pub use generate::{FallbackGenerator, LocalGenerator, CRISIS_RESPONSE, PRIVACY_RESPONSE};
pub use learning::{build_learning_analysis, BreakdownFactor, LearningAnalysis};
pub use pipeline::{ChatOutcome, ModerationPipeline, PipelineSettings, ReviewOutcome};
pub use review::{resolve_action, ReviewRequest, ReviewResolution, CLARIFICATION_PROMPT};
