// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based safety analysis for the Modera moderation pipeline.
//!
//! Four pure, deterministic analyzers over one shared keyword lexicon:
//!
//! - [`classifier::SafetyClassifier`] -- message text to category + confidence
//! - [`scorer::score_response`] -- reply trustworthiness on a 0-100 scale
//! - [`context::ContextAnalyzer`] -- multi-turn escalation and bypass signals
//! - [`priority::PriorityResolver`] -- urgency tier for flagged content
//!
//! None of these block, allocate shared state, or touch the network; they
//! may be called concurrently from any number of request contexts.

pub mod classifier;
pub mod context;
pub mod lexicon;
pub mod priority;
pub mod scorer;

pub use classifier::{Classification, SafetyClassifier};
pub use context::{ContextAnalysis, ContextAnalyzer, PreviousQuery, HISTORY_WINDOW};
pub use lexicon::{SafetyLexicon, Severity};
pub use priority::{PriorityDecision, PriorityInput, PriorityResolver};
pub use scorer::{score_response, ConfidenceReport, UNCERTAINTY_DISCLOSURE};
