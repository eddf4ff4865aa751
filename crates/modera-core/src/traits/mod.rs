// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the moderation pipeline.
//!
//! The pipeline core depends on exactly two external collaborators: a
//! response generator and a conversation store. Both are consumed through
//! narrow `#[async_trait]` seams so they can be swapped for deterministic
//! local implementations in tests and fallback paths.

pub mod generator;
pub mod store;

pub use generator::{ResponseGenerator, CRISIS_RESPONSE, PRIVACY_RESPONSE};
pub use store::ModerationStore;
