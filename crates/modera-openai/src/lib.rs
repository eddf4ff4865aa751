// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completions client for the Modera pipeline.
//!
//! The remote half of the response-generation collaborator. The pipeline
//! always wraps this in `FallbackGenerator` so any failure or timeout
//! degrades to the deterministic local generator.

pub mod client;
pub mod types;

pub use client::OpenAiGenerator;
