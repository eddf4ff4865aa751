// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway serving the Modera chat and moderator queue API.
//!
//! Routes:
//! - `POST /v1/chat` -- process one user turn through the pipeline
//! - `GET /v1/moderator/queue` -- pending flagged items, priority order
//! - `POST /v1/moderator/queue/{id}/action` -- record a moderator decision
//! - `GET /v1/conversations/{id}/messages` -- conversation history
//! - `GET /v1/confidence/examples` -- educational scoring examples
//! - `GET /v1/health` -- service health with moderation counters

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState, ServerConfig};
