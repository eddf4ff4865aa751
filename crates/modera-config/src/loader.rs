// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./modera.toml` > `~/.config/modera/modera.toml`
//! > `/etc/modera/modera.toml` with environment variable overrides via the
//! `MODERA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ModeraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/modera/modera.toml` (system-wide)
/// 3. `~/.config/modera/modera.toml` (user XDG config)
/// 4. `./modera.toml` (local directory)
/// 5. `MODERA_*` environment variables
pub fn load_config() -> Result<ModeraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModeraConfig::default()))
        .merge(Toml::file("/etc/modera/modera.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("modera/modera.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("modera.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ModeraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModeraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ModeraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModeraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MODERA_PIPELINE_SAFETY_LEVEL` must
/// map to `pipeline.safety_level`, not `pipeline.safety.level`.
fn env_provider() -> Env {
    Env::prefixed("MODERA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("pipeline_", "pipeline.", 1)
            .replacen("generator_", "generator.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
