// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, non-empty paths, and sane
//! deadlines.

use crate::diagnostic::ConfigError;
use crate::model::ModeraConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ModeraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.generator.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "generator.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.generator.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "generator.max_tokens must be at least 1".to_string(),
        });
    }

    if config.generator.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "generator.base_url must not be empty".to_string(),
        });
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of: {}",
                config.service.log_level,
                valid_levels.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ModeraConfig::default()).is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut config = ModeraConfig::default();
        config.gateway.host = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("gateway.host")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ModeraConfig::default();
        config.generator.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let mut config = ModeraConfig::default();
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("log_level")));
    }

    #[test]
    fn multiple_errors_are_collected() {
        let mut config = ModeraConfig::default();
        config.gateway.host = String::new();
        config.storage.database_path = String::new();
        config.generator.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "expected all errors, got {}", errors.len());
    }
}
