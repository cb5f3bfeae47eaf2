// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as required credentials, valid hours, and non-empty
//! paths.

use crate::diagnostic::ConfigError;
use crate::model::SafarConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SafarConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match &config.telegram.bot_token {
        None => errors.push(ConfigError::Validation {
            message: "telegram.bot_token must be set (or SAFAR_TELEGRAM_BOT_TOKEN)".to_string(),
        }),
        Some(token) if token.trim().is_empty() => errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty".to_string(),
        }),
        Some(_) => {}
    }

    if config.telegram.admin_id <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "telegram.admin_id must be a positive Telegram user id, got {}",
                config.telegram.admin_id
            ),
        });
    }

    if config.telegram.forward_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "telegram.forward_timeout_secs must be greater than zero".to_string(),
        });
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    if config.reminder.hour > 23 {
        errors.push(ConfigError::Validation {
            message: format!(
                "reminder.hour must be between 0 and 23, got {}",
                config.reminder.hour
            ),
        });
    }

    if config.reminder.fallback_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reminder.fallback_interval_secs must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SafarConfig {
        let mut config = SafarConfig::default();
        config.telegram.bot_token = Some("123:ABC".to_string());
        config.telegram.admin_id = 100;
        config
    }

    #[test]
    fn configured_config_validates() {
        assert!(validate_config(&configured()).is_ok());
    }

    #[test]
    fn default_config_misses_credentials() {
        let errors = validate_config(&SafarConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("bot_token"))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("admin_id"))));
    }

    #[test]
    fn empty_data_dir_fails_validation() {
        let mut config = configured();
        config.storage.data_dir = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("data_dir"))));
    }

    #[test]
    fn out_of_range_reminder_hour_fails_validation() {
        let mut config = configured();
        config.reminder.hour = 24;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("reminder.hour"))));
    }

    #[test]
    fn toml_document_validates_after_deserializing() {
        let toml_str = r#"
[telegram]
bot_token = "123:ABC"
admin_id = 100

[reminder]
hour = 7
"#;
        let config: SafarConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.reminder.hour, 7);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_cache_ttl_is_allowed() {
        // TTL of zero means "no caching", which is a valid operating mode.
        let mut config = configured();
        config.storage.cache_ttl_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}
