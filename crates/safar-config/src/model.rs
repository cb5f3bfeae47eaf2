// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Safar booking bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Safar configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// only `telegram.bot_token` and `telegram.admin_id` must be supplied for
/// the bot to run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SafarConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Record storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Departure reminder scheduler settings.
    #[serde(default)]
    pub reminder: ReminderConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "safar".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` is rejected at validation time.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Numeric Telegram user id of the single administrator.
    /// Zero means "not configured" and is rejected at validation time.
    #[serde(default)]
    pub admin_id: i64,

    /// Idle timeout for the admin forwarding session, in seconds.
    /// After this long without a forwarded message, the session ends.
    #[serde(default = "default_forward_timeout_secs")]
    pub forward_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_id: 0,
            forward_timeout_secs: default_forward_timeout_secs(),
        }
    }
}

fn default_forward_timeout_secs() -> u64 {
    900 // 15 minutes
}

/// Record storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the per-table JSON files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Read-cache time-to-live in seconds. Zero disables caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("safar"))
        .unwrap_or_else(|| std::path::PathBuf::from("data"))
        .to_string_lossy()
        .into_owned()
}

fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

/// Departure reminder scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReminderConfig {
    /// Enable the daily reminder sweep.
    #[serde(default = "default_reminder_enabled")]
    pub enabled: bool,

    /// Local hour (0-23) at which the daily sweep runs.
    #[serde(default = "default_reminder_hour")]
    pub hour: u8,

    /// Fallback sweep interval in seconds, used when the cron schedule
    /// cannot be constructed.
    #[serde(default = "default_fallback_interval_secs")]
    pub fallback_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: default_reminder_enabled(),
            hour: default_reminder_hour(),
            fallback_interval_secs: default_fallback_interval_secs(),
        }
    }
}

fn default_reminder_enabled() -> bool {
    true
}

fn default_reminder_hour() -> u8 {
    9
}

fn default_fallback_interval_secs() -> u64 {
    86_400 // 24 hours
}
