// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./safar.toml` > `~/.config/safar/safar.toml` > `/etc/safar/safar.toml`
//! with environment variable overrides via `SAFAR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SafarConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/safar/safar.toml` (system-wide)
/// 3. `~/.config/safar/safar.toml` (user XDG config)
/// 4. `./safar.toml` (local directory)
/// 5. `SAFAR_*` environment variables
pub fn load_config() -> Result<SafarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafarConfig::default()))
        .merge(Toml::file("/etc/safar/safar.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("safar/safar.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("safar.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SafarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SafarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SafarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `SAFAR_TELEGRAM_BOT_TOKEN` must
/// map to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("SAFAR_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SAFAR_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        // Only the leading section token becomes a dot; `bot_token` must
        // stay intact, so a bare replacen over the whole key would be wrong.
        let key_str = key.as_str();
        let mapped = ["telegram_", "storage_", "reminder_", "bot_"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .map(|rest| format!("{}.{rest}", &section[..section.len() - 1]))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
