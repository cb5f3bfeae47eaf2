// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Safar booking bot.

use thiserror::Error;

/// The primary error type used across all Safar crates.
///
/// Variants map the failure classes of the system: user input that fails a
/// dialogue validation rule, records missing from a table, persistence
/// failures, delivery failures, and administrator gating.
#[derive(Debug, Error)]
pub enum SafarError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or out-of-range user input. Always recovered locally by
    /// re-prompting the same dialogue step; never aborts an operation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A record id is absent from the relevant table.
    #[error("{what} #{id} not found")]
    NotFound { what: &'static str, id: i64 },

    /// Table read/write failure. Write failures propagate and abort the
    /// in-flight operation; read failures degrade to an empty result set
    /// at the store level and never surface as this variant.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failure to deliver a message to a user or the administrator.
    /// Logged at call sites, never fatal, never retried.
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A non-administrator invoked an administrator-only operation.
    #[error("operation requires administrator rights")]
    Unauthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SafarError {
    /// Wrap an I/O or serialization failure as a storage error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SafarError::Storage {
            source: Box::new(source),
        }
    }

    /// A delivery failure with no underlying cause worth keeping.
    pub fn notify(message: impl Into<String>) -> Self {
        SafarError::Notify {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport error as a delivery failure.
    pub fn notify_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SafarError::Notify {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
