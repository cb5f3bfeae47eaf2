// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Safar booking bot.
//!
//! This crate provides the shared error type, the channel-agnostic keyboard
//! and callback-action model, and the trait seams implemented by the
//! Telegram channel and the report renderer.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SafarError;
pub use types::{
    Action, Button, ItemKind, ItemRef, Keyboard, PageKind, ReportRecord, RoomType, UserInfo,
};

pub use traits::{Notifier, ReportRenderer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safar_error_has_all_variants() {
        // Verify all variants exist and can be constructed.
        let _config = SafarError::Config("test".into());
        let _validation = SafarError::Validation("test".into());
        let _not_found = SafarError::NotFound {
            what: "application",
            id: 1,
        };
        let _storage = SafarError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _notify = SafarError::Notify {
            message: "test".into(),
            source: None,
        };
        let _unauthorized = SafarError::Unauthorized;
        let _internal = SafarError::Internal("test".into());
    }

    #[test]
    fn trait_objects_are_constructible() {
        // Both seams must stay object-safe; the engine holds them as
        // Arc<dyn Notifier> and Arc<dyn ReportRenderer>.
        fn _assert_notifier(_: &dyn Notifier) {}
        fn _assert_renderer(_: &dyn ReportRenderer) {}
    }
}
