// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messaging seam.
//!
//! Everything the dialogue engine says to a user goes through [`Notifier`],
//! keeping the engine free of any Telegram types and fully testable with a
//! recording double.

use async_trait::async_trait;

use crate::error::SafarError;
use crate::types::Keyboard;

/// Sends messages to a chat identified by the numeric user id.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Plain text message, no keyboard.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SafarError>;

    /// Text message with an inline keyboard attached.
    async fn send_card(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), SafarError>;

    /// Forward a previously stored photo by its channel file id.
    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError>;

    /// Forward a previously stored document by its channel file id.
    async fn send_document(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError>;

    /// Upload an in-memory file, e.g. a generated report.
    async fn send_document_bytes(
        &self,
        chat_id: i64,
        file_name: &str,
        data: Vec<u8>,
        caption: &str,
    ) -> Result<(), SafarError>;
}
