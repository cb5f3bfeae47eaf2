// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Notifier`] implementation backed by the Telegram Bot API.
//!
//! All text goes out with HTML parse mode, matching the markup produced
//! by the card builders. Photos and documents are re-sent by file id, so
//! passports and tickets never transit through this process.

use async_trait::async_trait;
use safar_core::{Keyboard, Notifier, SafarError};
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, ParseMode};

use crate::handler::keyboard_markup;

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SafarError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| SafarError::notify_with(format!("send_message to {chat_id}"), e))?;
        metrics::counter!("safar_messages_sent_total").increment(1);
        Ok(())
    }

    async fn send_card(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), SafarError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard_markup(keyboard))
            .await
            .map_err(|e| SafarError::notify_with(format!("send_message to {chat_id}"), e))?;
        metrics::counter!("safar_messages_sent_total").increment(1);
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError> {
        let mut request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::file_id(FileId(file_id.to_owned())));
        if !caption.is_empty() {
            request = request.caption(caption);
        }
        request
            .await
            .map_err(|e| SafarError::notify_with(format!("send_photo to {chat_id}"), e))?;
        metrics::counter!("safar_messages_sent_total").increment(1);
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError> {
        let mut request = self
            .bot
            .send_document(ChatId(chat_id), InputFile::file_id(FileId(file_id.to_owned())));
        if !caption.is_empty() {
            request = request.caption(caption);
        }
        request
            .await
            .map_err(|e| SafarError::notify_with(format!("send_document to {chat_id}"), e))?;
        metrics::counter!("safar_messages_sent_total").increment(1);
        Ok(())
    }

    async fn send_document_bytes(
        &self,
        chat_id: i64,
        file_name: &str,
        data: Vec<u8>,
        caption: &str,
    ) -> Result<(), SafarError> {
        let file = InputFile::memory(data).file_name(file_name.to_owned());
        let mut request = self.bot.send_document(ChatId(chat_id), file);
        if !caption.is_empty() {
            request = request.caption(caption);
        }
        request
            .await
            .map_err(|e| SafarError::notify_with(format!("send_document to {chat_id}"), e))?;
        metrics::counter!("safar_messages_sent_total").increment(1);
        Ok(())
    }
}
