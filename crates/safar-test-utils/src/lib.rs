// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across the workspace.

use std::sync::Mutex;

use async_trait::async_trait;
use safar_core::{Keyboard, Notifier, SafarError};

/// A [`Notifier`] that records everything it is asked to send.
///
/// Construct with [`RecordingNotifier::new`], or with
/// [`RecordingNotifier::failing`] to make every send return an error,
/// which exercises the best-effort notification paths.
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    texts: Mutex<Vec<(i64, String)>>,
    cards: Mutex<Vec<(i64, String, Keyboard)>>,
    photos: Mutex<Vec<(i64, String, String)>>,
    documents: Mutex<Vec<(i64, String, String)>>,
    uploads: Mutex<Vec<(i64, String, Vec<u8>, String)>>,
    // Text and card bodies interleaved, so `messages_to` can report them
    // in actual send order.
    log: Mutex<Vec<(i64, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), SafarError> {
        if self.fail {
            Err(SafarError::notify("recording notifier set to fail"))
        } else {
            Ok(())
        }
    }

    /// All plain text sends, in order, as `(chat_id, text)`.
    pub fn texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().unwrap().clone()
    }

    /// All card sends as `(chat_id, text, keyboard)`.
    pub fn cards(&self) -> Vec<(i64, String, Keyboard)> {
        self.cards.lock().unwrap().clone()
    }

    /// All photo forwards as `(chat_id, file_id, caption)`.
    pub fn photos(&self) -> Vec<(i64, String, String)> {
        self.photos.lock().unwrap().clone()
    }

    /// All document forwards as `(chat_id, file_id, caption)`.
    pub fn documents(&self) -> Vec<(i64, String, String)> {
        self.documents.lock().unwrap().clone()
    }

    /// All in-memory uploads as `(chat_id, file_name, data, caption)`.
    pub fn uploads(&self) -> Vec<(i64, String, Vec<u8>, String)> {
        self.uploads.lock().unwrap().clone()
    }

    /// Every text and card body sent to `chat_id`, in send order.
    pub fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// The keyboard of the most recent card sent to `chat_id`.
    pub fn last_keyboard(&self, chat_id: i64) -> Option<Keyboard> {
        self.cards
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _, _)| *id == chat_id)
            .map(|(_, _, kb)| kb.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SafarError> {
        self.check()?;
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        self.log.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_card(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), SafarError> {
        self.check()?;
        self.cards
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), keyboard));
        self.log.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError> {
        self.check()?;
        self.photos
            .lock()
            .unwrap()
            .push((chat_id, file_id.to_string(), caption.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
    ) -> Result<(), SafarError> {
        self.check()?;
        self.documents
            .lock()
            .unwrap()
            .push((chat_id, file_id.to_string(), caption.to_string()));
        Ok(())
    }

    async fn send_document_bytes(
        &self,
        chat_id: i64,
        file_name: &str,
        data: Vec<u8>,
        caption: &str,
    ) -> Result<(), SafarError> {
        self.check()?;
        self.uploads.lock().unwrap().push((
            chat_id,
            file_name.to_string(),
            data,
            caption.to_string(),
        ));
        Ok(())
    }
}
