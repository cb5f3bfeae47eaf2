// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Safar booking bot.
//!
//! Runs long polling via teloxide, converts updates into dialogue-engine
//! events, and implements the outbound [`Notifier`](safar_core::Notifier)
//! seam with HTML formatting.

pub mod handler;
pub mod notifier;

use std::sync::Arc;

use safar_config::model::TelegramConfig;
use safar_core::SafarError;
use safar_dialogue::DialogueEngine;
use teloxide::prelude::*;
use tracing::{debug, error, info};

pub use notifier::TelegramNotifier;

/// Builds a [`Bot`] from the configured token.
pub fn bot_from_config(config: &TelegramConfig) -> Result<Bot, SafarError> {
    let token = config.bot_token.as_deref().ok_or_else(|| {
        SafarError::Config("telegram.bot_token is required to run the bot".into())
    })?;
    if token.is_empty() {
        return Err(SafarError::Config("telegram.bot_token cannot be empty".into()));
    }
    Ok(Bot::new(token))
}

/// Runs the long-polling dispatcher until Ctrl-C.
///
/// Messages and callback queries are converted in [`handler`] and fed to
/// the engine one at a time. Engine errors are logged and never stop the
/// polling loop.
pub async fn run_dispatcher(bot: Bot, engine: Arc<DialogueEngine>) {
    info!("starting Telegram long polling");

    let message_engine = engine.clone();
    let message_branch = Update::filter_message().endpoint(move |msg: Message| {
        let engine = message_engine.clone();
        async move {
            if !handler::is_dm(&msg) {
                debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                return respond(());
            }
            if let Some((user, event)) = handler::event_from_message(&msg) {
                if let Err(e) = engine.handle(&user, event).await {
                    error!(user_id = user.id, error = %e, "message handling failed");
                }
            }
            respond(())
        }
    });

    let callback_branch = Update::filter_callback_query().endpoint(
        move |bot: Bot, query: CallbackQuery| {
            let engine = engine.clone();
            async move {
                // Stop the button spinner before doing any work.
                if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                    debug!(error = %e, "answer_callback_query failed");
                }
                if let Some((user, event)) = handler::event_from_callback(&query) {
                    if let Err(e) = engine.handle(&user, event).await {
                        error!(user_id = user.id, error = %e, "callback handling failed");
                    }
                }
                respond(())
            }
        },
    );

    Dispatcher::builder(
        bot,
        dptree::entry().branch(message_branch).branch(callback_branch),
    )
    .default_handler(|_| async {})
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_requires_token() {
        let config = TelegramConfig {
            bot_token: None,
            admin_id: 1,
            forward_timeout_secs: 900,
        };
        assert!(bot_from_config(&config).is_err());
    }

    #[test]
    fn bot_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
            admin_id: 1,
            forward_timeout_secs: 900,
        };
        assert!(bot_from_config(&config).is_err());
    }

    #[test]
    fn bot_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
            admin_id: 1,
            forward_timeout_secs: 900,
        };
        assert!(bot_from_config(&config).is_ok());
    }
}
