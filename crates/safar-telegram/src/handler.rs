// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update conversion: Telegram messages and callback queries become
//! channel-agnostic [`Event`]s for the dialogue engine.

use safar_core::{Keyboard, UserInfo};
use safar_dialogue::Event;
use teloxide::types::{
    CallbackQuery, ChatKind, InlineKeyboardButton, InlineKeyboardMarkup, Message, User,
};
use tracing::debug;

/// Only private chats are served; groups and channels are ignored.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

/// Extracts the sender and an [`Event`] from a message.
///
/// Commands are split into name and argument tail; unsupported message
/// types (stickers, locations and the like) return `None`.
pub fn event_from_message(msg: &Message) -> Option<(UserInfo, Event)> {
    let user = user_info(msg.from.as_ref()?);

    if let Some(text) = msg.text() {
        if let Some(stripped) = text.strip_prefix('/') {
            let (name, args) = match stripped.split_once(char::is_whitespace) {
                Some((name, args)) => (name, args.trim()),
                None => (stripped, ""),
            };
            // "/cmd@botname" arrives in group mentions; strip the suffix.
            let name = name.split('@').next().unwrap_or(name);
            return Some((
                user,
                Event::Command {
                    name: name.to_string(),
                    args: args.to_string(),
                },
            ));
        }
        return Some((user, Event::Text(text.to_string())));
    }

    if let Some(photos) = msg.photo() {
        // Telegram provides multiple sizes; the last one is the largest.
        let largest = photos.last()?;
        return Some((
            user,
            Event::Photo {
                file_id: largest.file.id.to_string(),
                caption: msg.caption().map(|c| c.to_string()),
            },
        ));
    }

    if let Some(doc) = msg.document() {
        return Some((
            user,
            Event::Document {
                file_id: doc.file.id.to_string(),
                caption: msg.caption().map(|c| c.to_string()),
            },
        ));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    None
}

/// Extracts the sender and an [`Event::Action`] from a callback query.
///
/// Unknown callback data yields `None`, so stale buttons from old bot
/// versions are dropped silently.
pub fn event_from_callback(query: &CallbackQuery) -> Option<(UserInfo, Event)> {
    let data = query.data.as_deref()?;
    let action = safar_core::Action::parse(data)?;
    Some((user_info(&query.from), Event::Action(action)))
}

/// Converts the channel-agnostic keyboard into Telegram inline markup.
pub fn keyboard_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|b| InlineKeyboardButton::callback(b.label, b.action.encode()))
            .collect::<Vec<_>>()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_core::{Action, Button};

    fn make_message(json_text: serde_json::Value) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": 42i64,
                "type": "private",
                "first_name": "Maria",
            },
            "from": {
                "id": 42u64,
                "is_bot": false,
                "first_name": "Maria",
                "last_name": "Ivanova",
                "username": "maria",
            },
        });
        let mut json = json;
        for (k, v) in json_text.as_object().unwrap() {
            json[k] = v.clone();
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn command_with_args_is_split() {
        let msg = make_message(serde_json::json!({"text": "/set_status app 3 готово"}));
        let (user, event) = event_from_message(&msg).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(
            event,
            Event::Command {
                name: "set_status".to_string(),
                args: "app 3 готово".to_string(),
            }
        );
    }

    #[test]
    fn bare_command_has_empty_args() {
        let msg = make_message(serde_json::json!({"text": "/start"}));
        let (_, event) = event_from_message(&msg).unwrap();
        assert_eq!(
            event,
            Event::Command {
                name: "start".to_string(),
                args: String::new(),
            }
        );
    }

    #[test]
    fn plain_text_passes_through() {
        let msg = make_message(serde_json::json!({"text": "Иванова Мария"}));
        let (_, event) = event_from_message(&msg).unwrap();
        assert_eq!(event, Event::Text("Иванова Мария".to_string()));
    }

    #[test]
    fn photo_takes_largest_size() {
        let msg = make_message(serde_json::json!({
            "photo": [
                {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90, "file_size": 100},
                {"file_id": "big", "file_unique_id": "b", "width": 800, "height": 800, "file_size": 9000},
            ],
            "caption": "паспорт",
        }));
        let (_, event) = event_from_message(&msg).unwrap();
        assert_eq!(
            event,
            Event::Photo {
                file_id: "big".to_string(),
                caption: Some("паспорт".to_string()),
            }
        );
    }

    #[test]
    fn keyboard_markup_preserves_rows_and_data() {
        let keyboard = Keyboard::new()
            .row(vec![
                Button::new("✅ Одобрить", Action::ViewApp(1)),
                Button::new("❌ Отклонить", Action::ViewApp(2)),
            ])
            .row(vec![Button::new("◀️", Action::MyRequests)]);
        let markup = keyboard_markup(keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "✅ Одобрить");
    }
}
