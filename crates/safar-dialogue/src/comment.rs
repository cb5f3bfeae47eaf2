// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin comments on applications and bookings.
//!
//! A comment is either public or internal. Public comments reach the
//! record owner through the same notification channel as status changes;
//! internal comments stay admin-only.

use safar_core::{Action, Button, ItemKind, ItemRef, Keyboard, Notifier, SafarError};
use safar_store::queries::{applications, comments, hotels};
use safar_store::{Status, TableStore};

use crate::lifecycle::{self, StatusUpdate};

/// Keyboard asking the admin for the comment visibility.
pub fn type_prompt(item: ItemRef) -> (String, Keyboard) {
    let keyboard = Keyboard::new()
        .row(vec![Button::new(
            "📝 Публичный",
            Action::CommentKind { item, public: true },
        )])
        .row(vec![Button::new(
            "🔒 Внутренний",
            Action::CommentKind {
                item,
                public: false,
            },
        )])
        .row(vec![Button::new("❌ Отмена", Action::CommentCancel(item))]);
    ("Выберите тип комментария:".to_string(), keyboard)
}

/// Store a comment and, when it is public, tell the record owner.
/// Returns the assigned comment id.
pub async fn add(
    store: &TableStore,
    notifier: &dyn Notifier,
    item: ItemRef,
    author_id: i64,
    text: &str,
    internal: bool,
) -> Result<i64, SafarError> {
    let comment_id = comments::add(store, item, author_id, text, internal).await?;

    if !internal {
        let owner = match item.kind {
            ItemKind::App => applications::by_id(store, item.id).await.map(|a| a.user_id),
            ItemKind::Hotel => hotels::by_id(store, item.id).await.map(|h| h.user_id),
        };
        if let Some(user_id) = owner {
            let update = StatusUpdate {
                user_id,
                status: Status::Custom("Новый комментарий".to_string()),
            };
            lifecycle::notify_owner(notifier, item, &update, Some(text)).await;
        }
    }

    Ok(comment_id)
}
