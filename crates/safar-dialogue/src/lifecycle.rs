// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status transitions and owner notification.
//!
//! Any status can replace any other; there is no transition graph. The
//! owner notification is best-effort: a blocked bot or deleted account
//! must never fail the admin's action.

use safar_core::{ItemKind, ItemRef, Notifier, SafarError};
use safar_store::queries::{applications, hotels};
use safar_store::{Status, TableStore};
use tracing::warn;

/// Outcome of a status change: who owns the record and what it became.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub user_id: i64,
    pub status: Status,
}

/// Overwrite a record's status. Returns `None` if the id does not exist.
pub async fn apply(
    store: &TableStore,
    item: ItemRef,
    status: Status,
) -> Result<Option<StatusUpdate>, SafarError> {
    let update = match item.kind {
        ItemKind::App => applications::set_status(store, item.id, status)
            .await?
            .map(|app| StatusUpdate {
                user_id: app.user_id,
                status: app.status,
            }),
        ItemKind::Hotel => hotels::set_status(store, item.id, status)
            .await?
            .map(|booking| StatusUpdate {
                user_id: booking.user_id,
                status: booking.status,
            }),
    };
    Ok(update)
}

/// Tell the record's owner about a status change, with an optional
/// comment line. Failures are logged and swallowed.
pub async fn notify_owner(
    notifier: &dyn Notifier,
    item: ItemRef,
    update: &StatusUpdate,
    comment: Option<&str>,
) {
    let item_name = match item.kind {
        ItemKind::App => "заявки на билет",
        ItemKind::Hotel => "бронирования отеля",
    };
    let mut text = format!(
        "🔔 Статус вашей {item_name} №{} изменён: <b>{}</b>",
        item.id, update.status
    );
    if let Some(comment) = comment {
        text.push_str(&format!("\n💬 Комментарий: {comment}"));
    }
    if let Err(error) = notifier.send_text(update.user_id, &text).await {
        warn!(user_id = update.user_id, %item, %error, "status notification failed");
    }
}

/// An owner cancelling their own record: a custom label, not the
/// built-in cancelled stage, so the admin sees who initiated it.
pub fn owner_cancel_status(kind: ItemKind) -> Status {
    match kind {
        ItemKind::App => Status::Custom("❌ Отклонена пользователем".to_string()),
        ItemKind::Hotel => Status::Custom("❌ Отменено пользователем".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_core::ItemKind;
    use safar_store::models::Application;
    use safar_store::queries::applications::{by_id, insert};
    use safar_test_utils::RecordingNotifier;
    use std::time::Duration;
    use tempfile::tempdir;

    fn make_app(user_id: i64) -> Application {
        Application {
            id: None,
            timestamp: String::new(),
            user_id,
            username: None,
            first_name: None,
            last_name: None,
            fio: "Иванова Мария".to_string(),
            passport_file_id: String::new(),
            route: "Самарканд - Ташкент".to_string(),
            date: "25.12.2025".to_string(),
            time_of_day: "утром".to_string(),
            reason: "командировка".to_string(),
            status: Status::Pending,
            return_route: String::new(),
            return_date: String::new(),
            is_round_trip: false,
        }
    }

    #[tokio::test]
    async fn apply_updates_and_reports_owner() {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();
        let id = insert(&store, make_app(42)).await.unwrap();

        let update = apply(&store, ItemRef::new(ItemKind::App, id), Status::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.user_id, 42);
        assert_eq!(update.status, Status::Approved);
        assert_eq!(by_id(&store, id).await.unwrap().status, Status::Approved);
    }

    #[tokio::test]
    async fn apply_missing_record_is_none() {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();
        let update = apply(&store, ItemRef::new(ItemKind::Hotel, 9), Status::Rejected)
            .await
            .unwrap();
        assert!(update.is_none());
    }

    #[tokio::test]
    async fn notify_owner_includes_comment_line() {
        let notifier = RecordingNotifier::new();
        let update = StatusUpdate {
            user_id: 42,
            status: Status::WaitingPayment,
        };
        notify_owner(
            &notifier,
            ItemRef::new(ItemKind::App, 3),
            &update,
            Some("оплатите до пятницы"),
        )
        .await;

        let sent = notifier.texts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 42);
        assert!(sent[0].1.contains("заявки на билет №3"));
        assert!(sent[0].1.contains("<b>💰 Ожидает оплаты</b>"));
        assert!(sent[0].1.contains("💬 Комментарий: оплатите до пятницы"));
    }

    #[test]
    fn owner_cancel_labels_stay_custom() {
        assert_eq!(
            owner_cancel_status(ItemKind::App).label(),
            "❌ Отклонена пользователем"
        );
        assert_eq!(
            owner_cancel_status(ItemKind::Hotel).label(),
            "❌ Отменено пользователем"
        );
    }
}
