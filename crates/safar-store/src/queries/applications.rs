// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket application CRUD operations.

use safar_core::SafarError;

use crate::models::{stamp_now, Application};
use crate::status::Status;
use crate::store::{next_id, TableStore};

/// Insert a new application, assigning its id and timestamp.
pub async fn insert(store: &TableStore, mut app: Application) -> Result<i64, SafarError> {
    let mut rows = store.read::<Application>().await;
    let id = next_id(&rows);
    app.id = Some(id);
    if app.timestamp.is_empty() {
        app.timestamp = stamp_now();
    }
    rows.push(app);
    store.write(&rows).await?;
    Ok(id)
}

/// All applications in insertion order.
pub async fn all(store: &TableStore) -> Vec<Application> {
    store.read::<Application>().await
}

/// Find one application by id.
pub async fn by_id(store: &TableStore, id: i64) -> Option<Application> {
    store
        .read::<Application>()
        .await
        .into_iter()
        .find(|a| a.id == Some(id))
}

/// A user's applications, newest first.
pub async fn for_user(store: &TableStore, user_id: i64) -> Vec<Application> {
    let mut rows: Vec<Application> = store
        .read::<Application>()
        .await
        .into_iter()
        .filter(|a| a.user_id == user_id)
        .collect();
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rows
}

/// Overwrite an application's status. Returns the updated record, or
/// `None` if the id does not exist.
pub async fn set_status(
    store: &TableStore,
    id: i64,
    status: Status,
) -> Result<Option<Application>, SafarError> {
    let mut rows = store.read::<Application>().await;
    let Some(row) = rows.iter_mut().find(|a| a.id == Some(id)) else {
        return Ok(None);
    };
    row.status = status;
    let updated = row.clone();
    store.write(&rows).await?;
    Ok(Some(updated))
}

/// Remove an application from the live table. Returns the removed record.
pub async fn remove(store: &TableStore, id: i64) -> Result<Option<Application>, SafarError> {
    let mut rows = store.read::<Application>().await;
    let Some(pos) = rows.iter().position(|a| a.id == Some(id)) else {
        return Ok(None);
    };
    let removed = rows.remove(pos);
    store.write(&rows).await?;
    Ok(Some(removed))
}

/// Applications departing on an exact `DD.MM.YYYY` date.
pub async fn on_date(store: &TableStore, date: &str) -> Vec<Application> {
    store
        .read::<Application>()
        .await
        .into_iter()
        .filter(|a| a.date == date)
        .collect()
}

/// Applications whose route mentions `city`, case-insensitively.
pub async fn route_contains(store: &TableStore, city: &str) -> Vec<Application> {
    let needle = city.to_lowercase();
    store
        .read::<Application>()
        .await
        .into_iter()
        .filter(|a| a.route.to_lowercase().contains(&needle))
        .collect()
}

/// Admin search: numeric queries match the user id, anything else is a
/// case-insensitive substring match on the FIO.
pub async fn search(store: &TableStore, query: &str) -> Vec<Application> {
    let rows = store.read::<Application>().await;
    if let Ok(uid) = query.parse::<i64>() {
        rows.into_iter().filter(|a| a.user_id == uid).collect()
    } else {
        let needle = query.to_lowercase();
        rows.into_iter()
            .filter(|a| a.fio.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Applications submitted in a given `YYYY-MM` month, by timestamp prefix.
pub async fn in_month(store: &TableStore, period: &str) -> Vec<Application> {
    store
        .read::<Application>()
        .await
        .into_iter()
        .filter(|a| a.timestamp.starts_with(period))
        .collect()
}
