// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record archival.
//!
//! Archiving snapshots a record into the archive table and removes it from
//! its live table. The snapshot keeps the record's JSON verbatim, so even
//! fields later dropped from the models survive in the archive.

use safar_core::{ItemKind, ItemRef, SafarError};

use crate::models::{iso_now, ArchiveEntry};
use crate::store::TableStore;

/// Move a record to the archive. Returns `false` if the id is not in the
/// live table, which makes a repeated archive press a no-op.
///
/// The archive entry is written before the live table is touched, so a
/// failed archive write leaves the record where it was.
pub async fn archive_item(store: &TableStore, item: ItemRef) -> Result<bool, SafarError> {
    let entry = match item.kind {
        ItemKind::App => {
            let Some(app) = super::applications::by_id(store, item.id).await else {
                return Ok(false);
            };
            snapshot(item, app.timestamp.clone(), app.user_id, &app)?
        }
        ItemKind::Hotel => {
            let Some(booking) = super::hotels::by_id(store, item.id).await else {
                return Ok(false);
            };
            snapshot(item, booking.timestamp.clone(), booking.user_id, &booking)?
        }
    };

    let mut rows = store.read::<ArchiveEntry>().await;
    rows.push(entry);
    store.write(&rows).await?;

    match item.kind {
        ItemKind::App => {
            super::applications::remove(store, item.id).await?;
        }
        ItemKind::Hotel => {
            super::hotels::remove(store, item.id).await?;
        }
    }
    tracing::info!(kind = %item.kind, id = item.id, "record archived");
    Ok(true)
}

/// All archive entries, oldest first.
pub async fn all(store: &TableStore) -> Vec<ArchiveEntry> {
    store.read::<ArchiveEntry>().await
}

fn snapshot<T: serde::Serialize>(
    item: ItemRef,
    timestamp: String,
    user_id: i64,
    record: &T,
) -> Result<ArchiveEntry, SafarError> {
    Ok(ArchiveEntry {
        item_type: item.kind,
        item_id: item.id,
        timestamp,
        user_id,
        data: serde_json::to_string(record).map_err(SafarError::storage)?,
        archived_at: iso_now(),
    })
}
