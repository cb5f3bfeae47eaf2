// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment operations.
//!
//! Comments reference records by (kind, id) and are never deleted, so a
//! comment can outlive its record. Orphaned comments stay readable.

use safar_core::{ItemRef, SafarError};

use crate::models::{iso_now, Comment};
use crate::store::{next_id, TableStore};

/// Attach a comment to a record. Returns the comment id.
pub async fn add(
    store: &TableStore,
    item: ItemRef,
    user_id: i64,
    text: &str,
    is_internal: bool,
) -> Result<i64, SafarError> {
    let mut rows = store.read::<Comment>().await;
    let id = next_id(&rows);
    rows.push(Comment {
        id: Some(id),
        timestamp: iso_now(),
        item_type: item.kind,
        item_id: item.id,
        user_id,
        text: text.to_string(),
        is_internal,
    });
    store.write(&rows).await?;
    Ok(id)
}

/// Comments on a record, oldest first. Internal comments are included
/// only when `include_internal` is set.
pub async fn for_item(
    store: &TableStore,
    item: ItemRef,
    include_internal: bool,
) -> Vec<Comment> {
    store
        .read::<Comment>()
        .await
        .into_iter()
        .filter(|c| c.item_type == item.kind && c.item_id == item.id)
        .filter(|c| include_internal || !c.is_internal)
        .collect()
}

/// Number of public comments on a record, shown on its card.
pub async fn public_count(store: &TableStore, item: ItemRef) -> usize {
    for_item(store, item, false).await.len()
}
