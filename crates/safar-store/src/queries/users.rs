// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile operations.
//!
//! Profiles remember the FIO and passport file across submissions so a
//! returning user skips the re-entry steps.

use safar_core::{SafarError, UserInfo};

use crate::models::{iso_now, UserProfile};
use crate::store::TableStore;

/// Find a profile by Telegram user id.
pub async fn find(store: &TableStore, user_id: i64) -> Option<UserProfile> {
    store
        .read::<UserProfile>()
        .await
        .into_iter()
        .find(|u| u.user_id == user_id)
}

/// Create or update a profile.
///
/// A new user gets a full row with the registration timestamp. For an
/// existing user only non-empty `fio` / `passport_file_id` values overwrite
/// what is stored, so partial progress never erases known data.
pub async fn upsert(
    store: &TableStore,
    user: &UserInfo,
    fio: &str,
    passport_file_id: &str,
) -> Result<(), SafarError> {
    let mut rows = store.read::<UserProfile>().await;

    match rows.iter_mut().find(|u| u.user_id == user.id) {
        Some(existing) => {
            if !fio.is_empty() {
                existing.fio = fio.to_string();
            }
            if !passport_file_id.is_empty() {
                existing.passport_file_id = passport_file_id.to_string();
            }
        }
        None => rows.push(UserProfile {
            user_id: user.id,
            fio: fio.to_string(),
            passport_file_id: passport_file_id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            registered: iso_now(),
        }),
    }

    store.write(&rows).await
}
