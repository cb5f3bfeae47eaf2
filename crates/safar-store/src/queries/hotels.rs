// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hotel booking CRUD operations.

use safar_core::SafarError;

use crate::models::{stamp_now, HotelBooking};
use crate::status::Status;
use crate::store::{next_id, TableStore};

/// Insert a new booking, assigning its id and timestamp.
pub async fn insert(store: &TableStore, mut booking: HotelBooking) -> Result<i64, SafarError> {
    let mut rows = store.read::<HotelBooking>().await;
    let id = next_id(&rows);
    booking.id = Some(id);
    if booking.timestamp.is_empty() {
        booking.timestamp = stamp_now();
    }
    rows.push(booking);
    store.write(&rows).await?;
    Ok(id)
}

/// All bookings in insertion order.
pub async fn all(store: &TableStore) -> Vec<HotelBooking> {
    store.read::<HotelBooking>().await
}

/// Find one booking by id.
pub async fn by_id(store: &TableStore, id: i64) -> Option<HotelBooking> {
    store
        .read::<HotelBooking>()
        .await
        .into_iter()
        .find(|h| h.id == Some(id))
}

/// A user's bookings, newest first.
pub async fn for_user(store: &TableStore, user_id: i64) -> Vec<HotelBooking> {
    let mut rows: Vec<HotelBooking> = store
        .read::<HotelBooking>()
        .await
        .into_iter()
        .filter(|h| h.user_id == user_id)
        .collect();
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rows
}

/// Overwrite a booking's status. Returns the updated record, or `None`
/// if the id does not exist.
pub async fn set_status(
    store: &TableStore,
    id: i64,
    status: Status,
) -> Result<Option<HotelBooking>, SafarError> {
    let mut rows = store.read::<HotelBooking>().await;
    let Some(row) = rows.iter_mut().find(|h| h.id == Some(id)) else {
        return Ok(None);
    };
    row.status = status;
    let updated = row.clone();
    store.write(&rows).await?;
    Ok(Some(updated))
}

/// Remove a booking from the live table. Returns the removed record.
pub async fn remove(store: &TableStore, id: i64) -> Result<Option<HotelBooking>, SafarError> {
    let mut rows = store.read::<HotelBooking>().await;
    let Some(pos) = rows.iter().position(|h| h.id == Some(id)) else {
        return Ok(None);
    };
    let removed = rows.remove(pos);
    store.write(&rows).await?;
    Ok(Some(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn make_booking(user_id: i64, city: &str) -> HotelBooking {
        HotelBooking {
            id: None,
            timestamp: String::new(),
            user_id,
            username: None,
            first_name: None,
            last_name: None,
            fio: format!("User {user_id}"),
            city: city.to_string(),
            check_in: "01.01.2026".to_string(),
            check_out: "03.01.2026".to_string(),
            room_type: "Семейный".to_string(),
            status: Status::Pending,
        }
    }

    async fn setup() -> (TableStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trips() {
        let (store, _dir) = setup().await;
        let id = insert(&store, make_booking(5, "Бухара")).await.unwrap();
        assert_eq!(id, 1);

        let booking = by_id(&store, id).await.unwrap();
        assert_eq!(booking.city, "Бухара");
        assert_eq!(booking.status, Status::Pending);
    }

    #[tokio::test]
    async fn remove_returns_the_record_once() {
        let (store, _dir) = setup().await;
        let id = insert(&store, make_booking(5, "Хива")).await.unwrap();

        let removed = remove(&store, id).await.unwrap();
        assert_eq!(removed.unwrap().city, "Хива");

        // Second removal finds nothing.
        assert!(remove(&store, id).await.unwrap().is_none());
        assert!(all(&store).await.is_empty());
    }

    #[tokio::test]
    async fn set_status_accepts_custom_labels() {
        let (store, _dir) = setup().await;
        let id = insert(&store, make_booking(5, "Бухара")).await.unwrap();

        let custom = Status::Custom("❌ Отменено пользователем".to_string());
        let updated = set_status(&store, id, custom.clone()).await.unwrap();
        assert_eq!(updated.unwrap().status, custom);
    }
}
