// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-table JSON file store with a TTL read cache.
//!
//! Every table lives in one JSON file holding an array of records. Mutations
//! are whole-table read-modify-write: callers read the full table, change it
//! in memory, and write the full table back. The last writer wins; there is
//! no row-level locking. Reads degrade to an empty table on any I/O or parse
//! failure so a corrupt file never takes the bot down, while write failures
//! propagate and leave the cache intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use safar_core::SafarError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

/// A record type persisted in its own table file.
pub trait Table: Serialize + DeserializeOwned + Send + Sync {
    /// File stem of the table, e.g. `applications` -> `applications.json`.
    const NAME: &'static str;

    /// Row id, if assigned. Rows created by [`next_id`] always have one.
    fn id(&self) -> Option<i64>;
}

/// Generate the id for a new row.
///
/// Empty table starts at 1; otherwise max + 1. If any existing row lacks an
/// id the max is meaningless, so fall back to row count + 1.
pub fn next_id<T: Table>(rows: &[T]) -> i64 {
    if rows.is_empty() {
        return 1;
    }
    let mut max = 0i64;
    for row in rows {
        match row.id() {
            Some(id) => max = max.max(id),
            None => return rows.len() as i64 + 1,
        }
    }
    max + 1
}

struct CacheEntry {
    rows: serde_json::Value,
    fetched_at: Instant,
}

/// File-backed table store shared across handlers.
pub struct TableStore {
    data_dir: PathBuf,
    ttl: Duration,
    cache: RwLock<HashMap<&'static str, CacheEntry>>,
}

impl TableStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        ttl: Duration,
    ) -> Result<Self, SafarError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(SafarError::storage)?;
        Ok(Self {
            data_dir,
            ttl,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Path of a table's backing file.
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    /// Read a full table.
    ///
    /// Serves from the cache while the entry is younger than the TTL.
    /// A missing file is an empty table; a read or parse failure is logged
    /// and also yields an empty table.
    pub async fn read<T: Table>(&self) -> Vec<T> {
        if let Some(rows) = self.cached::<T>().await {
            return rows;
        }

        let value = match self.load_file(T::NAME).await {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(table = T::NAME, error = %err, "table read failed");
                return Vec::new();
            }
        };

        let rows = match decode_rows::<T>(&value) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(table = T::NAME, error = %err, "table decode failed");
                return Vec::new();
            }
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            T::NAME,
            CacheEntry {
                rows: value,
                fetched_at: Instant::now(),
            },
        );
        rows
    }

    /// Replace a full table on disk.
    ///
    /// The cache entry is evicted only after the write succeeds, so a failed
    /// write keeps serving the last durable state.
    pub async fn write<T: Table>(&self, rows: &[T]) -> Result<(), SafarError> {
        let json = serde_json::to_vec_pretty(rows).map_err(SafarError::storage)?;
        let path = self.table_path(T::NAME);
        tokio::fs::write(&path, json)
            .await
            .map_err(SafarError::storage)?;

        self.cache.write().await.remove(T::NAME);
        tracing::info!(table = T::NAME, rows = rows.len(), "table written");
        Ok(())
    }

    /// Drop all cached tables. The next read of each table hits disk.
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }

    async fn cached<T: Table>(&self) -> Option<Vec<T>> {
        if self.ttl.is_zero() {
            return None;
        }
        let cache = self.cache.read().await;
        let entry = cache.get(T::NAME)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        decode_rows(&entry.rows).ok()
    }

    async fn load_file(&self, name: &str) -> Result<serde_json::Value, SafarError> {
        let path = self.table_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(SafarError::storage),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(serde_json::Value::Array(Vec::new()))
            }
            Err(err) => Err(SafarError::storage(err)),
        }
    }

    /// Directory holding the table files, for export commands.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn decode_rows<T: Table>(value: &serde_json::Value) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_value(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{stamp_now, Application};
    use crate::status::Status;
    use tempfile::tempdir;

    fn make_app(id: i64, user_id: i64) -> Application {
        Application {
            id: Some(id),
            timestamp: stamp_now(),
            user_id,
            username: None,
            first_name: None,
            last_name: None,
            fio: format!("User {user_id}"),
            passport_file_id: String::new(),
            route: "Самарканд - Ташкент".to_string(),
            date: "25.12.2025".to_string(),
            time_of_day: String::new(),
            reason: "командировка".to_string(),
            status: Status::Pending,
            return_route: String::new(),
            return_date: String::new(),
            is_round_trip: false,
        }
    }

    async fn open_store(dir: &tempfile::TempDir, ttl: Duration) -> TableStore {
        TableStore::open(dir.path(), ttl).await.unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_table() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir, Duration::from_secs(300)).await;
        let rows: Vec<Application> = store.read().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir, Duration::from_secs(300)).await;

        let rows = vec![make_app(1, 10), make_app(2, 20)];
        store.write(&rows).await.unwrap();

        let back: Vec<Application> = store.read().await;
        assert_eq!(back, rows);
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir, Duration::ZERO).await;
        tokio::fs::write(store.table_path("applications"), b"{ not json")
            .await
            .unwrap();
        let rows: Vec<Application> = store.read().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn stale_cache_is_refreshed_after_write() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir, Duration::from_secs(300)).await;

        store.write(&[make_app(1, 10)]).await.unwrap();
        let first: Vec<Application> = store.read().await;
        assert_eq!(first.len(), 1);

        // Write evicts the cache, so the second read sees the new state.
        store.write(&[make_app(1, 10), make_app(2, 20)]).await.unwrap();
        let second: Vec<Application> = store.read().await;
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn cached_read_ignores_external_file_change() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir, Duration::from_secs(300)).await;

        store.write(&[make_app(1, 10)]).await.unwrap();
        let _: Vec<Application> = store.read().await; // populate cache

        // Out-of-band change is invisible until the TTL expires.
        tokio::fs::write(store.table_path("applications"), b"[]")
            .await
            .unwrap();
        let rows: Vec<Application> = store.read().await;
        assert_eq!(rows.len(), 1);

        store.invalidate_all().await;
        let rows: Vec<Application> = store.read().await;
        assert!(rows.is_empty());
    }

    #[test]
    fn next_id_starts_at_one() {
        let rows: Vec<Application> = Vec::new();
        assert_eq!(next_id(&rows), 1);
    }

    #[test]
    fn next_id_is_max_plus_one() {
        let rows = vec![make_app(3, 1), make_app(7, 2), make_app(5, 3)];
        assert_eq!(next_id(&rows), 8);
    }

    #[test]
    fn next_id_falls_back_to_count_when_ids_missing() {
        let mut rows = vec![make_app(3, 1), make_app(7, 2)];
        rows[1].id = None;
        assert_eq!(next_id(&rows), 3);
    }
}
