// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file persistence layer for the Safar booking bot.
//!
//! Provides a whole-table read-modify-write store with a 5-minute TTL read
//! cache, typed record models matching the historical column layout, the
//! open status vocabulary, and per-table query modules.

pub mod models;
pub mod queries;
pub mod status;
pub mod store;

pub use models::*;
pub use status::Status;
pub use store::{next_id, Table, TableStore};
