// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record models for the per-table JSON files.
//!
//! Field names are serde-renamed to the historical column names so that
//! files produced by earlier deployments of the bot deserialize as-is.
//! Optional text columns default to the empty string, matching how the
//! legacy exporter wrote absent values.

use chrono::{Local, NaiveDate};
use safar_core::ItemKind;
use serde::{Deserialize, Serialize};

use crate::status::Status;
use crate::store::Table;

/// Dates are stored and displayed as `DD.MM.YYYY`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Current local time in the `Timestamp` column format.
pub fn stamp_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current local time in ISO format, used for registration and archive
/// timestamps.
pub fn iso_now() -> String {
    Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// A ticket application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "FIO", default)]
    pub fio: String,
    #[serde(rename = "PassportFileID", default)]
    pub passport_file_id: String,
    #[serde(rename = "Route", default)]
    pub route: String,
    /// Departure date as `DD.MM.YYYY`.
    #[serde(rename = "Date", default)]
    pub date: String,
    /// Optional time-of-day token (`утром`, `днём`, `вечером`, `ночью`).
    #[serde(rename = "TimeOfDay", default)]
    pub time_of_day: String,
    #[serde(rename = "Reason", default)]
    pub reason: String,
    #[serde(rename = "Status", default)]
    pub status: Status,
    #[serde(rename = "ReturnRoute", default)]
    pub return_route: String,
    #[serde(rename = "ReturnDate", default)]
    pub return_date: String,
    #[serde(rename = "IsRoundTrip", default)]
    pub is_round_trip: bool,
}

impl Application {
    /// Parsed departure date, if the stored string is well-formed.
    pub fn departure(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

impl Table for Application {
    const NAME: &'static str = "applications";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// A hotel booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelBooking {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "FIO", default)]
    pub fio: String,
    #[serde(rename = "HotelCity", default)]
    pub city: String,
    /// Check-in date as `DD.MM.YYYY`.
    #[serde(rename = "CheckIn", default)]
    pub check_in: String,
    #[serde(rename = "CheckOut", default)]
    pub check_out: String,
    #[serde(rename = "RoomType", default)]
    pub room_type: String,
    #[serde(rename = "Status", default)]
    pub status: Status,
}

impl HotelBooking {
    /// Parsed check-in date, if the stored string is well-formed.
    pub fn check_in_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.check_in, DATE_FORMAT).ok()
    }
}

impl Table for HotelBooking {
    const NAME: &'static str = "hotels";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// A known user and the profile data reused to prefill new drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "FIO", default)]
    pub fio: String,
    #[serde(rename = "PassportFileID", default)]
    pub passport_file_id: String,
    #[serde(rename = "Username", default)]
    pub username: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Registered", default)]
    pub registered: String,
}

impl Table for UserProfile {
    const NAME: &'static str = "users";

    fn id(&self) -> Option<i64> {
        // User profiles are keyed by Telegram id, not a generated row id.
        Some(self.user_id)
    }
}

/// An admin comment attached to an application or booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "ID")]
    pub id: Option<i64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "ItemType")]
    pub item_type: ItemKind,
    #[serde(rename = "ItemID")]
    pub item_id: i64,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "Comment", default)]
    pub text: String,
    /// Internal comments are visible to the admin only.
    #[serde(rename = "IsInternal", default)]
    pub is_internal: bool,
}

impl Table for Comment {
    const NAME: &'static str = "comments";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// An archived record, frozen as the JSON it had at archival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(rename = "Type")]
    pub item_type: ItemKind,
    #[serde(rename = "ID")]
    pub item_id: i64,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    /// Serialized snapshot of the archived record.
    #[serde(rename = "Data", default)]
    pub data: String,
    #[serde(rename = "ArchivedAt", default)]
    pub archived_at: String,
}

impl Table for ArchiveEntry {
    const NAME: &'static str = "archive";

    fn id(&self) -> Option<i64> {
        Some(self.item_id)
    }
}
