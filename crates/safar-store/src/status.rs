// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record status lifecycle.
//!
//! Statuses are an open vocabulary: the eight built-in stages carry canonical
//! keys, glyphs, and display labels, while anything an admin types free-form
//! (`/set_status app 3 срочно`) round-trips as [`Status::Custom`]. On disk a
//! status is always its display label, so data written by older deployments
//! loads unchanged.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an application or hotel booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Pending,
    WaitingPayment,
    Approved,
    TicketIssued,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
    /// Any label outside the built-in vocabulary, stored verbatim.
    Custom(String),
}

impl Status {
    /// Built-in statuses in lifecycle order.
    pub const BUILTIN: [Status; 8] = [
        Status::Pending,
        Status::WaitingPayment,
        Status::Approved,
        Status::TicketIssued,
        Status::InProgress,
        Status::Completed,
        Status::Rejected,
        Status::Cancelled,
    ];

    /// Display label, exactly as persisted.
    pub fn label(&self) -> &str {
        match self {
            Status::Pending => "🕒 На рассмотрении",
            Status::WaitingPayment => "💰 Ожидает оплаты",
            Status::Approved => "✅ Одобрено",
            Status::TicketIssued => "🎫 Билет выдан",
            Status::InProgress => "🚉 В пути",
            Status::Completed => "✅ Завершено",
            Status::Rejected => "❌ Отклонено",
            Status::Cancelled => "🚫 Отменено",
            Status::Custom(label) => label,
        }
    }

    /// Canonical key used in callback data; `None` for custom statuses.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Status::Pending => Some("pending"),
            Status::WaitingPayment => Some("waiting_payment"),
            Status::Approved => Some("approved"),
            Status::TicketIssued => Some("ticket_issued"),
            Status::InProgress => Some("in_progress"),
            Status::Completed => Some("completed"),
            Status::Rejected => Some("rejected"),
            Status::Cancelled => Some("cancelled"),
            Status::Custom(_) => None,
        }
    }

    /// Colour glyph shown in list rows and cards. Custom statuses
    /// fall back to the neutral circle.
    pub fn glyph(&self) -> &'static str {
        match self {
            Status::Pending => "🟡",
            Status::WaitingPayment => "🟠",
            Status::Approved => "🟢",
            Status::TicketIssued => "🔵",
            Status::InProgress => "🟣",
            Status::Completed => "🟤",
            Status::Rejected => "🔴",
            Status::Cancelled => "⚫",
            Status::Custom(_) => "⚪",
        }
    }

    /// Look up a built-in status by its canonical key.
    pub fn from_key(key: &str) -> Option<Status> {
        Status::BUILTIN
            .into_iter()
            .find(|s| s.key() == Some(key))
    }

    /// Parse a display label back into a status. Labels outside the
    /// built-in vocabulary become [`Status::Custom`].
    pub fn from_label(label: &str) -> Status {
        Status::BUILTIN
            .into_iter()
            .find(|s| s.label() == label)
            .unwrap_or_else(|| Status::Custom(label.to_string()))
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        Status::from_label(&label)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}
