// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue states.
//!
//! Each state names exactly one question the bot is waiting to have
//! answered. The ticket and hotel flows share the opening name/identity
//! steps and then diverge.

use safar_core::ItemRef;

/// What the bot asked last, i.e. what the next message should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueState {
    /// Waiting for the FIO. `for_hotel` remembers which flow asked.
    Name { for_hotel: bool },
    /// Waiting for a passport photo or document (ticket flow only).
    /// A two-word text here is treated as a corrected FIO instead.
    Passport,
    /// Waiting for a route pick or free-text route.
    Route,
    /// Waiting for the round-trip yes/no answer.
    RoundTrip,
    /// Waiting for the departure date text.
    DepartureDate,
    /// Waiting for the return date text (round trips only).
    ReturnDate,
    /// Waiting for the trip reason.
    Reason,
    /// Waiting for the confirm/cancel press on the draft card.
    Confirm,
    /// Waiting for the hotel city. A two-word text without "@" is
    /// treated as a corrected FIO instead.
    HotelCity,
    /// Waiting for the check-in/check-out date range.
    HotelDates,
    /// Waiting for the room-type pick.
    HotelRoom,
    /// Admin is typing a comment for `item`.
    CommentText { item: ItemRef, internal: bool },
}
