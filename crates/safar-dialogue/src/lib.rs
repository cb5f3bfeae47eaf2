// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation engine for the Safar booking bot.
//!
//! This crate holds everything between the channel adapter and the store:
//! the per-user session state machine, the ticket and hotel flows, record
//! cards and pagination, comment handling, the status lifecycle, and the
//! admin command surface. The [`DialogueEngine`] is the single entry
//! point; it consumes channel-agnostic [`Event`]s and talks back through
//! the `Notifier` seam.

pub mod admin;
pub mod card;
pub mod comment;
pub mod dates;
pub mod draft;
pub mod engine;
pub mod hotel;
pub mod lifecycle;
pub mod page;
pub mod session;
pub mod state;
pub mod ticket;

pub use engine::{DialogueEngine, Event};
pub use session::Session;
pub use state::DialogueState;
