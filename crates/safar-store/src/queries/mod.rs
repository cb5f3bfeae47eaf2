// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Table query modules, one per record type.

pub mod applications;
pub mod archive;
pub mod comments;
pub mod hotels;
pub mod users;
