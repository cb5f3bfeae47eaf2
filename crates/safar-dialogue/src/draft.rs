// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-progress submission data, accumulated across dialogue steps.

/// Fields collected so far for the current ticket or hotel draft.
///
/// After a successful submission the draft is reset except for the name
/// and passport, which carry into the next submission as prefill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub name: String,
    pub passport_file_id: String,

    // Ticket flow
    pub route: String,
    pub is_round_trip: bool,
    pub date: String,
    pub time_of_day: String,
    pub return_date: String,
    pub return_time_of_day: String,
    pub return_route: String,
    pub reason: String,

    // Hotel flow
    pub hotel_city: String,
    pub hotel_check_in: String,
    pub hotel_check_out: String,
}

impl Draft {
    /// Reset everything except the reusable identity fields.
    pub fn keep_identity(&mut self) {
        *self = Draft {
            name: std::mem::take(&mut self.name),
            passport_file_id: std::mem::take(&mut self.passport_file_id),
            ..Draft::default()
        };
    }

    /// Reverse of "A - B" is "B - A". Routes with any other shape have no
    /// derivable return route.
    pub fn reverse_route(&self) -> Option<String> {
        let parts: Vec<&str> = self.route.split(" - ").collect();
        match parts.as_slice() {
            [a, b] => Some(format!("{b} - {a}")),
            _ => None,
        }
    }
}
