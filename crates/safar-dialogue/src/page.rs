// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pagination for the merged request list.

use safar_core::{Action, Button, Keyboard, PageKind};
use safar_store::models::{Application, HotelBooking};

/// Rows per list page.
pub const ITEMS_PER_PAGE: usize = 5;

/// One row of the merged list: either record type, carried whole so the
/// row line and the view button can be derived from it.
#[derive(Debug, Clone)]
pub enum ListItem {
    App(Application),
    Hotel(HotelBooking),
}

impl ListItem {
    /// Submission timestamp, used for the newest-first merge order.
    pub fn timestamp(&self) -> &str {
        match self {
            ListItem::App(a) => &a.timestamp,
            ListItem::Hotel(h) => &h.timestamp,
        }
    }

    fn line(&self) -> String {
        match self {
            ListItem::App(a) => {
                let mut route = a.route.clone();
                if a.is_round_trip {
                    route.push_str(" 🔄");
                }
                format!(
                    "{} #{} — {} | {}",
                    a.status.glyph(),
                    a.id.unwrap_or_default(),
                    route,
                    a.date
                )
            }
            ListItem::Hotel(h) => format!(
                "{} H#{} — {} | {}",
                h.status.glyph(),
                h.id.unwrap_or_default(),
                h.city,
                h.check_in
            ),
        }
    }

    fn view_button(&self) -> Button {
        match self {
            ListItem::App(a) => {
                let id = a.id.unwrap_or_default();
                Button::new(format!("🔍 #{id}"), Action::ViewApp(id))
            }
            ListItem::Hotel(h) => {
                let id = h.id.unwrap_or_default();
                Button::new(format!("🔍 H#{id}"), Action::ViewHotel(id))
            }
        }
    }
}

/// Merge applications and bookings into one newest-first list.
pub fn merge(apps: Vec<Application>, hotels: Vec<HotelBooking>) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = apps
        .into_iter()
        .map(ListItem::App)
        .chain(hotels.into_iter().map(ListItem::Hotel))
        .collect();
    items.sort_by(|a, b| b.timestamp().cmp(a.timestamp()));
    items
}

/// Render one page of `items`.
///
/// The page number is clamped into `1..=pages`, so stale navigation
/// buttons can never go out of range. The keyboard carries a view button
/// per row, back/forward arrows when they apply, and a refresh button
/// that re-requests the current page.
pub fn build_page(items: &[ListItem], page: usize, kind: PageKind) -> (String, Keyboard) {
    let total = items.len();
    let pages = total.div_ceil(ITEMS_PER_PAGE).max(1);
    let page = page.clamp(1, pages);
    let start = (page - 1) * ITEMS_PER_PAGE;
    let chunk = &items[start..(start + ITEMS_PER_PAGE).min(total)];

    let mut keyboard = Keyboard::new();
    let mut lines: Vec<String> = Vec::with_capacity(chunk.len());
    for item in chunk {
        lines.push(item.line());
        keyboard = keyboard.row(vec![item.view_button()]);
    }

    let mut nav = Vec::new();
    if page > 1 {
        nav.push(Button::new("⬅️", Action::Page { kind, page: page - 1 }));
    }
    if page < pages {
        nav.push(Button::new("➡️", Action::Page { kind, page: page + 1 }));
    }
    if !nav.is_empty() {
        keyboard = keyboard.row(nav);
    }
    keyboard = keyboard.row(vec![Button::new("🔄 Обновить", Action::Page { kind, page })]);

    let body = if lines.is_empty() {
        "Пусто.".to_string()
    } else {
        lines.join("\n")
    };
    let text = format!("{body}\n\nСтраница {page}/{pages}. Всего: {total}");

    (text, keyboard)
}
