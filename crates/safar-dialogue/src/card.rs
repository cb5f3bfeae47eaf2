// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record cards.
//!
//! A card is the HTML body plus the keyboard for one record. The admin
//! variant carries the status shortcuts and management buttons; the owner
//! variant only offers cancel and back-to-list.

use safar_core::{Action, Button, ItemKind, ItemRef, Keyboard, PageKind};
use safar_store::models::{Application, HotelBooking};

/// Render an application card.
pub fn application_card(
    app: &Application,
    comments_count: usize,
    for_admin: bool,
) -> (String, Keyboard) {
    let id = app.id.unwrap_or_default();
    let username = app
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| format!("(@{u})"))
        .unwrap_or_default();

    let mut card = format!(
        "✈️ <b>Заявка №{id}</b> {}\n\
         👤 <b>{}</b> {username}\n\
         🛤 Маршрут: <i>{}</i>\n\
         📅 Дата: <code>{}</code> {}\n",
        app.status.glyph(),
        app.fio,
        app.route,
        app.date,
        app.time_of_day,
    );

    if app.is_round_trip {
        card.push_str(&format!(
            "🔄 Обратный маршрут: <i>{}</i>\n📅 Дата возврата: <code>{}</code>\n",
            app.return_route, app.return_date
        ));
    }

    card.push_str(&format!(
        "📝 Причина: {}\n📌 Статус: <b>{}</b>\n💬 Комментарии: {comments_count}",
        app.reason, app.status
    ));

    let item = ItemRef::new(ItemKind::App, id);
    let keyboard = if for_admin {
        Keyboard::new()
            .row(vec![
                status_button("✅ Одобрить", item, "approved"),
                status_button("💰 Оплата", item, "waiting_payment"),
            ])
            .row(vec![
                status_button("🎫 Билет выдан", item, "ticket_issued"),
                status_button("🚉 В пути", item, "in_progress"),
            ])
            .row(vec![
                status_button("✅ Завершено", item, "completed"),
                status_button("❌ Отклонить", item, "rejected"),
            ])
            .row(vec![
                Button::new("✏️ Комментарий", Action::Comment(item)),
                Button::new("📋 Подробнее", Action::Details(item)),
            ])
            .row(vec![Button::new("🗑️ Архивировать", Action::Archive(item))])
    } else {
        Keyboard::new()
            .row(vec![Button::new("❌ Отменить заявку", Action::CancelApp(id))])
            .row(vec![Button::new(
                "◀️ Назад к списку",
                Action::Page {
                    kind: PageKind::Application,
                    page: 1,
                },
            )])
    };

    (card, keyboard)
}

/// Render a hotel booking card.
pub fn hotel_card(
    booking: &HotelBooking,
    comments_count: usize,
    for_admin: bool,
) -> (String, Keyboard) {
    let id = booking.id.unwrap_or_default();
    let username = booking
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| format!("(@{u})"))
        .unwrap_or_default();

    let card = format!(
        "🏨 <b>Бронирование #{id}</b> {}\n\
         👤 <b>{}</b> {username}\n\
         🌍 Город: <i>{}</i>\n\
         📅 Заезд: <code>{}</code> | Выезд: <code>{}</code>\n\
         🛏 Номер: {}\n\
         📌 Статус: <b>{}</b>\n\
         💬 Комментарии: {comments_count}",
        booking.status.glyph(),
        booking.fio,
        booking.city,
        booking.check_in,
        booking.check_out,
        booking.room_type,
        booking.status,
    );

    let item = ItemRef::new(ItemKind::Hotel, id);
    let keyboard = if for_admin {
        Keyboard::new()
            .row(vec![
                status_button("✅ Подтвердить", item, "approved"),
                status_button("💰 Оплата", item, "waiting_payment"),
            ])
            .row(vec![status_button("❌ Отклонить", item, "rejected")])
            .row(vec![
                Button::new("✏️ Комментарий", Action::Comment(item)),
                Button::new("📋 Подробнее", Action::Details(item)),
            ])
            .row(vec![Button::new("🗑️ Архивировать", Action::Archive(item))])
    } else {
        Keyboard::new()
            .row(vec![Button::new("❌ Отменить бронь", Action::CancelHotel(id))])
            .row(vec![Button::new(
                "◀️ Назад к списку",
                Action::Page {
                    kind: PageKind::Hotel,
                    page: 1,
                },
            )])
    };

    (card, keyboard)
}

/// Raw field dump for the admin "Подробнее" button.
pub fn details_text(record: &impl serde::Serialize) -> String {
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => {
            let mut lines: Vec<String> = map
                .iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => format!("{k}: {s}"),
                    other => format!("{k}: {other}"),
                })
                .collect();
            lines.sort();
            lines.join("\n")
        }
        _ => String::new(),
    }
}

fn status_button(label: &str, item: ItemRef, key: &str) -> Button {
    Button::new(
        label,
        Action::SetStatus {
            item,
            key: key.to_string(),
        },
    )
}
