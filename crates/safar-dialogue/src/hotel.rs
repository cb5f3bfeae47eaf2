// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hotel booking flow.
//!
//! Name, city, date range, room type. The city step doubles as a late
//! FIO correction: two or more words without an "@" are taken as a new
//! name, since city names here are single words and handles are not.

use safar_core::{Action, Button, Keyboard, Notifier, RoomType, SafarError, UserInfo};
use safar_store::models::HotelBooking;
use safar_store::queries::{hotels, users};
use safar_store::{Status, TableStore};
use tracing::{info, warn};

use crate::dates::{is_future_or_today, parse_date_range};
use crate::session::Session;
use crate::state::DialogueState;

/// Enter the hotel flow. With a stored FIO the name step is skipped.
pub async fn start(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
) -> Result<(), SafarError> {
    let profile = users::find(store, user.id).await;
    if let Some(profile) = profile.filter(|p| !p.fio.is_empty()) {
        session.draft.name = profile.fio.clone();
        session.state = Some(DialogueState::HotelCity);
        notifier
            .send_text(
                user.id,
                &format!(
                    "Я подставил ФИО из профиля: {}\nЕсли хотите изменить — введите новое ФИО. Иначе введите город гостиницы:",
                    profile.fio
                ),
            )
            .await?;
    } else {
        session.state = Some(DialogueState::Name { for_hotel: true });
        notifier.send_text(user.id, "🏨 Введите ваше ФИО:").await?;
    }
    Ok(())
}

/// City step. FIO-looking input updates the profile instead.
pub async fn handle_city(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    let text = text.trim();
    if text.split_whitespace().count() >= 2 && !text.contains('@') {
        session.draft.name = text.to_string();
        users::upsert(store, user, text, "").await?;
        return notifier
            .send_text(user.id, "ФИО сохранено. Теперь укажите город гостиницы:")
            .await;
    }

    session.draft.hotel_city = text.to_string();
    session.state = Some(DialogueState::HotelDates);
    notifier
        .send_text(user.id, "📅 Введите заезд и выезд как: DD.MM.YYYY - DD.MM.YYYY")
        .await
}

/// Check-in/check-out range. Both dates must be today or later and the
/// stay must be at least one night.
pub async fn handle_dates(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    let Ok((check_in, check_out)) = parse_date_range(text) else {
        return notifier
            .send_text(user.id, "❌ Неверный формат. Пример: 11.11.2025 - 20.11.2025")
            .await;
    };
    if !(is_future_or_today(check_in) && is_future_or_today(check_out)) {
        return notifier
            .send_text(
                user.id,
                "❌ Даты должны быть сегодня или в будущем. Введите снова:",
            )
            .await;
    }
    if check_out <= check_in {
        return notifier
            .send_text(
                user.id,
                "❌ Дата выезда должна быть позже заезда. Введите снова:",
            )
            .await;
    }

    session.draft.hotel_check_in = check_in.format("%d.%m.%Y").to_string();
    session.draft.hotel_check_out = check_out.format("%d.%m.%Y").to_string();
    session.state = Some(DialogueState::HotelRoom);

    let mut keyboard = Keyboard::new();
    for room in RoomType::ALL {
        keyboard = keyboard.row(vec![Button::new(room.button_label(), Action::Room(room))]);
    }
    notifier
        .send_card(user.id, "Выберите тип номера:", keyboard)
        .await
}

/// Room pick: the booking is complete and persists immediately.
pub async fn handle_room(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    room: RoomType,
    admin_id: i64,
) -> Result<(), SafarError> {
    let draft = &session.draft;
    let booking = HotelBooking {
        id: None,
        timestamp: String::new(),
        user_id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        fio: draft.name.clone(),
        city: draft.hotel_city.clone(),
        check_in: draft.hotel_check_in.clone(),
        check_out: draft.hotel_check_out.clone(),
        room_type: room.label().to_string(),
        status: Status::Pending,
    };
    let id = hotels::insert(store, booking).await?;
    info!(user_id = user.id, id, "hotel booking submitted");

    let admin_msg = format!(
        "🏨 Новая бронь #{id} от {}: {} | {} - {} | {}",
        user.display_name(),
        draft.hotel_city,
        draft.hotel_check_in,
        draft.hotel_check_out,
        room.label()
    );
    if let Err(error) = notifier.send_text(admin_id, &admin_msg).await {
        warn!(%error, "admin notification failed");
    }

    let keyboard = Keyboard::new().row(vec![Button::new("📝 Новая заявка", Action::StartApp)]);

    // Leave the room-pick state before the final send, so a failed send
    // cannot arm the buttons for a second insert.
    session.end_flow();
    notifier
        .send_card(
            user.id,
            "✅ Бронирование сохранено и отправлено админу.",
            keyboard,
        )
        .await?;
    Ok(())
}
