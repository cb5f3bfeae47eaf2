// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket application flow.
//!
//! Name, passport, route, round-trip question, dates, reason, confirm.
//! A returning user with a stored profile skips straight to the passport
//! step with the FIO prefilled. Validation failures re-prompt the same
//! step and never abort the flow.

use safar_core::{Action, Button, Keyboard, Notifier, SafarError, UserInfo};
use safar_store::models::Application;
use safar_store::queries::{applications, users};
use safar_store::{Status, TableStore};
use tracing::{info, warn};

use crate::dates::{is_future_or_today, parse_single_date};
use crate::session::Session;
use crate::state::DialogueState;

/// Route shortcuts offered before free-text entry, two per keyboard row.
pub const POPULAR_ROUTES: [&str; 8] = [
    "Самарканд - Ташкент",
    "Ташкент - Самарканд",
    "Самарканд - Бухара",
    "Бухара - Самарканд",
    "Самарканд - Ургенч",
    "Ургенч - Самарканд",
    "Самарканд - Карши",
    "Карши - Самарканд",
];

/// Enter the ticket flow. With a stored FIO the name step is skipped.
pub async fn start(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
) -> Result<(), SafarError> {
    let profile = users::find(store, user.id).await;
    if let Some(profile) = profile.filter(|p| !p.fio.is_empty()) {
        session.draft.name = profile.fio.clone();
        session.state = Some(DialogueState::Passport);
        notifier
            .send_text(
                user.id,
                &format!(
                    "Я подставил ФИО из профиля: {}\nЕсли хотите изменить — введите новое ФИО. Иначе отправьте фото/скан паспорта:",
                    profile.fio
                ),
            )
            .await?;
    } else {
        session.state = Some(DialogueState::Name { for_hotel: false });
        notifier.send_text(user.id, "📝 Введите ваше ФИО:").await?;
    }
    Ok(())
}

/// Name step, shared with the hotel flow.
pub async fn handle_name(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
    for_hotel: bool,
) -> Result<(), SafarError> {
    let text = text.trim();
    if text.is_empty() {
        notifier
            .send_text(user.id, "ФИО не может быть пустым. Введите ФИО:")
            .await?;
        return Ok(());
    }
    session.draft.name = text.to_string();
    users::upsert(store, user, text, "").await?;

    if for_hotel {
        session.state = Some(DialogueState::HotelCity);
        notifier
            .send_text(user.id, "Теперь укажите город гостиницы:")
            .await?;
    } else {
        session.state = Some(DialogueState::Passport);
        notifier
            .send_text(
                user.id,
                "📷 Прикрепите фото или скан паспорта (или отправьте документ):",
            )
            .await?;
    }
    Ok(())
}

/// A photo or document arrived in the passport step.
pub async fn handle_passport_file(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    file_id: &str,
) -> Result<(), SafarError> {
    session.draft.passport_file_id = file_id.to_string();
    users::upsert(store, user, &session.draft.name, file_id).await?;
    session.state = Some(DialogueState::Route);
    notifier
        .send_card(
            user.id,
            "🛤 Выберите маршрут из популярных или введите свой:",
            route_keyboard(),
        )
        .await
}

/// Text arrived while waiting for the passport. Two or more words are
/// taken as a corrected FIO; anything else is a gentle nudge.
pub async fn handle_passport_text(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    let text = text.trim();
    if text.split_whitespace().count() >= 2 {
        session.draft.name = text.to_string();
        users::upsert(store, user, text, "").await?;
        notifier
            .send_text(user.id, "ФИО обновлено. Теперь прикрепите паспорт (фото/файл).")
            .await
    } else {
        notifier
            .send_text(user.id, "Пожалуйста, отправьте фото или документ с паспортом.")
            .await
    }
}

/// The popular-routes keyboard plus the free-text escape hatch.
pub fn route_keyboard() -> Keyboard {
    let mut keyboard = Keyboard::new();
    for pair in POPULAR_ROUTES.chunks(2) {
        keyboard = keyboard.row(
            pair.iter()
                .map(|route| Button::new(*route, Action::RouteSelect(route.to_string())))
                .collect(),
        );
    }
    keyboard.row(vec![Button::new("✏️ Ввести свой маршрут", Action::RouteCustom)])
}

/// A popular-route button was pressed.
pub async fn handle_route_select(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    route: &str,
) -> Result<(), SafarError> {
    session.draft.route = route.to_string();
    notifier
        .send_text(user.id, &format!("✅ Выбран маршрут: {route}"))
        .await?;
    ask_round_trip(notifier, user, session).await
}

/// The free-text escape hatch was pressed.
pub async fn handle_route_custom(
    notifier: &dyn Notifier,
    user: &UserInfo,
) -> Result<(), SafarError> {
    notifier
        .send_text(
            user.id,
            "✏️ Введите свой маршрут (например: Самарканд - Ташкент):",
        )
        .await
}

/// Free-text route input.
pub async fn handle_route_text(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    session.draft.route = text.trim().to_string();
    ask_round_trip(notifier, user, session).await
}

async fn ask_round_trip(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
) -> Result<(), SafarError> {
    session.state = Some(DialogueState::RoundTrip);
    let keyboard = Keyboard::new()
        .row(vec![Button::new(
            "✅ Да, нужен обратный билет",
            Action::RoundTrip(true),
        )])
        .row(vec![Button::new(
            "❌ Нет, только в один конец",
            Action::RoundTrip(false),
        )]);
    notifier
        .send_card(user.id, "🔄 Нужен ли обратный билет?", keyboard)
        .await
}

/// Round-trip answer; either way the next question is the departure date.
pub async fn handle_round_trip(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    round_trip: bool,
) -> Result<(), SafarError> {
    session.draft.is_round_trip = round_trip;
    session.state = Some(DialogueState::DepartureDate);
    notifier
        .send_text(
            user.id,
            "📅 Укажите дату поездки (например: 25.11.2025 утром):",
        )
        .await
}

/// Departure date input.
pub async fn handle_date(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    let Ok((date, tod)) = parse_single_date(text) else {
        return notifier
            .send_text(
                user.id,
                "❌ Неверный формат. Пример: 25.11.2025 утром. Попробуйте снова:",
            )
            .await;
    };
    if !is_future_or_today(date) {
        return notifier
            .send_text(
                user.id,
                "❌ Дата должна быть сегодня или в будущем. Введите корректную дату:",
            )
            .await;
    }
    session.draft.date = date.format("%d.%m.%Y").to_string();
    session.draft.time_of_day = tod.unwrap_or_default();

    if session.draft.is_round_trip {
        session.state = Some(DialogueState::ReturnDate);
        notifier
            .send_text(
                user.id,
                "📅 Укажите дату обратного билета (например: 30.11.2025 вечером):",
            )
            .await
    } else {
        ask_reason(notifier, user, session).await
    }
}

/// Return date input; must come strictly after the departure date.
pub async fn handle_return_date(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    let Ok((date, tod)) = parse_single_date(text) else {
        return notifier
            .send_text(
                user.id,
                "❌ Неверный формат. Пример: 30.11.2025 вечером. Попробуйте снова:",
            )
            .await;
    };
    if let Ok(departure) =
        chrono::NaiveDate::parse_from_str(&session.draft.date, "%d.%m.%Y")
    {
        if date <= departure {
            return notifier
                .send_text(
                    user.id,
                    "❌ Дата возврата должна быть позже даты отправления. Введите снова:",
                )
                .await;
        }
    }
    session.draft.return_date = date.format("%d.%m.%Y").to_string();
    session.draft.return_time_of_day = tod.unwrap_or_default();

    if let Some(reversed) = session.draft.reverse_route() {
        session.draft.return_route = reversed.clone();
        notifier
            .send_text(user.id, &format!("🔄 Обратный маршрут: {reversed}"))
            .await?;
    }
    ask_reason(notifier, user, session).await
}

async fn ask_reason(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
) -> Result<(), SafarError> {
    session.state = Some(DialogueState::Reason);
    notifier
        .send_text(
            user.id,
            "📝 Укажите причину поездки (например: командировка):",
        )
        .await
}

/// Reason input; builds the confirmation card.
pub async fn handle_reason(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    text: &str,
) -> Result<(), SafarError> {
    session.draft.reason = text.trim().to_string();
    session.state = Some(DialogueState::Confirm);

    let draft = &session.draft;
    let mut card = format!(
        "📋 Проверьте заявку:\n\n\
         👤 <b>{}</b>\n\
         🛤 Маршрут: <i>{}</i>\n\
         📅 Дата: <code>{}</code> {}\n",
        draft.name, draft.route, draft.date, draft.time_of_day
    );
    if draft.is_round_trip {
        card.push_str(&format!(
            "🔄 Обратный билет: <i>{}</i>\n📅 Дата возврата: <code>{}</code> {}\n",
            draft.return_route, draft.return_date, draft.return_time_of_day
        ));
    }
    card.push_str(&format!("📝 Причина: {}\n\n", draft.reason));

    let keyboard = Keyboard::new()
        .row(vec![Button::new("✅ Подтвердить", Action::ConfirmApp)])
        .row(vec![Button::new("❌ Отменить", Action::CancelDraft)]);
    notifier.send_card(user.id, &card, keyboard).await
}

/// Confirm press: persist the draft, notify the administrator, offer
/// follow-up actions. The draft resets down to the identity prefill.
pub async fn confirm(
    store: &TableStore,
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
    admin_id: i64,
) -> Result<(), SafarError> {
    let draft = &session.draft;
    let app = Application {
        id: None,
        timestamp: String::new(),
        user_id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        fio: draft.name.clone(),
        passport_file_id: draft.passport_file_id.clone(),
        route: draft.route.clone(),
        date: draft.date.clone(),
        time_of_day: draft.time_of_day.clone(),
        reason: draft.reason.clone(),
        status: Status::Pending,
        return_route: draft.return_route.clone(),
        return_date: draft.return_date.clone(),
        is_round_trip: draft.is_round_trip,
    };
    let id = applications::insert(store, app).await?;
    info!(user_id = user.id, id, "application submitted");

    let mut admin_msg = format!(
        "📩 Новая заявка #{id} от {} ({})\n{} | {} {}",
        user.display_name(),
        user.id,
        draft.route,
        draft.date,
        draft.time_of_day
    );
    if draft.is_round_trip {
        admin_msg.push_str(&format!(
            "\n🔄 Обратный: {} | {}",
            draft.return_route, draft.return_date
        ));
    }
    if let Err(error) = notifier.send_text(admin_id, &admin_msg).await {
        warn!(%error, "admin notification failed");
    }
    if !draft.passport_file_id.is_empty() {
        if let Err(error) = notifier
            .send_photo(
                admin_id,
                &draft.passport_file_id,
                &format!("Паспорт — заявка #{id}"),
            )
            .await
        {
            warn!(%error, "passport forward failed");
        }
    }

    let keyboard = Keyboard::new()
        .row(vec![Button::new(
            "🏨 Забронировать гостиницу",
            Action::StartHotel,
        )])
        .row(vec![Button::new("📋 Мои заявки", Action::MyRequests)])
        .row(vec![Button::new("📝 Заполнить новую заявку", Action::StartApp)]);

    // The record is already saved, so leave the confirm state before the
    // final send. A failed send must not leave the button armed for a
    // second insert.
    session.end_flow();
    notifier
        .send_card(
            user.id,
            "✅ Заявка сохранена и отправлена администратору.",
            keyboard,
        )
        .await?;
    Ok(())
}

/// Cancel press on the confirmation card.
pub async fn cancel_draft(
    notifier: &dyn Notifier,
    user: &UserInfo,
    session: &mut Session,
) -> Result<(), SafarError> {
    session.end_flow();
    notifier
        .send_text(
            user.id,
            "❌ Заявка отменена. Вы можете начать заново командой /start",
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_test_utils::RecordingNotifier;
    use std::time::Duration;
    use tempfile::tempdir;

    fn user() -> UserInfo {
        UserInfo {
            id: 42,
            username: Some("maria".to_string()),
            first_name: Some("Maria".to_string()),
            last_name: Some("Ivanova".to_string()),
        }
    }

    async fn setup() -> (TableStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn start_without_profile_asks_for_name() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();

        start(&store, &notifier, &user(), &mut session).await.unwrap();
        assert_eq!(session.state, Some(DialogueState::Name { for_hotel: false }));
        assert_eq!(notifier.texts()[0].1, "📝 Введите ваше ФИО:");
    }

    #[tokio::test]
    async fn start_with_profile_prefills_and_skips_to_passport() {
        let (store, _dir) = setup().await;
        users::upsert(&store, &user(), "Иванова Мария", "")
            .await
            .unwrap();
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();

        start(&store, &notifier, &user(), &mut session).await.unwrap();
        assert_eq!(session.state, Some(DialogueState::Passport));
        assert_eq!(session.draft.name, "Иванова Мария");
        assert!(notifier.texts()[0]
            .1
            .starts_with("Я подставил ФИО из профиля: Иванова Мария"));
    }

    #[tokio::test]
    async fn name_step_saves_profile_and_asks_for_passport() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();

        handle_name(&store, &notifier, &user(), &mut session, " Иванова Мария ", false)
            .await
            .unwrap();
        assert_eq!(session.state, Some(DialogueState::Passport));
        assert_eq!(
            users::find(&store, 42).await.unwrap().fio,
            "Иванова Мария"
        );
    }

    #[tokio::test]
    async fn empty_name_reprompts() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();

        handle_name(&store, &notifier, &user(), &mut session, "  ", false)
            .await
            .unwrap();
        assert_eq!(session.state, None);
        assert_eq!(notifier.texts()[0].1, "ФИО не может быть пустым. Введите ФИО:");
    }

    #[tokio::test]
    async fn passport_file_moves_to_route_keyboard() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.draft.name = "Иванова Мария".to_string();

        handle_passport_file(&store, &notifier, &user(), &mut session, "file-9")
            .await
            .unwrap();
        assert_eq!(session.state, Some(DialogueState::Route));
        let keyboard = notifier.last_keyboard(42).unwrap();
        // 4 rows of popular routes plus the custom-route row.
        assert_eq!(keyboard.rows.len(), 5);
        assert_eq!(
            keyboard.rows[0][0].action.encode(),
            "route_select:Самарканд - Ташкент"
        );
    }

    #[tokio::test]
    async fn two_word_text_in_passport_step_replaces_name() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.state = Some(DialogueState::Passport);

        handle_passport_text(&store, &notifier, &user(), &mut session, "Петрова Анна")
            .await
            .unwrap();
        assert_eq!(session.draft.name, "Петрова Анна");
        assert_eq!(session.state, Some(DialogueState::Passport));
    }

    #[tokio::test]
    async fn past_departure_date_reprompts() {
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.state = Some(DialogueState::DepartureDate);

        handle_date(&notifier, &user(), &mut session, "01.01.2020")
            .await
            .unwrap();
        assert_eq!(session.state, Some(DialogueState::DepartureDate));
        assert!(notifier.texts()[0].1.contains("сегодня или в будущем"));
    }

    #[tokio::test]
    async fn return_date_must_follow_departure() {
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.draft.date = "25.12.2030".to_string();
        session.state = Some(DialogueState::ReturnDate);

        handle_return_date(&notifier, &user(), &mut session, "20.12.2030")
            .await
            .unwrap();
        assert_eq!(session.state, Some(DialogueState::ReturnDate));
        assert!(notifier.texts()[0].1.contains("позже даты отправления"));

        handle_return_date(&notifier, &user(), &mut session, "30.12.2030 вечером")
            .await
            .unwrap();
        assert_eq!(session.draft.return_date, "30.12.2030");
        assert_eq!(session.state, Some(DialogueState::Reason));
    }

    #[tokio::test]
    async fn round_trip_reason_builds_full_card() {
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.draft.name = "Иванова Мария".to_string();
        session.draft.route = "Самарканд - Ташкент".to_string();
        session.draft.date = "25.12.2030".to_string();
        session.draft.time_of_day = "утром".to_string();
        session.draft.is_round_trip = true;
        session.draft.return_route = "Ташкент - Самарканд".to_string();
        session.draft.return_date = "30.12.2030".to_string();

        handle_reason(&notifier, &user(), &mut session, "командировка")
            .await
            .unwrap();
        assert_eq!(session.state, Some(DialogueState::Confirm));
        let cards = notifier.cards();
        assert!(cards[0].1.starts_with("📋 Проверьте заявку:"));
        assert!(cards[0].1.contains("🔄 Обратный билет: <i>Ташкент - Самарканд</i>"));
        let encoded: Vec<String> =
            cards[0].2.buttons().map(|b| b.action.encode()).collect();
        assert_eq!(encoded, vec!["confirm_app", "cancel_app"]);
    }

    #[tokio::test]
    async fn confirm_persists_and_notifies_admin() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::new();
        let mut session = Session::default();
        session.draft.name = "Иванова Мария".to_string();
        session.draft.passport_file_id = "file-9".to_string();
        session.draft.route = "Самарканд - Ташкент".to_string();
        session.draft.date = "25.12.2030".to_string();
        session.draft.time_of_day = "утром".to_string();
        session.draft.reason = "командировка".to_string();
        session.state = Some(DialogueState::Confirm);

        confirm(&store, &notifier, &user(), &mut session, 777)
            .await
            .unwrap();

        let saved = applications::all(&store).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, Some(1));
        assert_eq!(saved[0].fio, "Иванова Мария");
        assert_eq!(saved[0].status, Status::Pending);

        let admin_texts = notifier.messages_to(777);
        assert!(admin_texts[0].starts_with("📩 Новая заявка #1 от Maria Ivanova (42)"));
        let photos = notifier.photos();
        assert_eq!(photos[0].0, 777);
        assert_eq!(photos[0].2, "Паспорт — заявка #1");

        // Flow over; identity preserved for the next submission.
        assert_eq!(session.state, None);
        assert_eq!(session.draft.name, "Иванова Мария");
        assert!(session.draft.route.is_empty());
    }

    #[tokio::test]
    async fn admin_send_failure_does_not_lose_the_application() {
        let (store, _dir) = setup().await;
        // Every send fails; the record must still be persisted.
        let notifier = RecordingNotifier::failing();
        let mut session = Session::default();
        session.draft.name = "Иванова Мария".to_string();
        session.draft.route = "А - Б".to_string();
        session.draft.date = "25.12.2030".to_string();

        let result = confirm(&store, &notifier, &user(), &mut session, 777).await;
        assert!(result.is_err());
        assert_eq!(applications::all(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn failed_final_send_still_ends_the_flow() {
        let (store, _dir) = setup().await;
        let notifier = RecordingNotifier::failing();
        let mut session = Session::default();
        session.draft.name = "Иванова Мария".to_string();
        session.draft.route = "А - Б".to_string();
        session.draft.date = "25.12.2030".to_string();
        session.state = Some(DialogueState::Confirm);

        assert!(confirm(&store, &notifier, &user(), &mut session, 777)
            .await
            .is_err());
        // The record is saved exactly once and the confirm card is disarmed,
        // so pressing it again cannot insert a duplicate.
        assert_eq!(session.state, None);
        assert_eq!(applications::all(&store).await.len(), 1);
    }
}
