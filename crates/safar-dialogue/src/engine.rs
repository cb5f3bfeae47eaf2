// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue engine: one entry point per incoming event.
//!
//! The engine owns all per-user sessions and routes every event to the
//! flow handlers. It speaks only through the [`Notifier`] seam, so the
//! whole conversation logic runs in tests without a live channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use safar_core::{
    Action, Button, ItemKind, ItemRef, Keyboard, Notifier, PageKind, ReportRenderer,
    SafarError, UserInfo,
};
use safar_store::queries::{applications, comments, hotels};
use safar_store::{Status, TableStore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::admin::{self, HELP_TEXT, HELP_TEXT_ADMIN};
use crate::card::{application_card, details_text, hotel_card};
use crate::comment;
use crate::hotel;
use crate::lifecycle;
use crate::page::{build_page, merge};
use crate::session::Session;
use crate::state::DialogueState;
use crate::ticket;

/// An incoming update, already stripped of channel specifics.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A slash command with its argument tail.
    Command { name: String, args: String },
    /// A plain text message.
    Text(String),
    /// A photo, referenced by the channel file id.
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    /// A document, referenced by the channel file id.
    Document {
        file_id: String,
        caption: Option<String>,
    },
    /// An inline button press.
    Action(Action),
}

/// Conversation engine shared by all users.
pub struct DialogueEngine {
    store: Arc<TableStore>,
    notifier: Arc<dyn Notifier>,
    report: Arc<dyn ReportRenderer>,
    admin_id: i64,
    forward_timeout: Duration,
    // One event at a time; matches the single-writer assumptions of the
    // whole-table store.
    sessions: Mutex<HashMap<i64, Session>>,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<TableStore>,
        notifier: Arc<dyn Notifier>,
        report: Arc<dyn ReportRenderer>,
        admin_id: i64,
        forward_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            report,
            admin_id,
            forward_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn is_admin(&self, user: &UserInfo) -> bool {
        user.id == self.admin_id
    }

    /// Handle one event from one user.
    pub async fn handle(&self, user: &UserInfo, event: Event) -> Result<(), SafarError> {
        metrics::counter!("safar_events_total").increment(1);
        debug!(user_id = user.id, ?event, "event received");

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user.id).or_default();

        match event {
            Event::Command { name, args } => {
                self.handle_command(user, session, &name, &args).await
            }
            Event::Text(text) => {
                if self.intercept_forward(user, session, Some(&text), None, None).await? {
                    return Ok(());
                }
                self.handle_text(user, session, &text).await
            }
            Event::Photo { file_id, caption } => {
                if self
                    .intercept_forward(user, session, None, Some(&file_id), caption.as_deref())
                    .await?
                {
                    return Ok(());
                }
                if session.state == Some(DialogueState::Passport) {
                    ticket::handle_passport_file(
                        &self.store,
                        self.notifier.as_ref(),
                        user,
                        session,
                        &file_id,
                    )
                    .await?;
                }
                Ok(())
            }
            Event::Document { file_id, caption } => {
                if self
                    .intercept_forward_document(user, session, &file_id, caption.as_deref())
                    .await?
                {
                    return Ok(());
                }
                if session.state == Some(DialogueState::Passport) {
                    ticket::handle_passport_file(
                        &self.store,
                        self.notifier.as_ref(),
                        user,
                        session,
                        &file_id,
                    )
                    .await?;
                }
                Ok(())
            }
            Event::Action(action) => self.handle_action(user, session, action).await,
        }
    }

    async fn handle_command(
        &self,
        user: &UserInfo,
        session: &mut Session,
        name: &str,
        args: &str,
    ) -> Result<(), SafarError> {
        let store = self.store.as_ref();
        let notifier = self.notifier.as_ref();

        match name {
            "start" => self.send_start_menu(user).await,
            "help" => self.send_help(user).await,
            "search_date" => {
                admin::search_date(store, notifier, user.id, args, self.is_admin(user)).await
            }
            "search_city" => {
                admin::search_city(store, notifier, user.id, args, self.is_admin(user)).await
            }
            "done" => admin::done(notifier, session, user.id).await,
            "admin_all" | "admin_pending" | "admin_search" | "dashboard" | "set_status"
            | "send_ticket" | "get_db" | "report_user" | "report_period" | "reminders" => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                match name {
                    "admin_all" => admin::admin_all(store, notifier, user.id).await,
                    "admin_pending" => admin::admin_pending(store, notifier, user.id).await,
                    "admin_search" => admin::admin_search(store, notifier, user.id, args).await,
                    "dashboard" => admin::dashboard(store, notifier, user.id).await,
                    "set_status" => {
                        admin::set_status_command(store, notifier, user.id, args).await
                    }
                    "send_ticket" => admin::send_ticket(notifier, session, user.id, args).await,
                    "get_db" => admin::get_db(store, notifier, user.id).await,
                    "report_user" => {
                        admin::report_user(store, notifier, self.report.as_ref(), user.id, args)
                            .await
                    }
                    "report_period" => {
                        admin::report_period(
                            store,
                            notifier,
                            self.report.as_ref(),
                            user.id,
                            args,
                        )
                        .await
                    }
                    _ => admin::run_reminders(store, notifier, user.id).await,
                }
            }
            "clear_db" => {
                if !self.is_admin(user) {
                    return notifier
                        .send_text(user.id, "⛔ Только админ может очищать базу данных.")
                        .await;
                }
                admin::clear_db_prompt(notifier, user.id).await
            }
            _ => {
                debug!(user_id = user.id, command = name, "unknown command ignored");
                Ok(())
            }
        }
    }

    async fn handle_text(
        &self,
        user: &UserInfo,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SafarError> {
        let store = self.store.as_ref();
        let notifier = self.notifier.as_ref();

        // Reply-keyboard shortcuts work from any state.
        match text {
            "✈ Новая заявка" => return ticket::start(store, notifier, user, session).await,
            "🏨 Забронировать отель" => {
                return hotel::start(store, notifier, user, session).await
            }
            "📝 Мои заявки" => return self.my_requests(user, session).await,
            "ℹ Помощь" => return self.send_help(user).await,
            _ => {}
        }

        match session.state.clone() {
            Some(DialogueState::Name { for_hotel }) => {
                ticket::handle_name(store, notifier, user, session, text, for_hotel).await
            }
            Some(DialogueState::Passport) => {
                ticket::handle_passport_text(store, notifier, user, session, text).await
            }
            Some(DialogueState::Route) => {
                ticket::handle_route_text(notifier, user, session, text).await
            }
            Some(DialogueState::DepartureDate) => {
                ticket::handle_date(notifier, user, session, text).await
            }
            Some(DialogueState::ReturnDate) => {
                ticket::handle_return_date(notifier, user, session, text).await
            }
            Some(DialogueState::Reason) => {
                ticket::handle_reason(notifier, user, session, text).await
            }
            Some(DialogueState::HotelCity) => {
                hotel::handle_city(store, notifier, user, session, text).await
            }
            Some(DialogueState::HotelDates) => {
                hotel::handle_dates(notifier, user, session, text).await
            }
            Some(DialogueState::CommentText { item, internal }) => {
                let id =
                    comment::add(store, notifier, item, user.id, text, internal).await?;
                session.state = None;
                notifier
                    .send_text(user.id, &format!("✅ Комментарий #{id} добавлен"))
                    .await
            }
            // Button-only states and idle text are ignored.
            Some(DialogueState::RoundTrip)
            | Some(DialogueState::Confirm)
            | Some(DialogueState::HotelRoom)
            | None => Ok(()),
        }
    }

    async fn handle_action(
        &self,
        user: &UserInfo,
        session: &mut Session,
        action: Action,
    ) -> Result<(), SafarError> {
        let store = self.store.as_ref();
        let notifier = self.notifier.as_ref();

        match action {
            Action::StartApp => ticket::start(store, notifier, user, session).await,
            Action::StartHotel => hotel::start(store, notifier, user, session).await,
            Action::MyRequests => self.my_requests(user, session).await,
            Action::Help => self.send_help(user).await,

            Action::RouteSelect(route) if session.state == Some(DialogueState::Route) => {
                ticket::handle_route_select(notifier, user, session, &route).await
            }
            Action::RouteCustom if session.state == Some(DialogueState::Route) => {
                ticket::handle_route_custom(notifier, user).await
            }
            Action::RoundTrip(answer)
                if session.state == Some(DialogueState::RoundTrip) =>
            {
                ticket::handle_round_trip(notifier, user, session, answer).await
            }
            Action::ConfirmApp if session.state == Some(DialogueState::Confirm) => {
                ticket::confirm(store, notifier, user, session, self.admin_id).await
            }
            Action::CancelDraft => ticket::cancel_draft(notifier, user, session).await,
            Action::Room(room) if session.state == Some(DialogueState::HotelRoom) => {
                hotel::handle_room(store, notifier, user, session, room, self.admin_id).await
            }

            Action::CancelApp(id) => self.cancel_application(user, id).await,
            Action::CancelHotel(id) => self.cancel_hotel(user, id).await,

            Action::Page { kind, page } => {
                session.page = page;
                let items = merge(
                    applications::for_user(store, user.id).await,
                    hotels::for_user(store, user.id).await,
                );
                let (text, keyboard) = build_page(&items, page, kind);
                notifier
                    .send_card(user.id, &format!("📋 Мои заявки:\n\n{text}"), keyboard)
                    .await
            }
            Action::ViewApp(id) => match applications::by_id(store, id).await {
                None => notifier.send_text(user.id, "Заявка не найдена.").await,
                Some(app) => {
                    let item = ItemRef::new(ItemKind::App, id);
                    let count = comments::public_count(store, item).await;
                    let (card, keyboard) = application_card(&app, count, false);
                    notifier.send_card(user.id, &card, keyboard).await
                }
            },
            Action::ViewHotel(id) => match hotels::by_id(store, id).await {
                None => notifier.send_text(user.id, "Бронирование не найдено.").await,
                Some(booking) => {
                    let item = ItemRef::new(ItemKind::Hotel, id);
                    let count = comments::public_count(store, item).await;
                    let (card, keyboard) = hotel_card(&booking, count, false);
                    notifier.send_card(user.id, &card, keyboard).await
                }
            },

            Action::SetStatus { item, key } => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                let Some(status) = Status::from_key(&key) else {
                    return notifier
                        .send_text(user.id, "❌ Ошибка при изменении статуса")
                        .await;
                };
                match lifecycle::apply(store, item, status).await? {
                    None => Ok(()),
                    Some(update) => {
                        lifecycle::notify_owner(notifier, item, &update, None).await;
                        self.resend_admin_card(user.id, item).await
                    }
                }
            }
            Action::Comment(item) => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                let (text, keyboard) = comment::type_prompt(item);
                notifier.send_card(user.id, &text, keyboard).await
            }
            Action::CommentKind { item, public } => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                session.state = Some(DialogueState::CommentText {
                    item,
                    internal: !public,
                });
                notifier.send_text(user.id, "Введите комментарий:").await
            }
            Action::CommentCancel(_) => {
                if matches!(session.state, Some(DialogueState::CommentText { .. })) {
                    session.state = None;
                }
                notifier.send_text(user.id, "❌ Отменено.").await
            }
            Action::Details(item) => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                match item.kind {
                    ItemKind::App => match applications::by_id(store, item.id).await {
                        None => notifier.send_text(user.id, "Заявка не найдена.").await,
                        Some(app) => {
                            notifier.send_text(user.id, &details_text(&app)).await
                        }
                    },
                    ItemKind::Hotel => match hotels::by_id(store, item.id).await {
                        None => {
                            notifier.send_text(user.id, "Бронирование не найдено.").await
                        }
                        Some(booking) => {
                            notifier.send_text(user.id, &details_text(&booking)).await
                        }
                    },
                }
            }
            Action::Archive(item) => {
                if !self.is_admin(user) {
                    return notifier
                        .send_text(user.id, "⛔ Только админ может архивировать записи.")
                        .await;
                }
                admin::archive_record(store, notifier, user.id, item).await
            }
            Action::ClearDb(confirmed) => {
                if !self.is_admin(user) {
                    return notifier.send_text(user.id, "⛔ Только админ.").await;
                }
                admin::clear_db(store, notifier, user.id, confirmed).await
            }

            // Stale buttons from a state the user already left.
            _ => {
                debug!(user_id = user.id, "action ignored outside its state");
                Ok(())
            }
        }
    }

    async fn send_start_menu(&self, user: &UserInfo) -> Result<(), SafarError> {
        let first_name = user
            .first_name
            .clone()
            .unwrap_or_else(|| user.display_name());
        let keyboard = Keyboard::new()
            .row(vec![
                Button::new("✈ Новая заявка", Action::StartApp),
                Button::new("📝 Мои заявки", Action::MyRequests),
            ])
            .row(vec![
                Button::new("🏨 Забронировать отель", Action::StartHotel),
                Button::new("ℹ Помощь", Action::Help),
            ]);
        self.notifier
            .send_card(
                user.id,
                &format!(
                    "Привет, {first_name}! 👋\nЯ помогу оформить заявку на Ж/Д билет или забронировать гостиницу."
                ),
                keyboard,
            )
            .await
    }

    async fn send_help(&self, user: &UserInfo) -> Result<(), SafarError> {
        if self.is_admin(user) {
            self.notifier.send_text(user.id, HELP_TEXT_ADMIN).await?;
        }
        self.notifier.send_text(user.id, HELP_TEXT).await
    }

    async fn my_requests(
        &self,
        user: &UserInfo,
        session: &mut Session,
    ) -> Result<(), SafarError> {
        let store = self.store.as_ref();
        let apps = applications::for_user(store, user.id).await;
        let bookings = hotels::for_user(store, user.id).await;
        let kind = if apps.is_empty() && !bookings.is_empty() {
            PageKind::Hotel
        } else {
            PageKind::Application
        };
        session.page = 1;
        let items = merge(apps, bookings);
        let (text, keyboard) = build_page(&items, 1, kind);
        self.notifier
            .send_card(user.id, &format!("📋 Мои заявки:\n\n{text}"), keyboard)
            .await
    }

    async fn cancel_application(&self, user: &UserInfo, id: i64) -> Result<(), SafarError> {
        let notifier = self.notifier.as_ref();
        let status = lifecycle::owner_cancel_status(ItemKind::App);
        match applications::set_status(&self.store, id, status).await? {
            None => notifier.send_text(user.id, "Заявка не найдена.").await,
            Some(app) => {
                self.notify_quiet(
                    app.user_id,
                    &format!("⚠️ Ваша заявка #{id} помечена как отменённая."),
                )
                .await;
                notifier
                    .send_text(user.id, &format!("✅ Заявка #{id} помечена как отменена."))
                    .await
            }
        }
    }

    async fn cancel_hotel(&self, user: &UserInfo, id: i64) -> Result<(), SafarError> {
        let notifier = self.notifier.as_ref();
        let status = lifecycle::owner_cancel_status(ItemKind::Hotel);
        match hotels::set_status(&self.store, id, status).await? {
            None => notifier.send_text(user.id, "Бронирование не найдено.").await,
            Some(booking) => {
                self.notify_quiet(
                    booking.user_id,
                    &format!("⚠️ Ваше бронирование отеля #{id} помечено как отменённое."),
                )
                .await;
                notifier
                    .send_text(
                        user.id,
                        &format!("✅ Бронирование #{id} помечено как отменено."),
                    )
                    .await
            }
        }
    }

    /// Re-send the updated admin card after a status shortcut.
    async fn resend_admin_card(&self, admin_id: i64, item: ItemRef) -> Result<(), SafarError> {
        let store = self.store.as_ref();
        let count = comments::public_count(store, item).await;
        match item.kind {
            ItemKind::App => {
                if let Some(app) = applications::by_id(store, item.id).await {
                    let (card, keyboard) = application_card(&app, count, true);
                    self.notifier.send_card(admin_id, &card, keyboard).await?;
                }
            }
            ItemKind::Hotel => {
                if let Some(booking) = hotels::by_id(store, item.id).await {
                    let (card, keyboard) = hotel_card(&booking, count, true);
                    self.notifier.send_card(admin_id, &card, keyboard).await?;
                }
            }
        }
        Ok(())
    }

    /// Forward the admin's message when a forwarding session is active.
    /// Returns true when the event was consumed.
    async fn intercept_forward(
        &self,
        user: &UserInfo,
        session: &mut Session,
        text: Option<&str>,
        photo_id: Option<&str>,
        caption: Option<&str>,
    ) -> Result<bool, SafarError> {
        if !self.is_admin(user) {
            return Ok(false);
        }
        let Some(target) = self.take_forward_target(user, session).await? else {
            return Ok(false);
        };

        let sent = if let Some(file_id) = photo_id {
            self.notifier
                .send_photo(target, file_id, caption.unwrap_or_default())
                .await
        } else {
            self.notifier
                .send_text(target, text.unwrap_or_default())
                .await
        };
        self.report_forward(user.id, target, sent).await?;
        Ok(true)
    }

    async fn intercept_forward_document(
        &self,
        user: &UserInfo,
        session: &mut Session,
        file_id: &str,
        caption: Option<&str>,
    ) -> Result<bool, SafarError> {
        if !self.is_admin(user) {
            return Ok(false);
        }
        let Some(target) = self.take_forward_target(user, session).await? else {
            return Ok(false);
        };
        let sent = self
            .notifier
            .send_document(target, file_id, caption.unwrap_or_default())
            .await;
        self.report_forward(user.id, target, sent).await?;
        Ok(true)
    }

    /// Active forwarding target, expiring idle sessions on the way.
    async fn take_forward_target(
        &self,
        user: &UserInfo,
        session: &mut Session,
    ) -> Result<Option<i64>, SafarError> {
        let Some(forward) = session.forward.as_mut() else {
            return Ok(None);
        };
        if forward.expired(self.forward_timeout) {
            session.forward = None;
            self.notifier
                .send_text(user.id, "⌛ Режим пересылки завершён по таймауту.")
                .await?;
            return Ok(None);
        }
        forward.touch();
        Ok(Some(forward.target))
    }

    async fn report_forward(
        &self,
        admin_id: i64,
        target: i64,
        sent: Result<(), SafarError>,
    ) -> Result<(), SafarError> {
        match sent {
            Ok(()) => {
                metrics::counter!("safar_forwarded_total").increment(1);
                self.notifier
                    .send_text(admin_id, &format!("✅ Переслано пользователю {target}"))
                    .await
            }
            Err(error) => {
                warn!(target, %error, "forwarding failed");
                self.notifier
                    .send_text(admin_id, "❌ Ошибка при пересылке.")
                    .await
            }
        }
    }

    async fn notify_quiet(&self, user_id: i64, text: &str) {
        if let Err(error) = self.notifier.send_text(user_id, text).await {
            warn!(user_id, %error, "user notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_core::{ReportRecord, RoomType};
    use safar_test_utils::RecordingNotifier;
    use tempfile::tempdir;

    const ADMIN: i64 = 777;

    struct Plain;
    impl ReportRenderer for Plain {
        fn extension(&self) -> &'static str {
            "txt"
        }
        fn render(&self, title: &str, records: &[ReportRecord]) -> Vec<u8> {
            format!("{title}: {}", records.len()).into_bytes()
        }
    }

    fn user(id: i64) -> UserInfo {
        UserInfo {
            id,
            username: Some("maria".to_string()),
            first_name: Some("Maria".to_string()),
            last_name: Some("Ivanova".to_string()),
        }
    }

    async fn setup() -> (DialogueEngine, Arc<RecordingNotifier>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            TableStore::open(dir.path(), Duration::from_secs(300))
                .await
                .unwrap(),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = DialogueEngine::new(
            store,
            notifier.clone(),
            Arc::new(Plain),
            ADMIN,
            Duration::from_secs(900),
        );
        (engine, notifier, dir)
    }

    fn cmd(name: &str, args: &str) -> Event {
        Event::Command {
            name: name.to_string(),
            args: args.to_string(),
        }
    }

    #[tokio::test]
    async fn full_ticket_flow_end_to_end() {
        let (engine, notifier, _dir) = setup().await;
        let maria = user(42);

        engine
            .handle(&maria, Event::Text("✈ Новая заявка".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("Иванова Мария".to_string()))
            .await
            .unwrap();
        engine
            .handle(
                &maria,
                Event::Photo {
                    file_id: "passport-1".to_string(),
                    caption: None,
                },
            )
            .await
            .unwrap();
        engine
            .handle(
                &maria,
                Event::Action(Action::RouteSelect("Самарканд - Ташкент".to_string())),
            )
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::RoundTrip(false)))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("25.12.2030 утром".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("командировка".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::ConfirmApp))
            .await
            .unwrap();

        let saved = applications::all(engine.store.as_ref()).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].route, "Самарканд - Ташкент");
        assert_eq!(saved[0].time_of_day, "утром");
        assert!(!saved[0].is_round_trip);

        // Admin got the summary and the passport photo.
        assert!(notifier.messages_to(ADMIN)[0].starts_with("📩 Новая заявка #1"));
        assert_eq!(notifier.photos()[0].0, ADMIN);
    }

    #[tokio::test]
    async fn full_hotel_flow_end_to_end() {
        let (engine, notifier, _dir) = setup().await;
        let maria = user(42);

        engine
            .handle(&maria, Event::Text("🏨 Забронировать отель".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("Иванова Мария".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("Бухара".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("01.01.2031 - 03.01.2031".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::Room(RoomType::Family)))
            .await
            .unwrap();

        let saved = hotels::all(engine.store.as_ref()).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].city, "Бухара");
        assert_eq!(saved[0].room_type, "Семейный");
        assert!(notifier.messages_to(ADMIN)[0].starts_with("🏨 Новая бронь #1"));
    }

    #[tokio::test]
    async fn admin_commands_rejected_for_others() {
        let (engine, notifier, _dir) = setup().await;
        engine.handle(&user(1), cmd("admin_all", "")).await.unwrap();
        engine.handle(&user(1), cmd("clear_db", "")).await.unwrap();

        let texts = notifier.texts();
        assert_eq!(texts[0].1, "⛔ Только админ.");
        assert_eq!(texts[1].1, "⛔ Только админ может очищать базу данных.");
    }

    #[tokio::test]
    async fn status_shortcut_updates_and_notifies() {
        let (engine, notifier, _dir) = setup().await;
        let maria = user(42);

        // Submit via the flow so the record has an owner.
        engine
            .handle(&maria, Event::Text("✈ Новая заявка".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("Иванова Мария".to_string()))
            .await
            .unwrap();
        engine
            .handle(
                &maria,
                Event::Photo {
                    file_id: "p".to_string(),
                    caption: None,
                },
            )
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::RouteSelect("А - Б".to_string())))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::RoundTrip(false)))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("25.12.2030".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Text("отпуск".to_string()))
            .await
            .unwrap();
        engine
            .handle(&maria, Event::Action(Action::ConfirmApp))
            .await
            .unwrap();

        let item = ItemRef::new(ItemKind::App, 1);
        engine
            .handle(
                &user(ADMIN),
                Event::Action(Action::SetStatus {
                    item,
                    key: "approved".to_string(),
                }),
            )
            .await
            .unwrap();

        let app = applications::by_id(engine.store.as_ref(), 1).await.unwrap();
        assert_eq!(app.status, Status::Approved);
        assert!(notifier
            .messages_to(42)
            .iter()
            .any(|t| t.contains("изменён: <b>✅ Одобрено</b>")));
        // Admin got the refreshed card.
        let keyboard = notifier.last_keyboard(ADMIN).unwrap();
        assert!(keyboard
            .buttons()
            .any(|b| b.action.encode() == "status:app:1:rejected"));
    }

    #[tokio::test]
    async fn comment_flow_via_actions() {
        let (engine, notifier, _dir) = setup().await;
        let item = ItemRef::new(ItemKind::App, 5);

        engine
            .handle(&user(ADMIN), Event::Action(Action::Comment(item)))
            .await
            .unwrap();
        engine
            .handle(
                &user(ADMIN),
                Event::Action(Action::CommentKind { item, public: false }),
            )
            .await
            .unwrap();
        engine
            .handle(&user(ADMIN), Event::Text("проверить паспорт".to_string()))
            .await
            .unwrap();

        let stored = comments::for_item(engine.store.as_ref(), item, true).await;
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_internal);
        assert!(notifier
            .messages_to(ADMIN)
            .iter()
            .any(|t| t == "✅ Комментарий #1 добавлен"));
    }

    #[tokio::test]
    async fn forwarding_intercepts_admin_messages() {
        let (engine, notifier, _dir) = setup().await;
        let admin = user(ADMIN);

        engine.handle(&admin, cmd("send_ticket", "42")).await.unwrap();
        engine
            .handle(&admin, Event::Text("ваш билет готов".to_string()))
            .await
            .unwrap();
        engine
            .handle(
                &admin,
                Event::Document {
                    file_id: "ticket-1".to_string(),
                    caption: Some("Билет".to_string()),
                },
            )
            .await
            .unwrap();
        engine.handle(&admin, cmd("done", "")).await.unwrap();

        assert_eq!(notifier.messages_to(42), vec!["ваш билет готов".to_string()]);
        let documents = notifier.documents();
        assert_eq!(documents[0], (42, "ticket-1".to_string(), "Билет".to_string()));
        assert!(notifier
            .messages_to(ADMIN)
            .iter()
            .any(|t| t == "✅ Переслано пользователю 42"));
    }

    #[tokio::test]
    async fn forwarding_expires_after_idle_timeout() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            TableStore::open(dir.path(), Duration::from_secs(300))
                .await
                .unwrap(),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = DialogueEngine::new(
            store,
            notifier.clone(),
            Arc::new(Plain),
            ADMIN,
            Duration::ZERO,
        );
        let admin = user(ADMIN);

        engine.handle(&admin, cmd("send_ticket", "42")).await.unwrap();
        engine
            .handle(&admin, Event::Text("опоздавшее сообщение".to_string()))
            .await
            .unwrap();

        assert!(notifier.messages_to(42).is_empty());
        assert!(notifier
            .messages_to(ADMIN)
            .iter()
            .any(|t| t.contains("по таймауту")));
    }

    #[tokio::test]
    async fn stale_buttons_are_ignored() {
        let (engine, notifier, _dir) = setup().await;
        // Room pick without a hotel flow in progress.
        engine
            .handle(&user(1), Event::Action(Action::Room(RoomType::Single)))
            .await
            .unwrap();
        // Confirm without a draft.
        engine
            .handle(&user(1), Event::Action(Action::ConfirmApp))
            .await
            .unwrap();
        assert!(notifier.texts().is_empty());
        assert!(notifier.cards().is_empty());
        assert!(hotels::all(engine.store.as_ref()).await.is_empty());
    }

    #[tokio::test]
    async fn my_requests_lists_own_records_only() {
        let (engine, notifier, _dir) = setup().await;
        let maria = user(42);

        // One application for Maria, stored directly.
        applications::insert(
            engine.store.as_ref(),
            safar_store::models::Application {
                id: None,
                timestamp: String::new(),
                user_id: 42,
                username: None,
                first_name: None,
                last_name: None,
                fio: "Иванова Мария".to_string(),
                passport_file_id: String::new(),
                route: "А - Б".to_string(),
                date: "25.12.2030".to_string(),
                time_of_day: String::new(),
                reason: String::new(),
                status: Status::Pending,
                return_route: String::new(),
                return_date: String::new(),
                is_round_trip: false,
            },
        )
        .await
        .unwrap();

        engine
            .handle(&maria, Event::Text("📝 Мои заявки".to_string()))
            .await
            .unwrap();
        engine
            .handle(&user(7), Event::Action(Action::MyRequests))
            .await
            .unwrap();

        let cards = notifier.cards();
        assert!(cards[0].1.contains("#1 — А - Б"));
        assert!(cards[1].1.contains("Пусто."));
    }
}
