// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrator commands.
//!
//! Everything here is gated on the configured admin id by the engine;
//! the handlers assume the caller is already authorized unless a
//! function takes a `for_admin` flag for shared commands.

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use safar_core::{
    Action, Button, ItemKind, ItemRef, Keyboard, Notifier, ReportRecord, ReportRenderer,
    SafarError,
};
use safar_store::models::{Application, Comment, HotelBooking, UserProfile};
use safar_store::queries::{applications, archive, comments, hotels};
use safar_store::{Status, TableStore};
use tracing::{error, info};

use crate::card::{application_card, hotel_card};
use crate::session::{ForwardSession, Session};

pub const HELP_TEXT: &str = "ℹ️ <b>Как заполнить заявку</b>:\n\n\
1) Нажмите <b>✈ Новая заявка</b> или /start\n\
2) Введите ФИО или используйте автозаполнение\n\
3) Прикрепите фото/скан паспорта\n\
4) Выберите маршрут из списка или введите свой\n\
5) Укажите дату поездки (ДД.MM.ГГГГ, можно 'утром'/'вечером')\n\
6) Укажите нужен ли обратный билет\n\
7) Укажите причину поездки\n\n\
После подтверждения заявка отправляется админу и сохраняется в базе.\n";

pub const HELP_TEXT_ADMIN: &str = "🛠️ <b>Команды администратора</b>:\n\n\
/admin_all - Все заявки с кнопками управления\n\
/admin_pending - Только заявки на рассмотрении\n\
/admin_search - Поиск заявок\n\
/dashboard - План поездок на 14 дней\n\
/set_status - Изменить статус вручную\n\
/send_ticket - Пересылка документов пользователю\n\
/get_db - Получить файлы базы данных\n\
/report_user - Отчет по пользователю\n\
/report_period - Отчет за период\n";

/// Every application and booking, each as a managed card.
pub async fn admin_all(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    let apps = applications::all(store).await;
    if apps.is_empty() {
        notifier.send_text(admin_id, "Нет заявок на билеты.").await?;
    } else {
        notifier.send_text(admin_id, "📊 Все заявки на билеты:").await?;
        send_application_cards(store, notifier, admin_id, &apps).await?;
    }

    let bookings = hotels::all(store).await;
    if bookings.is_empty() {
        notifier
            .send_text(admin_id, "Нет бронирований отелей.")
            .await?;
    } else {
        notifier
            .send_text(admin_id, "🏨 Все бронирования отелей:")
            .await?;
        send_hotel_cards(store, notifier, admin_id, &bookings).await?;
    }
    Ok(())
}

/// Records still in the pending stage.
pub async fn admin_pending(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    let apps = applications::all(store).await;
    if apps.is_empty() {
        notifier.send_text(admin_id, "Нет заявок на билеты.").await?;
    } else {
        let pending: Vec<Application> = apps
            .into_iter()
            .filter(|a| a.status == Status::Pending)
            .collect();
        if pending.is_empty() {
            notifier
                .send_text(admin_id, "Нет заявок на рассмотрении.")
                .await?;
        } else {
            notifier
                .send_text(admin_id, "🕒 Заявки на рассмотрении:")
                .await?;
            send_application_cards(store, notifier, admin_id, &pending).await?;
        }
    }

    let bookings: Vec<HotelBooking> = hotels::all(store)
        .await
        .into_iter()
        .filter(|h| h.status == Status::Pending)
        .collect();
    if bookings.is_empty() {
        notifier
            .send_text(admin_id, "Нет бронирований на рассмотрении.")
            .await?;
    } else {
        notifier
            .send_text(admin_id, "🕒 Бронирования на рассмотрении:")
            .await?;
        send_hotel_cards(store, notifier, admin_id, &bookings).await?;
    }
    Ok(())
}

/// `/admin_search <user_id|FIO>`.
pub async fn admin_search(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    args: &str,
) -> Result<(), SafarError> {
    let query = args.trim();
    if query.is_empty() {
        return notifier
            .send_text(admin_id, "Использование: /admin_search <user_id|FIO>")
            .await;
    }
    let matched = applications::search(store, query).await;
    if matched.is_empty() {
        return notifier.send_text(admin_id, "Не найдено.").await;
    }
    send_application_cards(store, notifier, admin_id, &matched).await
}

/// `/search_date DD.MM.YYYY`, available to everyone. The admin gets
/// managed cards, everyone else the owner view.
pub async fn search_date(
    store: &TableStore,
    notifier: &dyn Notifier,
    chat_id: i64,
    args: &str,
    for_admin: bool,
) -> Result<(), SafarError> {
    let arg = args.trim();
    if arg.is_empty() {
        return notifier
            .send_text(chat_id, "Использование: /search_date DD.MM.YYYY")
            .await;
    }
    let Ok(date) = NaiveDate::parse_from_str(arg, "%d.%m.%Y") else {
        return notifier
            .send_text(chat_id, "Неверный формат. Пример: 25.11.2025")
            .await;
    };
    let matched = applications::on_date(store, &date.format("%d.%m.%Y").to_string()).await;
    if matched.is_empty() {
        return notifier
            .send_text(chat_id, "Нет заявок на указанную дату.")
            .await;
    }
    for app in &matched {
        let item = ItemRef::new(ItemKind::App, app.id.unwrap_or_default());
        let count = comments::public_count(store, item).await;
        let (card, keyboard) = application_card(app, count, for_admin);
        notifier.send_card(chat_id, &card, keyboard).await?;
    }
    Ok(())
}

/// `/search_city <город>`, available to everyone.
pub async fn search_city(
    store: &TableStore,
    notifier: &dyn Notifier,
    chat_id: i64,
    args: &str,
    for_admin: bool,
) -> Result<(), SafarError> {
    let city = args.trim();
    if city.is_empty() {
        return notifier
            .send_text(chat_id, "Использование: /search_city <город>")
            .await;
    }
    let matched = applications::route_contains(store, city).await;
    if matched.is_empty() {
        return notifier
            .send_text(chat_id, "Нет заявок для этого города.")
            .await;
    }
    for app in &matched {
        let item = ItemRef::new(ItemKind::App, app.id.unwrap_or_default());
        let count = comments::public_count(store, item).await;
        let (card, keyboard) = application_card(app, count, for_admin);
        notifier.send_card(chat_id, &card, keyboard).await?;
    }
    Ok(())
}

/// 14-day trip board, one line per upcoming trip, sent in chunks of 20.
pub async fn dashboard(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    const DAYS: i64 = 14;
    let now = Local::now().date_naive();
    let end = now + ChronoDuration::days(DAYS);
    let mut lines = vec![format!("📊 Доска поездок на {DAYS} дней ({now} → {end})\n")];

    for app in applications::all(store).await {
        let Some(date) = app.departure() else { continue };
        if now <= date && date <= end {
            let mut route = app.route.clone();
            if app.is_round_trip {
                route.push_str(" 🔄");
            }
            lines.push(format!(
                "✈ #{} {} → {route} ({}) {}",
                app.id.unwrap_or_default(),
                app.fio,
                app.date,
                app.status
            ));
        }
    }
    for booking in hotels::all(store).await {
        let Some(date) = booking.check_in_date() else { continue };
        if now <= date && date <= end {
            lines.push(format!(
                "🏨 H#{} {} → {} (заезд {}) {}",
                booking.id.unwrap_or_default(),
                booking.fio,
                booking.city,
                booking.check_in,
                booking.status
            ));
        }
    }

    if lines.len() == 1 {
        return notifier
            .send_text(admin_id, "План поездок пуст на ближайшие 14 дней.")
            .await;
    }
    for chunk in lines.chunks(20) {
        notifier.send_text(admin_id, &chunk.join("\n")).await?;
    }
    Ok(())
}

/// `/set_status app|hotel <id> <status>`. The status tail is free text,
/// so admins can invent labels outside the built-in vocabulary.
pub async fn set_status_command(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    args: &str,
) -> Result<(), SafarError> {
    let mut parts = args.split_whitespace();
    let (Some(kind), Some(id_str)) = (parts.next(), parts.next()) else {
        return notifier
            .send_text(admin_id, "Использование: /set_status app|hotel <id> <status>")
            .await;
    };
    let label = parts.collect::<Vec<_>>().join(" ");
    if label.is_empty() {
        return notifier
            .send_text(admin_id, "Использование: /set_status app|hotel <id> <status>")
            .await;
    }
    let Ok(id) = id_str.parse::<i64>() else {
        return notifier.send_text(admin_id, "ID должен быть числом.").await;
    };
    let status = Status::from_label(&label);

    match kind {
        "app" => {
            match applications::set_status(store, id, status.clone()).await? {
                None => notifier.send_text(admin_id, "Заявка не найдена.").await?,
                Some(app) => {
                    notify_plain(
                        notifier,
                        app.user_id,
                        &format!("🔔 Статус вашей заявки #{id} изменён: {status}"),
                    )
                    .await;
                    notifier
                        .send_text(
                            admin_id,
                            &format!("Статус заявки #{id} изменён на: {status}"),
                        )
                        .await?;
                }
            }
        }
        "hotel" => {
            match hotels::set_status(store, id, status.clone()).await? {
                None => {
                    notifier
                        .send_text(admin_id, "Бронирование не найдено.")
                        .await?
                }
                Some(booking) => {
                    notify_plain(
                        notifier,
                        booking.user_id,
                        &format!("🔔 Статус брони отеля #{id} изменён: {status}"),
                    )
                    .await;
                    notifier
                        .send_text(
                            admin_id,
                            &format!("Статус брони #{id} изменён на: {status}"),
                        )
                        .await?;
                }
            }
        }
        _ => {
            notifier
                .send_text(admin_id, "Тип должен быть app или hotel.")
                .await?
        }
    }
    Ok(())
}

/// `/send_ticket <user_id>`: open a forwarding session.
pub async fn send_ticket(
    notifier: &dyn Notifier,
    session: &mut Session,
    admin_id: i64,
    args: &str,
) -> Result<(), SafarError> {
    let arg = args.trim();
    if arg.is_empty() {
        return notifier
            .send_text(admin_id, "Использование: /send_ticket <user_id>")
            .await;
    }
    let Ok(target) = arg.parse::<i64>() else {
        return notifier
            .send_text(admin_id, "user_id должен быть числом.")
            .await;
    };
    session.forward = Some(ForwardSession::new(target));
    info!(target, "forwarding session opened");
    notifier
        .send_text(
            admin_id,
            &format!(
                "Режим пересылки активирован для пользователя {target}. Отправьте фото/документ/текст. /done чтобы завершить."
            ),
        )
        .await
}

/// `/done`: close the forwarding session if one is open.
pub async fn done(
    notifier: &dyn Notifier,
    session: &mut Session,
    admin_id: i64,
) -> Result<(), SafarError> {
    if session.forward.take().is_some() {
        notifier
            .send_text(admin_id, "✅ Режим пересылки завершён.")
            .await
    } else {
        notifier
            .send_text(admin_id, "Режим пересылки не активен.")
            .await
    }
}

/// `/get_db`: export the live table files.
pub async fn get_db(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    for name in ["applications", "hotels", "users"] {
        let path = store.table_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file_name = format!("{name}.json");
                notifier
                    .send_document_bytes(admin_id, &file_name, bytes, &file_name)
                    .await?;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                error!(table = name, error = %err, "table export failed");
                return notifier
                    .send_text(admin_id, "❌ Ошибка отправки файлов.")
                    .await;
            }
        }
    }
    Ok(())
}

/// `/report_user <user_id>`: render the user's applications.
pub async fn report_user(
    store: &TableStore,
    notifier: &dyn Notifier,
    renderer: &dyn ReportRenderer,
    admin_id: i64,
    args: &str,
) -> Result<(), SafarError> {
    let arg = args.trim();
    if arg.is_empty() {
        return notifier
            .send_text(admin_id, "Использование: /report_user <user_id>")
            .await;
    }
    let Ok(uid) = arg.parse::<i64>() else {
        return notifier
            .send_text(admin_id, "user_id должен быть числом.")
            .await;
    };
    let recs = applications::for_user(store, uid).await;
    if recs.is_empty() {
        return notifier
            .send_text(admin_id, "Нет заявок у пользователя.")
            .await;
    }
    let records: Vec<ReportRecord> = recs.iter().map(application_record).collect();
    let title = format!("Отчёт — заявки пользователя {uid}");
    let data = renderer.render(&title, &records);
    let file_name = format!("report_user_{uid}.{}", renderer.extension());
    notifier
        .send_document_bytes(admin_id, &file_name, data, &file_name)
        .await
}

/// `/report_period YYYY-MM`: render a month's applications.
pub async fn report_period(
    store: &TableStore,
    notifier: &dyn Notifier,
    renderer: &dyn ReportRenderer,
    admin_id: i64,
    args: &str,
) -> Result<(), SafarError> {
    let period = args.trim();
    if period.is_empty() {
        return notifier
            .send_text(admin_id, "Использование: /report_period YYYY-MM")
            .await;
    }
    if NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_err() {
        return notifier
            .send_text(admin_id, "Неверный формат. Пример: 2025-09")
            .await;
    }
    let recs = applications::in_month(store, period).await;
    if recs.is_empty() {
        return notifier
            .send_text(admin_id, "Нет заявок в указанный период.")
            .await;
    }
    let records: Vec<ReportRecord> = recs.iter().map(application_record).collect();
    let title = format!("Отчёт заявок {period}");
    let data = renderer.render(&title, &records);
    let file_name = format!("report_{period}.{}", renderer.extension());
    notifier
        .send_document_bytes(admin_id, &file_name, data, &file_name)
        .await
}

/// Archive button press. Already admin-gated by the engine.
pub async fn archive_record(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    item: ItemRef,
) -> Result<(), SafarError> {
    let type_name = match item.kind {
        ItemKind::App => "App",
        ItemKind::Hotel => "Hotel",
    };
    if archive::archive_item(store, item).await? {
        notifier
            .send_text(
                admin_id,
                &format!("✅ {type_name} #{} успешно архивировано.", item.id),
            )
            .await
    } else {
        notifier
            .send_text(
                admin_id,
                &format!(
                    "❌ Не удалось архивировать {} #{}. Запись не найдена.",
                    item.kind, item.id
                ),
            )
            .await
    }
}

/// `/clear_db`: ask for confirmation before wiping anything.
pub async fn clear_db_prompt(
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    let keyboard = Keyboard::new()
        .row(vec![Button::new("✅ Подтвердить очистку", Action::ClearDb(true))])
        .row(vec![Button::new("❌ Отменить", Action::ClearDb(false))]);
    notifier
        .send_card(
            admin_id,
            "⚠️ Внимание! Это действие удалит все данные из баз (заявки, бронирования, пользователи, архив, комментарии, шаблоны). Продолжить?",
            keyboard,
        )
        .await
}

/// Confirmation press for `/clear_db`. Truncates every table and drops
/// the read cache.
pub async fn clear_db(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    confirmed: bool,
) -> Result<(), SafarError> {
    if !confirmed {
        return notifier
            .send_text(admin_id, "❌ Очистка базы данных отменена.")
            .await;
    }
    store.write::<Application>(&[]).await?;
    store.write::<HotelBooking>(&[]).await?;
    store.write::<UserProfile>(&[]).await?;
    store.write::<Comment>(&[]).await?;
    store.write::<safar_store::models::ArchiveEntry>(&[]).await?;
    store.invalidate_all().await;
    info!("all tables cleared");
    notifier
        .send_text(admin_id, "✅ База данных успешно очищена.")
        .await
}

/// Run the reminder sweep on demand.
pub async fn run_reminders(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
) -> Result<(), SafarError> {
    safar_cron::sweep(store, notifier).await;
    notifier.send_text(admin_id, "Проверка запущена").await
}

async fn send_application_cards(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    apps: &[Application],
) -> Result<(), SafarError> {
    for app in apps {
        let item = ItemRef::new(ItemKind::App, app.id.unwrap_or_default());
        let count = comments::public_count(store, item).await;
        let (card, keyboard) = application_card(app, count, true);
        notifier.send_card(admin_id, &card, keyboard).await?;
    }
    Ok(())
}

async fn send_hotel_cards(
    store: &TableStore,
    notifier: &dyn Notifier,
    admin_id: i64,
    bookings: &[HotelBooking],
) -> Result<(), SafarError> {
    for booking in bookings {
        let item = ItemRef::new(ItemKind::Hotel, booking.id.unwrap_or_default());
        let count = comments::public_count(store, item).await;
        let (card, keyboard) = hotel_card(booking, count, true);
        notifier.send_card(admin_id, &card, keyboard).await?;
    }
    Ok(())
}

fn application_record(app: &Application) -> ReportRecord {
    let mut record = ReportRecord::default()
        .field(
            "ID",
            format!("{} | {}", app.id.unwrap_or_default(), app.timestamp),
        )
        .field("FIO", app.fio.as_str())
        .field("Маршрут", app.route.as_str())
        .field("Дата", format!("{} {}", app.date, app.time_of_day));
    if app.is_round_trip {
        record = record
            .field("Обратный маршрут", app.return_route.as_str())
            .field("Дата возврата", app.return_date.as_str());
    }
    record
        .field("Причина", app.reason.as_str())
        .field("Статус", app.status.label())
}

async fn notify_plain(notifier: &dyn Notifier, user_id: i64, text: &str) {
    if let Err(error) = notifier.send_text(user_id, text).await {
        tracing::warn!(user_id, %error, "user notification failed");
    }
}
