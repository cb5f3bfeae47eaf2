// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Departure reminder scheduler.
//!
//! [`ReminderRunner`] sweeps the applications and hotels tables once a day
//! (09:00 local by default) and pings every user whose departure or check-in
//! falls three days out. If the cron schedule cannot be constructed it falls
//! back to a fixed interval, first firing shortly after startup.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use croner::Cron;
use safar_core::Notifier;
use safar_store::queries::{applications, hotels};
use safar_store::TableStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Delay before the first sweep when running on the interval fallback.
const FALLBACK_FIRST_DELAY: Duration = Duration::from_secs(10);

/// A trip date qualifies for a reminder when its midnight is between three
/// and four days away from `now`. The daily sweep therefore catches each
/// trip exactly once.
pub fn within_window(date: NaiveDate, now: NaiveDateTime) -> bool {
    let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
    let until = midnight - now;
    chrono::Duration::days(3) <= until && until <= chrono::Duration::days(4)
}

/// Sweep both tables and send reminders for qualifying trips.
///
/// Rows with malformed dates are skipped. Send failures are logged and do
/// not stop the sweep. Returns the number of reminders sent.
pub async fn sweep(store: &TableStore, notifier: &dyn Notifier) -> usize {
    info!("checking reminders");
    let now = Local::now().naive_local();
    let mut sent = 0;

    for app in applications::all(store).await {
        let (Some(id), Some(date)) = (app.id, app.departure()) else {
            continue;
        };
        if within_window(date, now) {
            sent += remind(notifier, app.user_id, "поездки", id, &app.date).await;
        }
    }

    for booking in hotels::all(store).await {
        let (Some(id), Some(date)) = (booking.id, booking.check_in_date()) else {
            continue;
        };
        if within_window(date, now) {
            sent += remind(
                notifier,
                booking.user_id,
                "заезда в отель",
                id,
                &booking.check_in,
            )
            .await;
        }
    }

    sent
}

async fn remind(
    notifier: &dyn Notifier,
    user_id: i64,
    what: &str,
    id: i64,
    date: &str,
) -> usize {
    let text = format!("⏰ Напоминание: до {what} №{id} осталось 3 дня!\n📅 Дата: {date}");
    match notifier.send_text(user_id, &text).await {
        Ok(()) => {
            info!(user_id, id, "reminder sent");
            1
        }
        Err(err) => {
            warn!(user_id, id, error = %err, "reminder send failed");
            0
        }
    }
}

/// Background task driving the daily reminder sweep.
pub struct ReminderRunner {
    store: Arc<TableStore>,
    notifier: Arc<dyn Notifier>,
    hour: u8,
    fallback_interval: Duration,
}

impl ReminderRunner {
    pub fn new(
        store: Arc<TableStore>,
        notifier: Arc<dyn Notifier>,
        hour: u8,
        fallback_interval: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            hour,
            fallback_interval,
        }
    }

    /// Run until `cancel` fires. Sweeps at the configured local hour via a
    /// cron schedule, or on the fallback interval if the schedule cannot
    /// be built.
    pub async fn run(self, cancel: CancellationToken) {
        match Cron::new(&format!("0 {} * * *", self.hour)).parse() {
            Ok(cron) => self.run_cron(cron, cancel).await,
            Err(err) => {
                warn!(error = %err, "cron schedule invalid, using interval fallback");
                self.run_interval(cancel).await;
            }
        }
    }

    async fn run_cron(&self, cron: Cron, cancel: CancellationToken) {
        loop {
            let next = match cron.find_next_occurrence(&Local::now(), false) {
                Ok(next) => next,
                Err(err) => {
                    warn!(error = %err, "no next cron occurrence, using interval fallback");
                    return self.run_interval(cancel).await;
                }
            };
            let wait = (next - Local::now())
                .to_std()
                .unwrap_or(Duration::from_secs(1));
            info!(at = %next, "next reminder sweep scheduled");

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("reminder runner stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    sweep(&self.store, self.notifier.as_ref()).await;
                }
            }
        }
    }

    async fn run_interval(&self, cancel: CancellationToken) {
        let mut wait = FALLBACK_FIRST_DELAY;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("reminder runner stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    sweep(&self.store, self.notifier.as_ref()).await;
                    wait = self.fallback_interval;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use safar_core::{Keyboard, SafarError};
    use safar_store::models::Application;
    use safar_store::Status;
    use tempfile::tempdir;
    use tokio::sync::Mutex;

    struct CapturingNotifier {
        sent: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SafarError> {
            self.sent.lock().await.push((chat_id, text.to_string()));
            Ok(())
        }

        async fn send_card(
            &self,
            chat_id: i64,
            text: &str,
            _keyboard: Keyboard,
        ) -> Result<(), SafarError> {
            self.send_text(chat_id, text).await
        }

        async fn send_photo(&self, _: i64, _: &str, _: &str) -> Result<(), SafarError> {
            Ok(())
        }

        async fn send_document(&self, _: i64, _: &str, _: &str) -> Result<(), SafarError> {
            Ok(())
        }

        async fn send_document_bytes(
            &self,
            _: i64,
            _: &str,
            _: Vec<u8>,
            _: &str,
        ) -> Result<(), SafarError> {
            Ok(())
        }
    }

    fn app_on(date: &str, user_id: i64) -> Application {
        Application {
            id: None,
            timestamp: String::new(),
            user_id,
            username: None,
            first_name: None,
            last_name: None,
            fio: "Иванова Мария".to_string(),
            passport_file_id: String::new(),
            route: "Самарканд - Ташкент".to_string(),
            date: date.to_string(),
            time_of_day: String::new(),
            reason: String::new(),
            status: Status::Pending,
            return_route: String::new(),
            return_date: String::new(),
            is_round_trip: false,
        }
    }

    #[test]
    fn window_covers_exactly_the_third_day() {
        let now = NaiveDate::from_ymd_opt(2025, 12, 22)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        // 25.12 midnight is 2 days 15 hours away: too close.
        assert!(!within_window(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(), now));
        // 26.12 midnight is 3 days 15 hours away: inside the window.
        assert!(within_window(NaiveDate::from_ymd_opt(2025, 12, 26).unwrap(), now));
        // 27.12 midnight is 4 days 15 hours away: already past the window.
        assert!(!within_window(NaiveDate::from_ymd_opt(2025, 12, 27).unwrap(), now));
    }

    #[test]
    fn past_dates_never_qualify() {
        let now = NaiveDate::from_ymd_opt(2025, 12, 22)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert!(!within_window(NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(), now));
    }

    #[tokio::test]
    async fn sweep_skips_malformed_dates() {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();
        applications::insert(&store, app_on("скоро", 1)).await.unwrap();

        let notifier = CapturingNotifier {
            sent: Mutex::new(Vec::new()),
        };
        let sent = sweep(&store, &notifier).await;
        assert_eq!(sent, 0);
        assert!(notifier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sweep_reminds_qualifying_trip() {
        let dir = tempdir().unwrap();
        let store = TableStore::open(dir.path(), Duration::from_secs(300))
            .await
            .unwrap();

        // The calendar date 4 days out always has its midnight between
        // 3 and 4 days away, whatever the current time of day.
        let date = (Local::now() + chrono::Duration::days(4))
            .date_naive()
            .format("%d.%m.%Y")
            .to_string();
        applications::insert(&store, app_on(&date, 42)).await.unwrap();

        let notifier = CapturingNotifier {
            sent: Mutex::new(Vec::new()),
        };
        let sent = sweep(&store, &notifier).await;
        assert_eq!(sent, 1);

        let messages = notifier.sent.lock().await;
        assert_eq!(messages[0].0, 42);
        assert!(messages[0].1.contains("осталось 3 дня"));
        assert!(messages[0].1.contains(&date));
    }
}
