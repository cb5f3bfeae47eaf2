// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safar serve` command implementation.
//!
//! Wires the table store, the dialogue engine, the Telegram adapter, and
//! the reminder runner together, then polls Telegram until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use safar_config::model::SafarConfig;
use safar_core::error::SafarError;
use safar_cron::ReminderRunner;
use safar_dialogue::DialogueEngine;
use safar_report::TextReportRenderer;
use safar_store::TableStore;
use safar_telegram::{bot_from_config, run_dispatcher, TelegramNotifier};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the `safar serve` command.
pub async fn run_serve(config: SafarConfig) -> Result<(), SafarError> {
    init_tracing(&config.bot.log_level);

    info!(bot = %config.bot.name, "starting safar serve");

    let store = Arc::new(
        TableStore::open(
            config.storage.data_dir.clone(),
            Duration::from_secs(config.storage.cache_ttl_secs),
        )
        .await?,
    );
    info!(data_dir = %store.data_dir().display(), "table store opened");

    let bot = bot_from_config(&config.telegram)?;
    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));

    let engine = Arc::new(DialogueEngine::new(
        store.clone(),
        notifier.clone(),
        Arc::new(TextReportRenderer::new()),
        config.telegram.admin_id,
        Duration::from_secs(config.telegram.forward_timeout_secs),
    ));

    let cancel = CancellationToken::new();
    let reminder_handle = if config.reminder.enabled {
        let runner = ReminderRunner::new(
            store.clone(),
            notifier.clone(),
            config.reminder.hour,
            Duration::from_secs(config.reminder.fallback_interval_secs),
        );
        Some(tokio::spawn(runner.run(cancel.clone())))
    } else {
        info!("reminder runner disabled by configuration");
        None
    };

    // Blocks until Ctrl-C stops the dispatcher.
    run_dispatcher(bot, engine).await;

    cancel.cancel();
    if let Some(handle) = reminder_handle {
        let _ = handle.await;
    }

    info!("safar serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("safar={log_level},warn")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
