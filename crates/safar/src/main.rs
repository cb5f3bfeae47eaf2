// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safar - Telegram bot for train ticket requests and hotel bookings.
//!
//! This is the binary entry point for the Safar bot.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use clap::{Parser, Subcommand};

/// Safar - Telegram bot for train ticket requests and hotel bookings.
#[derive(Parser, Debug)]
#[command(name = "safar", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and serve Telegram updates.
    Serve,
    /// Load and validate the configuration, then exit.
    ConfigCheck,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match safar_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            safar_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::ConfigCheck) => {
            println!(
                "safar: config ok (bot.name={}, storage.data_dir={})",
                config.bot.name, config.storage.data_dir
            );
        }
        None => {
            println!("safar: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }
}
