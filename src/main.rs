mod api;
mod config;
mod core;
mod models;
mod notifier;
mod reminders;
mod scheduler;
mod store;
mod time_utils;
mod traits;
mod types;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::traits::DataStore;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = PathBuf::from("config.toml");

    // Handle CLI arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-V" => {
                println!("nudge {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("nudge {}", env!("CARGO_PKG_VERSION"));
                println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
                println!("Usage: nudge [COMMAND]\n");
                println!("Commands:");
                println!("  check    Print due reminders and exit (no notifications)");
                println!("\nOptions:");
                println!("  -h, --help       Print help");
                println!("  -V, --version    Print version");
                println!("\nWithout a command, starts the API server and check scheduler.");
                return Ok(());
            }
            "check" => {
                let config = config::AppConfig::load(&config_path)?;
                return tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()?
                    .block_on(run_check(config));
            }
            _ => {}
        }
    }

    let config = config::AppConfig::load(&config_path)?;

    // Run async
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(crate::core::run(config))
}

/// One-shot evaluation for the terminal. Reads the data file, prints who is
/// due, and never touches the notification service or `lastCheck`.
async fn run_check(config: config::AppConfig) -> anyhow::Result<()> {
    let data_store = store::JsonFileStore::open(&config.store.data_path).await?;
    let data = data_store.load_all().await?;

    let birthdays = reminders::collect_birthdays(&data.contacts);
    let overdue = reminders::collect_overdue(&data.contacts, &data.circles);

    println!("Birthdays today: {}", birthdays.len());
    for contact in &birthdays {
        match time_utils::age_in_years(contact.birthday) {
            Some(age) => println!("  {} (turning {})", contact.name, age),
            None => println!("  {}", contact.name),
        }
    }

    println!("Overdue contacts: {}", overdue.len());
    for contact in &overdue {
        println!(
            "  {} (last contacted: {})",
            contact.name,
            time_utils::relative_time_label(contact.last_contacted)
        );
    }

    Ok(())
}
