mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use skillmorphix_core::catalog::{CATALOG_ENV, Catalog};
use skillmorphix_core::clock::SystemClock;
use skillmorphix_core::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use tui::{EventHandler, TICK_RATE};

const LOG_ENV: &str = "SKILLMORPHIX_LOG";

/// Log to a file next to the config; the terminal belongs to the UI.
fn init_logging(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    let log_path = config_dir.join("skillmorphix.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| "skillmorphix=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

async fn load_catalog() -> Catalog {
    let Some(path) = std::env::var_os(CATALOG_ENV) else {
        return Catalog::builtin();
    };

    match Catalog::load_from_json(Path::new(&path)).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "catalog override unusable, using built-in catalog");
            Catalog::builtin()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_dir = Config::config_dir()?;
    init_logging(&config_dir)?;

    let config_path = Config::get_config_path()?;
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %format!("{:#}", e), "config unreadable, starting with defaults");
        Config::new()
    });
    let catalog = load_catalog().await;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut app = App::new(config, config_path, catalog, Arc::new(SystemClock));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);

    let result = run(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    tracing::info!("exiting");
    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
