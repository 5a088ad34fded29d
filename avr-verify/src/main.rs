//! Annotation review (avr-verify) - terminal entry point
//!
//! Resolves configuration, opens the session database, connects the HTTP
//! gateway and hands the terminal to the console driver.

use std::path::PathBuf;

use anyhow::{Context, Result};
use avr_common::{config, EventBus, ReviewEvent};
use avr_verify::config::{Overrides, VerifyConfig};
use avr_verify::console::{self, SharedLines, TerminalPrompt};
use avr_verify::db::open_session_store;
use avr_verify::{build_info, logging};
use avr_verify::{HttpGateway, Navigator};
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Command-line arguments for avr-verify
#[derive(Parser, Debug)]
#[command(name = "avr-verify")]
#[command(about = "Review and verify video annotations frame by frame")]
#[command(version)]
struct Args {
    /// Backend API base URL
    #[arg(long)]
    gateway_url: Option<String>,

    /// Bearer token for the backend API
    #[arg(long)]
    token: Option<String>,

    /// Session profile (separate reviewers keep separate progress)
    #[arg(long)]
    profile: Option<String>,

    /// Folder holding the session database
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Configuration file (default: <config_dir>/avr/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging first so config-loading warnings are visible
    let log_level = logging::init();

    let toml_config =
        config::load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    let overrides = Overrides {
        gateway_url: args.gateway_url,
        token: args.token,
        profile: args.profile,
        data_folder: args.data_folder,
    };
    let settings = VerifyConfig::resolve(&overrides, &toml_config);
    log_level
        .apply_config_level(&settings.log_level)
        .context("Invalid log level in configuration")?;

    info!("Starting {}", build_info::banner());
    settings.log_summary(args.config.as_deref());

    let db_path = settings.database_path();
    info!("Database path: {}", db_path.display());
    let store = open_session_store(&db_path, &settings.session)
        .await
        .context("Failed to open session database")?;

    let gateway =
        HttpGateway::from_config(&settings.gateway).context("Failed to create API client")?;

    let events = EventBus::default();
    spawn_event_logger(&events);

    let input = SharedLines::new(BufReader::new(tokio::io::stdin()));
    let prompt = TerminalPrompt::new(input.clone());

    let mut navigator = Navigator::open(store, gateway, prompt, events)
        .await
        .context("Failed to load review session")?;

    console::run(&mut navigator, input)
        .await
        .context("Failed to read from terminal")?;

    info!("avr-verify exiting");
    Ok(())
}

/// Log review events as they happen
fn spawn_event_logger(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event @ (ReviewEvent::PhaseChanged { .. } | ReviewEvent::Loading { .. })) => {
                    debug!(?event, "Review event")
                }
                Ok(event) => info!(?event, "Review event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event logger lagged")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
