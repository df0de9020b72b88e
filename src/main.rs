//! REAPER Remote
//!
//! Finds, creates and toggles REAPER's Web Remote control surface in
//! `reaper.ini`, and reads live track state from it.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::Command;
use reaper_remote::config::Settings;
use reaper_remote::service::WebRemoteService;

/// REAPER Remote - configure and query REAPER's Web Remote
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to reaper.ini (defaults to the platform's REAPER resource directory)
    #[arg(long, env = "REAPER_INI", global = true)]
    ini: Option<PathBuf>,

    /// Web Remote port (0 or unset: detect from reaper.ini)
    #[arg(short, long, env = "REAPER_WEB_PORT", global = true)]
    port: Option<u16>,

    /// Path to the settings file
    #[arg(long, env = "REAPER_REMOTE_SETTINGS", default_value = "reaper-remote.yaml")]
    settings: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    let settings = Settings::load(&args.settings)
        .await
        .with_context(|| format!("Failed to load settings from {}", args.settings.display()))?
        .with_overrides(args.port, args.ini.clone());
    info!(
        "Settings: port={} ini={:?}",
        settings.web_remote_port, settings.reaper_ini
    );

    let service = WebRemoteService::from_settings(settings);

    match args.command.unwrap_or(Command::Shell) {
        Command::Shell => cli::run_repl(&service, args.json).await,
        command => match cli::execute(&service, &command, args.json).await {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => {
                cli::print_error(&e);
                std::process::exit(1);
            }
        },
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
