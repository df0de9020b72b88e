//! Command dispatch and interactive REPL

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use tracing::debug;

use reaper_remote::config::SettingsProvider;
use reaper_remote::error::{ErrorKind, RemoteError};
use reaper_remote::format;
use reaper_remote::paths::ReaperPaths;
use reaper_remote::service::WebRemoteService;

/// Operations available both as subcommands and inside the REPL
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the Web Remote entry found in reaper.ini
    Config,
    /// List every control surface configured in reaper.ini
    Surfaces,
    /// Add a new enabled Web Remote entry listening on PORT
    SetPort { port: u16 },
    /// Enable the first Web Remote entry
    Enable,
    /// Disable the first Web Remote entry
    Disable,
    /// Show live track state
    Tracks {
        /// Only list track names
        #[arg(long)]
        names: bool,
    },
    /// Show project information reported by the Web Remote
    Info,
    /// Check whether the Web Remote answers
    Status,
    /// Show where REAPER's files are expected on this machine
    Paths,
    /// Start an interactive shell
    Shell,
}

/// One REPL input line, parsed like a subcommand
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Command,
}

/// Run one operation and render its result
pub async fn execute<P: SettingsProvider>(
    service: &WebRemoteService<P>,
    command: &Command,
    json: bool,
) -> Result<String> {
    debug!("Executing {:?}", command);
    let output = match command {
        Command::Config => {
            let config = service.get_web_remote_config().await?;
            render(json, &config, format::format_web_remote_config)?
        }
        Command::Surfaces => {
            let entries = service.list_surfaces().await?;
            render(json, &entries, |e| format::format_surfaces(e))?
        }
        Command::SetPort { port } => {
            let id = service.set_web_remote_port(*port).await?;
            format!(
                "Added Web Remote csurf_{} on port {}. Restart REAPER to apply.",
                id, port
            )
        }
        Command::Enable | Command::Disable => {
            let enabled = *command == Command::Enable;
            let config = service.set_web_remote_enabled(enabled).await?;
            format!(
                "Web Remote csurf_{} (port {}) {}. Restart REAPER to apply.",
                config.csurf_id,
                config.port,
                if enabled { "enabled" } else { "disabled" }
            )
        }
        Command::Tracks { names: true } => {
            let names = service.get_track_names().await?;
            render(json, &names, |n| format::format_track_names(n))?
        }
        Command::Tracks { names: false } => {
            let tracks = service.get_tracks().await?;
            render(json, &tracks, |t| format::format_tracks_table(t))?
        }
        Command::Info => {
            let info = service.get_project_info().await?;
            render(json, &info, format::format_project_info)?
        }
        Command::Status => {
            if service.is_running().await {
                "REAPER Web Remote is reachable".to_string()
            } else {
                "REAPER Web Remote is not reachable".to_string()
            }
        }
        Command::Paths => {
            let paths = ReaperPaths::detect()?;
            format!(
                "Resource dir: {}\nreaper.ini:   {} ({})\nScripts:      {}",
                paths.resource_dir.display(),
                paths.ini.display(),
                if paths.ini.is_file() { "found" } else { "missing" },
                paths.scripts_dir.display()
            )
        }
        Command::Shell => anyhow::bail!("already in the interactive shell"),
    };
    Ok(output)
}

fn render<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
    if json {
        serde_json::to_string_pretty(value).context("Failed to serialize output")
    } else {
        Ok(text(value))
    }
}

/// Actionable hint for a failed operation, if there is one
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let remote = err.downcast_ref::<RemoteError>()?;
    match (remote.kind(), remote) {
        (_, RemoteError::SurfaceNotFound { .. }) => Some(
            "Enable Web Remote in REAPER (Preferences > Control/OSC/web) or run `set-port <port>`",
        ),
        (ErrorKind::NotFound, _) => Some("Pass --ini <path> if REAPER uses a portable install"),
        (ErrorKind::Connection, _) => {
            Some("Is REAPER running with the Web Remote control surface enabled?")
        }
        (ErrorKind::WriteFailure, _) => Some("Close REAPER before editing reaper.ini"),
        _ => None,
    }
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);
    if let Some(hint) = hint(err) {
        eprintln!("{} {}", "hint:".yellow(), hint);
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    for (name, about) in [
        ("config", "show the Web Remote entry"),
        ("surfaces", "list control surfaces"),
        ("set-port <port>", "add a Web Remote entry"),
        ("enable | disable", "toggle the Web Remote entry"),
        ("tracks [--names]", "show live track state"),
        ("info", "show project information"),
        ("status", "check the Web Remote"),
        ("paths", "show REAPER file locations"),
        ("exit", "leave the shell"),
    ] {
        println!("  {:<18} {}", name.cyan(), about);
    }
}

pub async fn run_repl<P: SettingsProvider>(service: &WebRemoteService<P>, json: bool) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", "=== REAPER Web Remote ===".bold().cyan());
    println!("Type `help` for commands, `exit` to quit\n");

    loop {
        let line = match rl.readline("reaper> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match line {
            "exit" | "quit" => break,
            "help" | "?" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let command = match ReplLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                eprintln!("{}", e.render());
                continue;
            }
        };

        match execute(service, &command, json).await {
            Ok(output) => println!("{}\n", output),
            Err(e) => print_error(&e),
        }
    }

    Ok(())
}
