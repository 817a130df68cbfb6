//! peon-pet: headless driver for the desktop pet.
//!
//! Polls the hook state file, feeds records through `PetEngine`, and runs the
//! render tick. With no window attached, intents are routed to logs.
//!
//! ## Subcommands
//!
//! - `run`: live poll + render loop
//! - `replay`: feed a JSONL event log through the engine on a virtual clock
//! - `skins`: print the built-in skin tables as JSON

mod logging;
mod poller;
mod replay;
mod runner;
mod sink;

use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use peon_core::{load_config, PetConfig, SKINS};

use crate::replay::ReplayOptions;

#[derive(Parser)]
#[command(name = "peon-pet")]
#[command(about = "Desktop pet that reacts to coding-assistant hook events")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.peon-pet/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log to stderr instead of ~/.peon-pet/logs
    #[arg(long, global = true)]
    stderr_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the hook state file and drive the sprite
    Run {
        /// State file written by the hook (overrides config)
        #[arg(long, value_name = "PATH")]
        state_file: Option<PathBuf>,

        /// Skin name (overrides config)
        #[arg(long)]
        skin: Option<String>,
    },

    /// Replay a JSONL event log on a virtual clock, printing intents as JSON lines
    Replay {
        /// Event log, one record per line
        #[arg(value_name = "JSONL")]
        path: PathBuf,

        /// Skin name (overrides config)
        #[arg(long)]
        skin: Option<String>,

        /// Simulated render ticks per second
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
        fps: u32,

        /// Virtual milliseconds simulated after the last record
        #[arg(long, default_value_t = 2_000)]
        tail_ms: u64,
    },

    /// List built-in skins with their animation and event tables
    Skins,
}

fn main() {
    let cli = Cli::parse();
    // Replay and skins own stdout; keep their logs off it.
    let to_stderr = cli.stderr_log || !matches!(cli.command, Commands::Run { .. });
    let _logging_guard = logging::init(to_stderr);

    let result = match cli.command {
        Commands::Run { state_file, skin } => resolve_config(cli.config, skin)
            .and_then(|config| {
                let state_file = match state_file.or_else(|| config.state_file_path()) {
                    Some(path) => path,
                    None => return Err("Home directory not found".to_string()),
                };
                runner::run(&config, state_file)
            }),
        Commands::Replay {
            path,
            skin,
            fps,
            tail_ms,
        } => resolve_config(cli.config, skin).and_then(|config| {
            let file = fs_err::File::open(&path).map_err(|err| err.to_string())?;
            let stdout = io::stdout();
            replay::replay(
                BufReader::new(file),
                stdout.lock(),
                &config,
                ReplayOptions { fps, tail_ms },
            )
            .map(|_| ())
        }),
        Commands::Skins => print_skins(),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "peon-pet failed");
        eprintln!("peon-pet: {}", err);
        std::process::exit(1);
    }
}

/// Loads config, applies the CLI skin override, and re-validates.
fn resolve_config(path: Option<PathBuf>, skin: Option<String>) -> Result<PetConfig, String> {
    let mut config = load_config(path).map_err(String::from)?;
    if let Some(skin) = skin {
        config.animation.skin = skin;
    }
    peon_core::skin_by_name(&config.animation.skin).map_err(String::from)?;
    Ok(config)
}

fn print_skins() -> Result<(), String> {
    let json = serde_json::to_string_pretty(SKINS)
        .map_err(|err| format!("Failed to serialize skins: {}", err))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json).map_err(|err| err.to_string())
}
