//! whispr-hotkeys - inspect and check Whispr's global hotkey settings

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use whispr_hotkeys::config::{self, ConfigError, Settings};
use whispr_hotkeys::hotkeys::parse_combo;
use whispr_hotkeys::logging;
use whispr_hotkeys::session::detect_session_type;
use whispr_hotkeys::shortcuts::{normalize, normalized_bindings, validate};

/// Inspect and check Whispr's global hotkey settings
#[derive(Parser)]
#[command(name = "whispr-hotkeys")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized form of each combo
    Normalize {
        /// Combos as typed, e.g. "ctrl+shift+r"
        #[arg(required = true)]
        combos: Vec<String>,
    },

    /// Validate the hotkey bindings in a settings file
    Check {
        /// Settings file (default: ~/.whispr/settings.json)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Print the desktop session type and whether it supports global hotkeys
    Session,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = logging::init();

    let result = match cli.command {
        Commands::Normalize { combos } => {
            run_normalize(&combos);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { settings } => run_check(settings),
        Commands::Session => {
            run_session();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_normalize(combos: &[String]) {
    for combo in combos {
        println!("{}", normalize(combo));
    }
}

fn run_check(path: Option<PathBuf>) -> Result<ExitCode> {
    let settings = load_for_check(path)?;

    if let Err(e) = validate(&settings.hotkeys) {
        warn!(binding = ?e.binding(), error = %e, "Hotkey settings rejected");
        println!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    for binding in normalized_bindings(&settings.hotkeys) {
        println!("{:<14} {}", format!("{}:", binding.label()), binding.combo);
        if let Err(e) = parse_combo(binding.combo.as_str()) {
            println!("  warning: {}", e);
        }
    }

    let session = detect_session_type();
    if !session.hotkeys_supported() {
        println!(
            "warning: global hotkeys are not supported in a {} session",
            session
        );
    }

    info!(
        policy = ?settings.dispatch.policy,
        queue_capacity = settings.dispatch.queue_capacity,
        "Hotkey settings valid"
    );
    Ok(ExitCode::SUCCESS)
}

/// Strict load. A missing file at the default location means defaults.
fn load_for_check(path: Option<PathBuf>) -> Result<Settings> {
    match config::try_load_settings(path.as_deref()) {
        Ok(settings) => Ok(settings),
        Err(ConfigError::Io { ref source, .. })
            if path.is_none() && source.kind() == ErrorKind::NotFound =>
        {
            info!("No settings file, checking defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e).context("Failed to load settings"),
    }
}

fn run_session() {
    let session = detect_session_type();
    println!("session: {}", session);
    println!("hotkeys supported: {}", session.hotkeys_supported());
}
