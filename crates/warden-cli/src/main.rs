//! Warden CLI - confined SFTP filesystem adapter.
//!
//! `warden serve` runs one session over JSON lines on stdin/stdout;
//! `warden ls` lists a directory through the same confinement rules.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use warden_config::{Config, ResolvedConfig};

mod commands;
pub mod config_bridge;
mod theme;
mod wire;

use commands::{ls, serve};
use theme::Theme;

/// Warden - confined SFTP filesystem adapter
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one session: JSON requests on stdin, JSON replies on stdout
    Serve {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// List a directory as a client would see it
    Ls {
        #[command(flatten)]
        session: SessionArgs,

        /// Directory to list, relative to the root
        #[arg(default_value = "/")]
        path: String,
    },
}

/// Options shared by every command that opens a session.
#[derive(Args)]
struct SessionArgs {
    /// Directory to confine the session to (overrides `session.root`)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,
}

impl SessionArgs {
    /// Load layered config and apply the `--root` override.
    fn load(&self) -> Result<ResolvedConfig> {
        let mut resolved =
            Config::load(self.config.as_deref()).context("failed to load configuration")?;
        if let Some(root) = &self.root {
            resolved.config.session.root = std::path::absolute(root)
                .with_context(|| format!("cannot resolve root {}", root.display()))?;
        }
        Ok(resolved)
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let session_args = match &cli.command {
        Commands::Serve { session } | Commands::Ls { session, .. } => session,
    };
    let ResolvedConfig {
        config,
        loaded_files,
    } = session_args.load()?;

    // Set up logging from config, with --verbose override.
    let mut log_config = config_bridge::to_log_config(&config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = warden_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    for file in &loaded_files {
        debug!(file = %file, "config layer");
    }

    let options = config_bridge::to_session_options(&config);
    match cli.command {
        Commands::Serve { .. } => serve::run_serve(&config.session.root, options),
        Commands::Ls { path, .. } => ls::run_ls(&config.session.root, options, &path),
    }
}
