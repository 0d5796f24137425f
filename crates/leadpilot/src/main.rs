// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadpilot - lead scoring, agent orchestration and campaign activation.
//!
//! This is the binary entry point for the `leadpilot` CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod doctor;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadpilot_config::LeadpilotConfig;
use leadpilot_core::LeadpilotError;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::app::Services;

/// Leadpilot - lead scoring, agent orchestration and campaign activation.
#[derive(Parser, Debug)]
#[command(name = "leadpilot", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a contact now and persist the result.
    Score { contact: String },
    /// Queue a background scoring job for a contact.
    EnqueueScore { contact: String },
    /// Process scoring jobs until interrupted.
    Worker {
        /// Drain the queue once and exit.
        #[arg(long)]
        once: bool,
    },
    /// Activate every pending or active member of a campaign.
    Activate { campaign: String },
    /// Re-drive the failed members of a campaign.
    RetryFailed { campaign: String },
    /// Recalculate a contact's active agent and queue.
    Recalc { contact: String },
    /// Route a contact to customer service for a while, or clear help mode.
    HelpMode {
        contact: String,
        /// Help mode window in minutes. Defaults to `orchestrator.help_mode_minutes`.
        #[arg(long, conflicts_with = "clear")]
        minutes: Option<u32>,
        /// Leave help mode.
        #[arg(long)]
        clear: bool,
    },
    /// Mark past-due assignments expired and recalculate affected contacts.
    Expire,
    /// Show a contact's score and agents.
    Status { contact: String },
    /// Run diagnostic checks.
    Doctor {
        /// Also run integrity and memory checks.
        #[arg(long)]
        deep: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => leadpilot_config::load_and_validate_path(path),
        None => leadpilot_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadpilot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    if let Err(e) = run(cli, config).await {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: LeadpilotConfig) -> Result<(), LeadpilotError> {
    let json = cli.json;

    if let Commands::Doctor { deep } = cli.command {
        return doctor::run_doctor(&config, cli.config.as_deref(), deep, cli.plain).await;
    }

    let services = Services::open(config).await?;
    let result = match cli.command {
        Commands::Score { contact } => commands::run_score(&services, &contact, json).await,
        Commands::EnqueueScore { contact } => {
            commands::run_enqueue_score(&services, &contact, json).await
        }
        Commands::Worker { once } => commands::run_worker(&services, once, json).await,
        Commands::Activate { campaign } => {
            commands::run_activate(&services, &campaign, false, json).await
        }
        Commands::RetryFailed { campaign } => {
            commands::run_activate(&services, &campaign, true, json).await
        }
        Commands::Recalc { contact } => commands::run_recalc(&services, &contact, json).await,
        Commands::HelpMode {
            contact,
            minutes,
            clear,
        } => commands::run_help_mode(&services, &contact, minutes, clear, json).await,
        Commands::Expire => commands::run_expire(&services, json).await,
        Commands::Status { contact } => {
            status::run_status(&services, &contact, json, cli.plain).await
        }
        Commands::Doctor { .. } => Ok(()),
    };

    if let Err(e) = services.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    result
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins when set. Otherwise the configured level applies to every
/// `leadpilot*` target and everything else logs at warn.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadpilot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = leadpilot_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.service.name, "leadpilot");
    }

    #[test]
    fn cli_parses_help_mode_minutes() {
        let cli = Cli::try_parse_from(["leadpilot", "help-mode", "c-1", "--minutes", "15"]).unwrap();
        match cli.command {
            Commands::HelpMode {
                contact,
                minutes,
                clear,
            } => {
                assert_eq!(contact, "c-1");
                assert_eq!(minutes, Some(15));
                assert!(!clear);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_minutes_with_clear() {
        let result =
            Cli::try_parse_from(["leadpilot", "help-mode", "c-1", "--minutes", "15", "--clear"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "leadpilot",
            "status",
            "c-1",
            "--json",
            "--config",
            "/tmp/leadpilot.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/leadpilot.toml")));
        assert!(matches!(cli.command, Commands::Status { .. }));
    }

    #[test]
    fn cli_parses_worker_once() {
        let cli = Cli::try_parse_from(["leadpilot", "worker", "--once"]).unwrap();
        assert!(matches!(cli.command, Commands::Worker { once: true }));
    }
}
