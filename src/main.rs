//! Diagnostics and support CLI for provider health.
//!
//! ```text
//! playback-failover [--config FILE] status
//! playback-failover embed 603 [--tv --season 1 --episode 2] [--provider ID]
//! playback-failover fail|succeed <provider>
//! playback-failover sweep | reset | monitor
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use playback_failover::config::{load_config, FailoverConfig};
use playback_failover::observability::logging::init_logging;
use playback_failover::providers::ContentRef;
use playback_failover::{Services, Shutdown};

#[derive(Parser)]
#[command(name = "playback-failover")]
#[command(about = "Inspect and manage embed provider health", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "playback-failover.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List providers with their alive/dead state
    Status,
    /// Show which provider a new session would use and its embed URL
    Embed {
        content_id: String,
        /// Content is a TV episode
        #[arg(long)]
        tv: bool,
        #[arg(long, default_value_t = 1)]
        season: u32,
        #[arg(long, default_value_t = 1)]
        episode: u32,
        /// Preferred provider id
        #[arg(long)]
        provider: Option<String>,
    },
    /// Record a load failure for a provider
    Fail { provider: String },
    /// Record a successful load for a provider
    Succeed { provider: String },
    /// Run one recovery sweep now
    Sweep,
    /// Clear all provider health records
    Reset,
    /// Run the periodic recovery sweep until interrupted
    Monitor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        FailoverConfig::default()
    };
    init_logging(&config.observability);
    if !cli.config.exists() {
        tracing::warn!(path = ?cli.config, "Config file not found, using defaults");
    }

    let services = Services::from_config(config);
    let registry = &services.registry;
    let controller = &services.controller;

    match cli.command {
        Commands::Status => {
            let statuses = controller.selector().annotated(controller.catalog().all());
            print_json(&json!({
                "failure_threshold": registry.failure_threshold(),
                "providers": statuses,
            }))?;
        }
        Commands::Embed {
            content_id,
            tv,
            season,
            episode,
            provider,
        } => {
            let content = if tv {
                ContentRef::episode(content_id, season, episode)
            } else {
                ContentRef::movie(content_id)
            };
            let selected = controller.resolve(provider.as_deref())?;
            print_json(&json!({
                "provider": selected.id,
                "display_name": selected.display_name,
                "supports_subtitles": selected.supports_subtitles,
                "embed_url": selected.embed_url(&content),
            }))?;
        }
        Commands::Fail { provider } => {
            registry.report_failure(&provider);
            print_json(&json!({ "provider": provider, "health": registry.record(&provider) }))?;
        }
        Commands::Succeed { provider } => {
            registry.report_success(&provider);
            print_json(&json!({ "provider": provider, "health": registry.record(&provider) }))?;
        }
        Commands::Sweep => {
            let changed = registry.sweep_now();
            print_json(&json!({ "changed": changed }))?;
        }
        Commands::Reset => {
            registry.reset_all();
            print_json(&json!({ "reset": true }))?;
        }
        Commands::Monitor => {
            let shutdown = Shutdown::new();
            let sweeper = services.spawn_sweeper(&shutdown);
            shutdown.trigger_on_ctrl_c().await;
            sweeper.await?;
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
