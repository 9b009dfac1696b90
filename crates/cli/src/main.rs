//! Heavy Slam CLI
//!
//! A command-line form for estimating a Pokemon's catch rate from its
//! health, ball and status, using the lookup relay for the Pokemon's
//! weight and sprite.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{estimate, interactive, lookup, rates};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Heavy Slam catch-rate estimator
#[derive(Parser)]
#[command(name = "heavy-slam")]
#[command(author, version, about = "Heavy Slam catch-rate estimator", long_about = None)]
pub struct Cli {
    /// Relay URL (can also be set via HEAVY_SLAM_RELAY_URL or the config file)
    #[arg(long, env = "HEAVY_SLAM_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Seconds to wait for the relay before giving up on a lookup
    #[arg(long, env = "HEAVY_SLAM_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// Output format (defaults to the config file's, then table)
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate a catch rate from the given form fields
    Estimate(estimate::EstimateArgs),

    /// Look up a Pokemon through the relay
    Lookup {
        /// Pokemon name (case-insensitive)
        name: String,
    },

    /// Fill in the form interactively
    Interactive,

    /// Show the ball and status rate tables
    Rates,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = config::Config::load()?;
    let format = cli
        .format
        .or_else(|| {
            file_config
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_config)
        })
        .unwrap_or_default();

    let relay_url = file_config.relay_url(cli.relay_url.as_deref());
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Commands::Estimate(args) => {
            let client = client::RelayClient::new(&relay_url, timeout)?;
            estimate::run_estimate(&client, &args, format).await?;
        }
        Commands::Lookup { name } => {
            let client = client::RelayClient::new(&relay_url, timeout)?;
            lookup::lookup_subject(&client, &name, format).await?;
        }
        Commands::Interactive => {
            let client = client::RelayClient::new(&relay_url, timeout)?;
            interactive::run(Arc::new(client), format).await?;
        }
        Commands::Rates => {
            rates::show_rates(format)?;
        }
    }

    Ok(())
}
