//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod draw;
pub mod geocode;
pub mod status;
pub mod zones;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// SafeZone operator client
#[derive(Parser)]
#[command(name = "safezone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forward and reverse geocoding
    Geocode(geocode::GeocodeArgs),

    /// List, delete and refresh completed zones
    Zones(zones::ZonesArgs),

    /// Draw zones from a stream of map clicks
    Draw(draw::DrawArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show backend status
    Status(status::StatusArgs),
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the level
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Client for the configured backend
pub(crate) fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(config.request_context())
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Geocode(args) => geocode::run(args).await,
        Commands::Zones(args) => zones::run(args).await,
        Commands::Draw(args) => draw::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}
