//! Zones command handler
//!
//! Lists completed zones with their recomputed hulls, and deletes or refreshes
//! individual zones.

use crate::config::Config;
use crate::coord::ZoneType;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geocode::gateway::GatewayGeocoder;
use crate::map::MapController;
use crate::zone::overlay::OverlayStore;
use clap::{Args, Subcommand};

/// Zones command arguments
#[derive(Args)]
pub struct ZonesArgs {
    #[command(subcommand)]
    pub command: ZonesCommand,
}

/// Zones subcommands
#[derive(Subcommand)]
pub enum ZonesCommand {
    /// List completed zones
    List {
        /// Only zones of this type (safe, dangerous)
        #[arg(long = "type", short = 't')]
        zone_type: Option<ZoneType>,

        /// Output format (json, geojson, text, gpx)
        #[arg(long, short = 'f')]
        format: Option<String>,
    },
    /// Delete a zone and its markers
    Delete {
        /// Zone type (safe, dangerous)
        zone_type: ZoneType,

        /// Zone ID
        id: String,
    },
    /// Re-run place lookups for a zone's markers
    Refresh {
        /// Zone ID
        id: String,
    },
}

/// Run the zones command
pub async fn run(args: ZonesArgs) -> Result<()> {
    let config = Config::load()?;

    match args.command {
        ZonesCommand::List { zone_type, format } => {
            let format = format.unwrap_or_else(|| config.map.default_format.clone());
            list_zones(&config, zone_type, &format).await
        }
        ZonesCommand::Delete { zone_type, id } => delete_zone(&config, zone_type, &id).await,
        ZonesCommand::Refresh { id } => refresh_zone(&config, &id).await,
    }
}

async fn list_zones(config: &Config, zone_type: Option<ZoneType>, format: &str) -> Result<()> {
    let formatter = get_formatter(format).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Validation(format!(
            "Unknown format: {}. Available: {}",
            format,
            names.join(", ")
        ))
    })?;

    let client = super::api_client(config)?;
    let mut store = OverlayStore::new();
    let summary = store.load(&client).await?;
    if summary.skipped > 0 {
        eprintln!("{} zone(s) skipped: degenerate hull", summary.skipped);
    }

    print!("{}", formatter.format(&store.zones(zone_type))?);
    Ok(())
}

async fn session(config: &Config) -> Result<MapController<GatewayGeocoder, crate::api::ApiClient>> {
    let client = super::api_client(config)?;
    let mut map = MapController::new(GatewayGeocoder::new(client.clone()), client);
    map.reload().await?;
    Ok(map)
}

async fn delete_zone(config: &Config, zone_type: ZoneType, id: &str) -> Result<()> {
    let mut map = session(config).await?;

    match map.overlays().zone_type(id) {
        Some(t) if t == zone_type => {}
        Some(t) => {
            return Err(Error::Validation(format!(
                "Zone {} is a {} zone, not {}",
                id, t, zone_type
            )))
        }
        None => return Err(Error::NotFound(format!("{} zone {}", zone_type, id))),
    }

    map.delete_zone(id).await?;
    println!("Deleted {} zone {}", zone_type, id);
    Ok(())
}

async fn refresh_zone(config: &Config, id: &str) -> Result<()> {
    let mut map = session(config).await?;
    let zone = map.refresh_zone_places(id).await?;

    println!("Refreshed {} zone {}", zone.zone_type, zone.id);
    for marker in &zone.markers {
        println!("  {} {}", marker.position, marker.label());
    }
    Ok(())
}
