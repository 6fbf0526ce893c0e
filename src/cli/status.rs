//! Status command handler
//!
//! Shows the configured backend and whether it is reachable.

use crate::api::ZoneBackend;
use crate::config::Config;
use crate::coord::ZoneType;
use crate::error::Result;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Also count zones of each type
    #[arg(long)]
    pub zones: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;
    let client = super::api_client(&config)?;
    let context = client.context();

    println!("safezone v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Backend: {}", context.base_url);
    println!(
        "Token: {}",
        if context.token.is_some() { "configured" } else { "not configured" }
    );
    match context.timeout {
        Some(timeout) => println!("Timeout: {}s", timeout.as_secs()),
        None => println!("Timeout: none"),
    }
    println!();

    match client.ping().await {
        Ok(status) => println!("Server: REACHABLE (status {})", status),
        Err(e) => {
            println!("Server: NOT REACHABLE ({})", e);
            return Ok(());
        }
    }

    if args.zones {
        for zone_type in ZoneType::all() {
            match client.list_zones(zone_type).await {
                Ok(zones) => println!("  {} zones: {}", zone_type, zones.len()),
                Err(e) => println!("  {} zones: error ({})", zone_type, e),
            }
        }
    }

    Ok(())
}
