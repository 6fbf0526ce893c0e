//! Geocode command handler
//!
//! One-off lookups through the backend's geocoding proxy.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::geocode::gateway::GatewayGeocoder;
use crate::geocode::{GeoBackend, GeocodeFeature};
use clap::{Args, Subcommand};

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    #[command(subcommand)]
    pub command: GeocodeCommand,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

/// Geocode subcommands
#[derive(Subcommand)]
pub enum GeocodeCommand {
    /// Search for a place by name or address
    Forward {
        /// Free-text query
        query: String,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Look up the place at a coordinate
    Reverse {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = GatewayGeocoder::new(super::api_client(&config)?);

    let features = match args.command {
        GeocodeCommand::Forward { query, limit } => {
            let limit = limit.unwrap_or(config.geocode.forward_limit);
            geocoder.forward_geocode(&query, limit).await?
        }
        GeocodeCommand::Reverse { lat, lng } => {
            let coords = Coordinates::new(lat, lng);
            coords.validate()?;
            geocoder.reverse_geocode(coords).await?.into_iter().collect()
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&features)?);
    } else {
        print!("{}", render(&features));
    }
    Ok(())
}

fn render(features: &[GeocodeFeature]) -> String {
    if features.is_empty() {
        return "No results\n".to_string();
    }

    let mut output = String::new();
    for (i, feature) in features.iter().enumerate() {
        output.push_str(&format!(
            "{:>2}. {} {}\n",
            i + 1,
            feature.coordinates,
            feature.place_name
        ));
        let context: Vec<&str> = feature.context.iter().map(|c| c.text.as_str()).collect();
        if !context.is_empty() {
            output.push_str(&format!("    {}\n", context.join(", ")));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ContextEntry;

    #[test]
    fn test_render_features() {
        let features = vec![GeocodeFeature {
            coordinates: Coordinates::new(48.8566, 2.3522),
            place_name: "Paris, France".to_string(),
            context: vec![ContextEntry {
                id: "country.1".to_string(),
                text: "France".to_string(),
            }],
        }];

        let output = render(&features);
        assert!(output.contains(" 1. (48.856600, 2.352200) Paris, France"));
        assert!(output.contains("    France\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "No results\n");
    }
}
