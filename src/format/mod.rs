//! Output formatters
//!
//! Provides trait-based output formatting for zone listings.

pub mod geojson;
pub mod gpx;
pub mod json;
pub mod text;

use crate::error::Result;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a list of zones
    fn format(&self, zones: &[Zone]) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "geojson" => Some(Box::new(geojson::GeoJsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        Box::new(json::JsonFormatter) as Box<dyn OutputFormatter>,
        Box::new(geojson::GeoJsonFormatter),
        Box::new(text::TextFormatter),
        Box::new(gpx::GpxFormatter),
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}
