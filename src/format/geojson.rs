//! GeoJSON output formatter
//!
//! Emits one polygon feature per zone hull, the same shape the overlay layer
//! renders.

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::zone::overlay::FeatureCollection;
use crate::zone::Zone;

pub struct GeoJsonFormatter;

impl OutputFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "Hull polygons as a GeoJSON FeatureCollection"
    }

    fn format(&self, zones: &[Zone]) -> Result<String> {
        let collection = FeatureCollection {
            kind: "FeatureCollection",
            features: zones.iter().map(|z| &z.hull).collect(),
        };
        Ok(serde_json::to_string_pretty(&collection)?)
    }
}
