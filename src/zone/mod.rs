//! Zone assembly
//!
//! This module handles:
//! - Pending marker accumulation per zone type
//! - Finalizing ten markers into a persisted zone
//! - The overlay cache of persisted zones and their hulls

pub mod accumulator;
pub mod finalizer;
pub mod overlay;

use crate::coord::hull::HullPolygon;
use crate::coord::{Coordinates, ZoneType};
use serde::{Deserialize, Serialize};

/// One entry of a geocoder's hierarchical context (neighborhood, city, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: String,
    pub text: String,
}

/// A single map marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Coordinates,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,

    #[serde(default)]
    pub context: Vec<ContextEntry>,

    /// ISO-8601 creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Backend id once the marker has been persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl Marker {
    /// Create a bare marker stamped with the current time
    pub fn new(position: Coordinates) -> Self {
        Self {
            position,
            description: None,
            place_name: None,
            context: Vec::new(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            server_id: None,
        }
    }

    /// Set the operator-supplied description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display label: place name, then description, then coordinates
    pub fn label(&self) -> String {
        self.place_name
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| self.position.to_string())
    }
}

/// A persisted zone of exactly ten markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub zone_type: ZoneType,
    pub markers: Vec<Marker>,
    pub hull: HullPolygon,
}

impl Zone {
    /// Marker positions in zone order
    pub fn positions(&self) -> Vec<Coordinates> {
        self.markers.iter().map(|m| m.position).collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Marker;
    use crate::coord::Coordinates;

    /// Ten markers: a unit square's corners plus six interior points
    pub fn square_markers(offset: f64) -> Vec<Marker> {
        [
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.5, 0.5),
            (0.2, 0.3),
            (0.7, 0.1),
            (0.4, 0.9),
            (0.6, 0.6),
            (0.1, 0.8),
        ]
        .iter()
        .map(|(lat, lng)| Marker::new(Coordinates::new(lat + offset, lng + offset)))
        .collect()
    }
}
