//! Coordinates and zone classification
//!
//! `Coordinates` is the only in-memory representation of a position and is
//! always latitude first. The `[lng, lat]` ordering used by the backend is
//! produced exclusively by [`Coordinates::to_lng_lat`] at the wire boundary.

pub mod hull;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance in degrees when deciding two clicks hit the same spot
pub const COORD_EPSILON: f64 = 1e-9;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a backend `[lng, lat]` pair
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    /// Backend `[lng, lat]` pair
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Whether two coordinates denote the same map position
    pub fn same_position(&self, other: &Coordinates) -> bool {
        (self.lat - other.lat).abs() < COORD_EPSILON && (self.lng - other.lng).abs() < COORD_EPSILON
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Kind of zone an operator is drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Safe,
    Dangerous,
}

impl ZoneType {
    /// Backend path prefix (`safe` or `danger`)
    pub fn path_prefix(&self) -> &'static str {
        match self {
            ZoneType::Safe => "safe",
            ZoneType::Dangerous => "danger",
        }
    }

    /// Whether markers of this type must carry a description
    pub fn requires_description(&self) -> bool {
        matches!(self, ZoneType::Dangerous)
    }

    /// Both zone types, in load order
    pub fn all() -> [ZoneType; 2] {
        [ZoneType::Safe, ZoneType::Dangerous]
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneType::Safe => write!(f, "safe"),
            ZoneType::Dangerous => write!(f, "dangerous"),
        }
    }
}

impl FromStr for ZoneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(ZoneType::Safe),
            "dangerous" | "danger" => Ok(ZoneType::Dangerous),
            _ => Err(format!(
                "Unknown zone type: {}. Valid types: safe, dangerous",
                s
            )),
        }
    }
}
