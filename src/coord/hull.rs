//! Convex hull polygons for zones
//!
//! Hulls are computed with `geo`'s convex hull over `(lng, lat)` points and
//! stored as a GeoJSON `Feature` so overlays can be handed to a map renderer
//! unchanged.

use crate::constants::zone::{MIN_HULL_AREA, MIN_HULL_VERTICES, ZONE_SIZE};
use crate::coord::{Coordinates, ZoneType};
use crate::error::{Error, Result};
use geo::{Area, ConvexHull, MultiPoint, Point};
use serde::{Deserialize, Serialize};

/// GeoJSON polygon geometry, rings of `[lng, lat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// Zone metadata attached to a hull once the zone exists on the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HullProperties {
    #[serde(rename = "zoneType", skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
    #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

/// Convex hull of a zone's markers as a GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullPolygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PolygonGeometry,
    #[serde(default)]
    pub properties: HullProperties,
}

impl HullPolygon {
    fn from_ring(ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: PolygonGeometry {
                kind: "Polygon".to_string(),
                coordinates: vec![ring],
            },
            properties: HullProperties::default(),
        }
    }

    /// Tag the hull with the zone it belongs to
    pub fn with_zone(mut self, zone_type: ZoneType, zone_id: impl Into<String>) -> Self {
        self.properties = HullProperties {
            zone_type: Some(zone_type),
            zone_id: Some(zone_id.into()),
        };
        self
    }

    /// Exterior ring as `[lng, lat]`, closed (first == last)
    pub fn ring(&self) -> &[[f64; 2]] {
        self.geometry
            .coordinates
            .first()
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct hull vertices, without the closing point
    pub fn vertices(&self) -> Vec<Coordinates> {
        let ring = self.ring();
        let open = match ring.split_last() {
            Some((last, rest)) if rest.first() == Some(last) => rest,
            _ => ring,
        };
        open.iter().map(|p| Coordinates::from_lng_lat(*p)).collect()
    }
}

/// Compute the convex hull of at least three points
///
/// Collinear or coincident inputs are rejected with [`Error::Hull`]: a zone
/// without an enclosing area cannot be drawn.
pub fn convex_hull(points: &[Coordinates]) -> Result<HullPolygon> {
    if points.len() < MIN_HULL_VERTICES {
        return Err(Error::Hull(format!(
            "Need at least {} points, got {}",
            MIN_HULL_VERTICES,
            points.len()
        )));
    }

    let multi_point: MultiPoint<f64> = points
        .iter()
        .map(|c| Point::new(c.lng, c.lat))
        .collect::<Vec<_>>()
        .into();
    let hull = multi_point.convex_hull();

    let mut distinct: Vec<Coordinates> = Vec::new();
    for coord in hull.exterior().coords() {
        let c = Coordinates::new(coord.y, coord.x);
        if !distinct.iter().any(|d| d.same_position(&c)) {
            distinct.push(c);
        }
    }

    if distinct.len() < MIN_HULL_VERTICES || hull.unsigned_area() < MIN_HULL_AREA {
        return Err(Error::Hull(format!(
            "Degenerate hull: {} distinct vertices, area {:e}",
            distinct.len(),
            hull.unsigned_area()
        )));
    }

    let ring = hull.exterior().coords().map(|c| [c.x, c.y]).collect();
    Ok(HullPolygon::from_ring(ring))
}

/// Compute the hull of a complete zone (exactly [`ZONE_SIZE`] markers)
pub fn zone_hull(points: &[Coordinates]) -> Result<HullPolygon> {
    if points.len() != ZONE_SIZE {
        return Err(Error::Validation(format!(
            "A zone needs exactly {} markers, got {}",
            ZONE_SIZE,
            points.len()
        )));
    }
    convex_hull(points)
}
