//! Overlay store
//!
//! Client-side cache of persisted zones: one hull overlay per zone plus the
//! completed-zones set (zone id to its markers). [`OverlayStore::load`] always
//! rebuilds both from the backend, so calling it after every mutation cannot
//! leave duplicate overlays behind.

use crate::api::ZoneBackend;
use crate::coord::hull::{zone_hull, HullPolygon};
use crate::coord::{Coordinates, ZoneType};
use crate::error::Result;
use crate::zone::accumulator::CompletedLookup;
use crate::zone::{Marker, Zone};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// A rendered zone polygon
#[derive(Debug, Clone, Serialize)]
pub struct Overlay {
    pub zone_id: String,
    pub zone_type: ZoneType,
    pub polygon: HullPolygon,
}

#[derive(Debug, Clone)]
struct CompletedZone {
    zone_type: ZoneType,
    markers: Vec<Marker>,
}

/// Counts reported by [`OverlayStore::load`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub zones: usize,
    pub overlays: usize,
    pub skipped: usize,
}

/// GeoJSON `FeatureCollection` of overlays
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<&'a HullPolygon>,
}

/// Overlays and completed zones
#[derive(Debug, Default, Clone)]
pub struct OverlayStore {
    overlays: Vec<Overlay>,
    completed: HashMap<String, CompletedZone>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state with the zones currently on the backend
    ///
    /// Hulls are recomputed from the stored markers. If any fetch fails the
    /// previous state is kept.
    pub async fn load<B: ZoneBackend>(&mut self, backend: &B) -> Result<LoadSummary> {
        let mut fetched = Vec::new();
        for zone_type in ZoneType::all() {
            let zones = backend.list_zones(zone_type).await?;
            fetched.extend(zones.into_iter().map(|z| (zone_type, z)));
        }

        let mut overlays = Vec::with_capacity(fetched.len());
        let mut completed = HashMap::with_capacity(fetched.len());
        let mut summary = LoadSummary::default();

        for (zone_type, remote) in fetched {
            summary.zones += 1;

            // Zones without exactly ZONE_SIZE markers stay completed but get no overlay
            let positions: Vec<Coordinates> = remote.markers.iter().map(|m| m.position).collect();
            match zone_hull(&positions) {
                Ok(hull) => {
                    overlays.push(Overlay {
                        zone_id: remote.id.clone(),
                        zone_type,
                        polygon: hull.with_zone(zone_type, remote.id.clone()),
                    });
                    summary.overlays += 1;
                }
                Err(e) => {
                    warn!(zone_id = %remote.id, error = %e, "skipping overlay for zone");
                    summary.skipped += 1;
                }
            }

            completed.insert(
                remote.id,
                CompletedZone {
                    zone_type,
                    markers: remote.markers,
                },
            );
        }

        self.overlays = overlays;
        self.completed = completed;
        info!(zones = summary.zones, overlays = summary.overlays, skipped = summary.skipped, "overlays loaded");
        Ok(summary)
    }

    /// Record a freshly finalized zone
    pub fn insert(&mut self, zone: Zone) {
        self.overlays.retain(|o| o.zone_id != zone.id);
        self.overlays.push(Overlay {
            zone_id: zone.id.clone(),
            zone_type: zone.zone_type,
            polygon: zone.hull,
        });
        self.completed.insert(
            zone.id,
            CompletedZone {
                zone_type: zone.zone_type,
                markers: zone.markers,
            },
        );
    }

    /// Drop a zone's overlay and completed membership
    ///
    /// Returns the zone's markers if it was known.
    pub fn invalidate_zone(&mut self, zone_id: &str) -> Option<Vec<Marker>> {
        self.overlays.retain(|o| o.zone_id != zone_id);
        self.completed.remove(zone_id).map(|z| z.markers)
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn is_completed(&self, zone_id: &str) -> bool {
        self.completed.contains_key(zone_id)
    }

    pub fn completed_ids(&self) -> Vec<&str> {
        self.completed.keys().map(String::as_str).collect()
    }

    /// Markers of a completed zone
    pub fn markers(&self, zone_id: &str) -> Option<&[Marker]> {
        self.completed.get(zone_id).map(|z| z.markers.as_slice())
    }

    /// Type of a completed zone
    pub fn zone_type(&self, zone_id: &str) -> Option<ZoneType> {
        self.completed.get(zone_id).map(|z| z.zone_type)
    }

    /// Zones with an overlay, optionally filtered by type
    pub fn zones(&self, filter: Option<ZoneType>) -> Vec<Zone> {
        self.overlays
            .iter()
            .filter(|o| filter.map_or(true, |t| t == o.zone_type))
            .map(|o| Zone {
                id: o.zone_id.clone(),
                zone_type: o.zone_type,
                markers: self
                    .markers(&o.zone_id)
                    .map(|m| m.to_vec())
                    .unwrap_or_default(),
                hull: o.polygon.clone(),
            })
            .collect()
    }

    /// All overlays as a GeoJSON feature collection
    pub fn feature_collection(&self) -> FeatureCollection<'_> {
        FeatureCollection {
            kind: "FeatureCollection",
            features: self.overlays.iter().map(|o| &o.polygon).collect(),
        }
    }
}

impl CompletedLookup for OverlayStore {
    fn contains_coordinate(&self, coords: &Coordinates) -> bool {
        self.completed
            .values()
            .flat_map(|z| z.markers.iter())
            .any(|m| m.position.same_position(coords))
    }
}
