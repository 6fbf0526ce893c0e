//! Zone finalization
//!
//! Turns the ten most recent pending markers of a zone type into a persisted
//! zone:
//! 1. reverse geocode all ten markers concurrently and wait for every lookup
//! 2. compute the convex hull of the ten points
//! 3. submit the markers to the backend and receive the zone id
//! 4. tag the hull with the zone, cache it as an overlay, mark it completed
//! 5. reset the pending list
//!
//! Nothing is mutated until the backend has accepted the zone, so a failure at
//! any step leaves the pending markers exactly as they were.

use crate::api::ZoneBackend;
use crate::constants::zone::ZONE_SIZE;
use crate::coord::hull::zone_hull;
use crate::coord::{Coordinates, ZoneType};
use crate::error::{Error, Result};
use crate::geocode::{enrich, GeoBackend};
use crate::zone::accumulator::MarkerAccumulator;
use crate::zone::overlay::OverlayStore;
use crate::zone::{Marker, Zone};
use futures::future::join_all;
use tracing::{error, info};

/// Finalizes pending markers into zones
#[derive(Debug)]
pub struct ZoneFinalizer<'a, G, B> {
    geocoder: &'a G,
    backend: &'a B,
}

impl<'a, G: GeoBackend, B: ZoneBackend> ZoneFinalizer<'a, G, B> {
    pub fn new(geocoder: &'a G, backend: &'a B) -> Self {
        Self { geocoder, backend }
    }

    /// Finalize the latest ten pending markers of `zone_type`
    pub async fn finalize(
        &self,
        zone_type: ZoneType,
        accumulator: &mut MarkerAccumulator,
        overlays: &mut OverlayStore,
    ) -> Result<Zone> {
        let batch = accumulator
            .latest_batch(zone_type)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "A {} zone needs {} markers, {} pending",
                    zone_type,
                    ZONE_SIZE,
                    accumulator.len(zone_type)
                ))
            })?
            .to_vec();

        let markers = self.enrich_all(batch).await;

        let positions: Vec<Coordinates> = markers.iter().map(|m| m.position).collect();
        let hull = zone_hull(&positions).inspect_err(|e| {
            error!(%zone_type, error = %e, "cannot build zone hull");
        })?;

        let zone_id = self
            .backend
            .create_zone(zone_type, &markers)
            .await
            .inspect_err(|e| {
                error!(%zone_type, error = %e, "zone submission failed");
            })?;

        let zone = Zone {
            hull: hull.with_zone(zone_type, zone_id.clone()),
            id: zone_id,
            zone_type,
            markers,
        };
        overlays.insert(zone.clone());
        accumulator.reset(zone_type);

        info!(%zone_type, zone_id = %zone.id, "zone finalized");
        Ok(zone)
    }

    /// Attach place names to every marker; all lookups run concurrently
    async fn enrich_all(&self, batch: Vec<Marker>) -> Vec<Marker> {
        let lookups = batch.iter().map(|m| enrich(self.geocoder, m.position));
        let enrichments = join_all(lookups).await;

        batch
            .into_iter()
            .zip(enrichments)
            .map(|(mut marker, enrichment)| {
                marker.place_name = Some(enrichment.place_name);
                marker.context = enrichment.context;
                marker
            })
            .collect()
    }
}
