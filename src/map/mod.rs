//! Map interaction controller
//!
//! Translates operator interaction (clicks, context clicks, mode buttons) into
//! accumulator, finalizer and overlay operations. The controller owns all
//! client-side zone state; renderers observe it through [`MapEvent`]s from
//! [`MapController::subscribe`].

pub mod hover;

use crate::api::ZoneBackend;
use crate::constants::geocode::DEFAULT_FORWARD_LIMIT;
use crate::constants::zone::ZONE_SIZE;
use crate::constants::map::{EVENT_CHANNEL_CAPACITY, ROUTE_POINTS};
use crate::coord::{Coordinates, ZoneType};
use crate::error::{Error, Result};
use crate::geocode::{enrich, GeoBackend};
use crate::zone::accumulator::{AppendOutcome, CompletedLookup, MarkerAccumulator};
use crate::zone::finalizer::ZoneFinalizer;
use crate::zone::overlay::{LoadSummary, OverlayStore};
use crate::zone::{Marker, Zone};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Active map action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Idle,
    AddingSafe,
    AddingDangerous,
    DrawingRoute,
}

impl InteractionMode {
    /// Zone type being drawn in this mode
    pub fn zone_type(&self) -> Option<ZoneType> {
        match self {
            InteractionMode::AddingSafe => Some(ZoneType::Safe),
            InteractionMode::AddingDangerous => Some(ZoneType::Dangerous),
            _ => None,
        }
    }
}

impl From<ZoneType> for InteractionMode {
    fn from(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Safe => InteractionMode::AddingSafe,
            ZoneType::Dangerous => InteractionMode::AddingDangerous,
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Idle => write!(f, "idle"),
            InteractionMode::AddingSafe => write!(f, "safe"),
            InteractionMode::AddingDangerous => write!(f, "dangerous"),
            InteractionMode::DrawingRoute => write!(f, "route"),
        }
    }
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(InteractionMode::Idle),
            "route" => Ok(InteractionMode::DrawingRoute),
            other => ZoneType::from_str(other)
                .map(InteractionMode::from)
                .map_err(|_| format!("Unknown mode: {}. Valid modes: idle, safe, dangerous, route", s)),
        }
    }
}

/// Why a click did not add a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidCoordinates,
    Duplicate,
    InCompletedZone,
    MissingDescription,
    ZoneFull,
    RouteFull,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectReason::InvalidCoordinates => "coordinates out of range",
            RejectReason::Duplicate => "a marker already exists at this position",
            RejectReason::InCompletedZone => "this position belongs to a completed zone",
            RejectReason::MissingDescription => "danger markers need a description",
            RejectReason::ZoneFull => "ten markers already pending; finalize or undo first",
            RejectReason::RouteFull => "route already has both endpoints",
        };
        write!(f, "{}", msg)
    }
}

/// Result of a map click
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// No active action; click ignored
    Ignored,
    Rejected(RejectReason),
    /// Marker is pending; `persisted` is false if the single-marker save failed
    Added {
        zone_type: ZoneType,
        pending: usize,
        persisted: bool,
    },
    /// The click completed a zone
    Finalized(Zone),
    /// The click completed ten markers but finalization failed; they stay pending
    FinalizationFailed { zone_type: ZoneType, error: String },
    RoutePoint { count: usize },
}

/// Transient marker placed by a context click or a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMarker {
    pub id: Uuid,
    pub position: Coordinates,
    pub place_name: String,
}

/// State-change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    ModeChanged(InteractionMode),
    MarkerAdded { zone_type: ZoneType, index: usize, position: Coordinates },
    MarkerRemoved { zone_type: ZoneType, index: usize },
    MarkerRejected { position: Coordinates, reason: RejectReason },
    MarkerPersistFailed { zone_type: ZoneType, error: String },
    ZoneFinalized { zone_type: ZoneType, zone_id: String },
    FinalizationFailed { zone_type: ZoneType, error: String },
    ZoneDeleted { zone_id: String },
    ZoneUpdated { zone_id: String },
    OverlaysReloaded(LoadSummary),
    RoutePointAdded { index: usize, position: Coordinates },
    RouteCleared,
    SearchMarkerPlaced(SearchMarker),
}

/// Owns the zone-drawing state of one map session
pub struct MapController<G, B> {
    geocoder: G,
    backend: B,
    mode: InteractionMode,
    accumulator: MarkerAccumulator,
    overlays: OverlayStore,
    route: Vec<Coordinates>,
    search_marker: Option<SearchMarker>,
    forward_limit: usize,
    events: broadcast::Sender<MapEvent>,
}

impl<G: GeoBackend, B: ZoneBackend> MapController<G, B> {
    pub fn new(geocoder: G, backend: B) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            geocoder,
            backend,
            mode: InteractionMode::Idle,
            accumulator: MarkerAccumulator::new(),
            overlays: OverlayStore::new(),
            route: Vec::new(),
            search_marker: None,
            forward_limit: DEFAULT_FORWARD_LIMIT,
            events,
        }
    }

    /// Number of candidates requested when searching
    pub fn with_forward_limit(mut self, limit: usize) -> Self {
        self.forward_limit = limit.max(1);
        self
    }

    /// Receive state-change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: MapEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn accumulator(&self) -> &MarkerAccumulator {
        &self.accumulator
    }

    pub fn overlays(&self) -> &OverlayStore {
        &self.overlays
    }

    pub fn route(&self) -> &[Coordinates] {
        &self.route
    }

    pub fn search_marker(&self) -> Option<&SearchMarker> {
        self.search_marker.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Switch the active action
    ///
    /// Entering route mode starts a fresh route.
    pub fn select_mode(&mut self, mode: InteractionMode) {
        if mode == InteractionMode::DrawingRoute && self.mode != InteractionMode::DrawingRoute {
            self.route.clear();
        }
        self.mode = mode;
        debug!(%mode, "mode selected");
        self.emit(MapEvent::ModeChanged(mode));
    }

    /// Handle a map click in the current mode
    ///
    /// `description` is the operator's answer to the description prompt; danger
    /// markers without one are not added.
    pub async fn click(&mut self, coords: Coordinates, description: Option<String>) -> ClickOutcome {
        match self.mode {
            InteractionMode::Idle => ClickOutcome::Ignored,
            InteractionMode::DrawingRoute => self.add_route_point(coords),
            InteractionMode::AddingSafe => self.add_marker(ZoneType::Safe, coords, description).await,
            InteractionMode::AddingDangerous => {
                self.add_marker(ZoneType::Dangerous, coords, description).await
            }
        }
    }

    fn reject(&self, position: Coordinates, reason: RejectReason) -> ClickOutcome {
        debug!(%position, %reason, "click rejected");
        self.emit(MapEvent::MarkerRejected { position, reason });
        ClickOutcome::Rejected(reason)
    }

    async fn add_marker(
        &mut self,
        zone_type: ZoneType,
        coords: Coordinates,
        description: Option<String>,
    ) -> ClickOutcome {
        if coords.validate().is_err() {
            return self.reject(coords, RejectReason::InvalidCoordinates);
        }
        if self.accumulator.len(zone_type) >= ZONE_SIZE {
            return self.reject(coords, RejectReason::ZoneFull);
        }

        if self.accumulator.contains(zone_type, &coords) {
            return self.reject(coords, RejectReason::Duplicate);
        }
        if self.overlays.contains_coordinate(&coords) {
            return self.reject(coords, RejectReason::InCompletedZone);
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if zone_type.requires_description() && description.is_none() {
            return self.reject(coords, RejectReason::MissingDescription);
        }

        let mut marker = Marker::new(coords);
        if let Some(description) = description {
            marker = marker.with_description(description);
        }

        let len = match self.accumulator.append(zone_type, marker, &self.overlays) {
            AppendOutcome::Added { len } => len,
            AppendOutcome::Duplicate => return self.reject(coords, RejectReason::Duplicate),
            AppendOutcome::InCompletedZone => {
                return self.reject(coords, RejectReason::InCompletedZone)
            }
        };
        let index = len - 1;
        self.emit(MapEvent::MarkerAdded {
            zone_type,
            index,
            position: coords,
        });

        let persisted = self.persist_pending(zone_type, index).await;

        if !self.accumulator.is_ready(zone_type) {
            return ClickOutcome::Added {
                zone_type,
                pending: len,
                persisted,
            };
        }

        match self.finalize_pending(zone_type).await {
            Ok(zone) => ClickOutcome::Finalized(zone),
            Err(e) => ClickOutcome::FinalizationFailed {
                zone_type,
                error: e.to_string(),
            },
        }
    }

    /// Save one pending marker; failures are reported, the marker stays pending
    async fn persist_pending(&mut self, zone_type: ZoneType, index: usize) -> bool {
        let Some(marker) = self.accumulator.pending(zone_type).get(index).cloned() else {
            return false;
        };

        match self.backend.add_marker(zone_type, &marker).await {
            Ok(server_id) => {
                if let Some(pending) = self.accumulator.pending_mut(zone_type, index) {
                    pending.server_id = server_id;
                }
                true
            }
            Err(e) => {
                warn!(%zone_type, error = %e, "could not save marker");
                self.emit(MapEvent::MarkerPersistFailed {
                    zone_type,
                    error: e.to_string(),
                });
                false
            }
        }
    }

    /// Run the zone finalizer for a zone type
    ///
    /// Called automatically when a click completes ten markers; also the manual
    /// retry after a failed finalization.
    pub async fn finalize_pending(&mut self, zone_type: ZoneType) -> Result<Zone> {
        let finalizer = ZoneFinalizer::new(&self.geocoder, &self.backend);
        match finalizer
            .finalize(zone_type, &mut self.accumulator, &mut self.overlays)
            .await
        {
            Ok(zone) => {
                self.emit(MapEvent::ZoneFinalized {
                    zone_type,
                    zone_id: zone.id.clone(),
                });
                Ok(zone)
            }
            Err(e) => {
                self.emit(MapEvent::FinalizationFailed {
                    zone_type,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Remove a pending marker, deleting its backend copy if it has one
    pub async fn remove_pending(&mut self, zone_type: ZoneType, index: usize) -> Option<Marker> {
        let marker = self.accumulator.remove_at(zone_type, index)?;
        if let Some(server_id) = &marker.server_id {
            if let Err(e) = self.backend.delete_marker(zone_type, server_id).await {
                warn!(%zone_type, marker_id = %server_id, error = %e, "could not delete marker");
            }
        }
        self.emit(MapEvent::MarkerRemoved { zone_type, index });
        Some(marker)
    }

    /// Drop all pending markers of a zone type without touching the backend
    pub fn cancel_pending(&mut self, zone_type: ZoneType) {
        let count = self.accumulator.len(zone_type);
        self.accumulator.reset(zone_type);
        for index in (0..count).rev() {
            self.emit(MapEvent::MarkerRemoved { zone_type, index });
        }
    }

    fn add_route_point(&mut self, coords: Coordinates) -> ClickOutcome {
        if coords.validate().is_err() {
            return self.reject(coords, RejectReason::InvalidCoordinates);
        }
        if self.route.len() >= ROUTE_POINTS {
            return self.reject(coords, RejectReason::RouteFull);
        }
        self.route.push(coords);
        self.emit(MapEvent::RoutePointAdded {
            index: self.route.len() - 1,
            position: coords,
        });
        ClickOutcome::RoutePoint {
            count: self.route.len(),
        }
    }

    pub fn clear_route(&mut self) {
        self.route.clear();
        self.emit(MapEvent::RouteCleared);
    }

    /// Place the transient search marker at a context-clicked position
    pub async fn context_click(&mut self, coords: Coordinates) -> Result<SearchMarker> {
        coords.validate()?;
        let enrichment = enrich(&self.geocoder, coords).await;
        Ok(self.place_search_marker(coords, enrichment.place_name))
    }

    /// Forward geocode a query and place the search marker on the best match
    pub async fn search(&mut self, query: &str) -> Result<Option<SearchMarker>> {
        let features = self
            .geocoder
            .forward_geocode(query, self.forward_limit)
            .await?;
        Ok(features
            .into_iter()
            .next()
            .map(|f| self.place_search_marker(f.coordinates, f.place_name)))
    }

    fn place_search_marker(&mut self, position: Coordinates, place_name: String) -> SearchMarker {
        let marker = SearchMarker {
            id: Uuid::new_v4(),
            position,
            place_name,
        };
        self.search_marker = Some(marker.clone());
        self.emit(MapEvent::SearchMarkerPlaced(marker.clone()));
        marker
    }

    /// Rebuild overlays and completed zones from the backend
    pub async fn reload(&mut self) -> Result<LoadSummary> {
        let summary = self.overlays.load(&self.backend).await?;
        self.emit(MapEvent::OverlaysReloaded(summary));
        Ok(summary)
    }

    /// Delete a completed zone and its markers on the backend
    ///
    /// Markers are deleted first; if any deletion fails the zone is left in
    /// place locally.
    pub async fn delete_zone(&mut self, zone_id: &str) -> Result<()> {
        let zone_type = self
            .overlays
            .zone_type(zone_id)
            .ok_or_else(|| Error::NotFound(format!("zone {}", zone_id)))?;
        let marker_ids: Vec<String> = self
            .overlays
            .markers(zone_id)
            .unwrap_or_default()
            .iter()
            .filter_map(|m| m.server_id.clone())
            .collect();

        for marker_id in &marker_ids {
            self.backend.delete_marker(zone_type, marker_id).await?;
        }
        self.backend.delete_zone(zone_type, zone_id).await?;

        self.overlays.invalidate_zone(zone_id);
        info!(%zone_type, %zone_id, markers = marker_ids.len(), "zone deleted");
        self.emit(MapEvent::ZoneDeleted {
            zone_id: zone_id.to_string(),
        });
        Ok(())
    }

    /// Re-run place lookups for a completed zone and push the result
    ///
    /// Positions are unchanged; only place names and context are refreshed,
    /// e.g. for markers saved as "Unknown location" while the geocoder was down.
    pub async fn refresh_zone_places(&mut self, zone_id: &str) -> Result<Zone> {
        let zone_type = self
            .overlays
            .zone_type(zone_id)
            .ok_or_else(|| Error::NotFound(format!("zone {}", zone_id)))?;
        let hull = self
            .overlays
            .overlays()
            .iter()
            .find(|o| o.zone_id == zone_id)
            .map(|o| o.polygon.clone())
            .ok_or_else(|| Error::NotFound(format!("overlay for zone {}", zone_id)))?;
        let markers = self.overlays.markers(zone_id).unwrap_or_default().to_vec();

        let lookups = markers.iter().map(|m| enrich(&self.geocoder, m.position));
        let enrichments = futures::future::join_all(lookups).await;
        let markers: Vec<Marker> = markers
            .into_iter()
            .zip(enrichments)
            .map(|(mut marker, enrichment)| {
                marker.place_name = Some(enrichment.place_name);
                marker.context = enrichment.context;
                marker
            })
            .collect();

        self.backend.update_zone(zone_type, zone_id, &markers).await?;

        let zone = Zone {
            id: zone_id.to_string(),
            zone_type,
            markers,
            hull,
        };
        self.overlays.insert(zone.clone());
        self.emit(MapEvent::ZoneUpdated {
            zone_id: zone_id.to_string(),
        });
        Ok(zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MemoryBackend;
    use crate::geocode::testing::{StubGeocoder, StubMode};
    use crate::zone::testing::square_markers;

    fn controller() -> MapController<StubGeocoder, MemoryBackend> {
        MapController::new(StubGeocoder::new(StubMode::Named), MemoryBackend::new())
    }

    fn positions() -> Vec<Coordinates> {
        square_markers(0.0).into_iter().map(|m| m.position).collect()
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("safe".parse::<InteractionMode>().unwrap(), InteractionMode::AddingSafe);
        assert_eq!("danger".parse::<InteractionMode>().unwrap(), InteractionMode::AddingDangerous);
        assert_eq!("route".parse::<InteractionMode>().unwrap(), InteractionMode::DrawingRoute);
        assert!("fly".parse::<InteractionMode>().is_err());
    }

    #[tokio::test]
    async fn test_idle_click_ignored() {
        let mut map = controller();
        let outcome = map.click(Coordinates::new(1.0, 1.0), None).await;
        assert!(matches!(outcome, ClickOutcome::Ignored));
        assert_eq!(map.backend().added_markers(), 0);
    }

    #[tokio::test]
    async fn test_ten_dangerous_clicks_create_one_zone() {
        let mut map = controller();
        let mut events = map.subscribe();
        map.select_mode(InteractionMode::AddingDangerous);

        let points = positions();
        for (i, p) in points.iter().enumerate() {
            let outcome = map.click(*p, Some(format!("hazard {}", i))).await;
            if i < 9 {
                assert!(matches!(outcome, ClickOutcome::Added { pending, persisted: true, .. } if pending == i + 1));
            } else {
                let zone = match outcome {
                    ClickOutcome::Finalized(zone) => zone,
                    other => panic!("expected finalization, got {:?}", other),
                };
                assert_eq!(zone.markers.len(), 10);
                assert_eq!(zone.zone_type, ZoneType::Dangerous);
            }
        }

        let calls = map.backend().create_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.len(), 10);
        assert!(calls[0].1.iter().all(|m| m.server_id.is_some()));
        assert_eq!(map.backend().added_markers(), 10);
        assert_eq!(map.accumulator().len(ZoneType::Dangerous), 0);
        assert_eq!(map.overlays().overlays().len(), 1);

        let mut finalized = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, MapEvent::ZoneFinalized { .. }) {
                finalized += 1;
            }
        }
        assert_eq!(finalized, 1);
    }

    #[tokio::test]
    async fn test_dangerous_click_without_description_aborts() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingDangerous);

        let outcome = map.click(Coordinates::new(1.0, 1.0), None).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::MissingDescription)));

        let outcome = map.click(Coordinates::new(1.0, 1.0), Some("   ".to_string())).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::MissingDescription)));
        assert_eq!(map.accumulator().len(ZoneType::Dangerous), 0);
        assert_eq!(map.backend().added_markers(), 0);
    }

    #[tokio::test]
    async fn test_safe_click_needs_no_description() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingSafe);
        let outcome = map.click(Coordinates::new(1.0, 1.0), None).await;
        assert!(matches!(outcome, ClickOutcome::Added { zone_type: ZoneType::Safe, pending: 1, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_and_completed_clicks_rejected() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingSafe);
        for p in positions() {
            map.click(p, None).await;
        }
        assert_eq!(map.overlays().overlays().len(), 1);

        // A finalized position cannot seed a new zone of either type
        let outcome = map.click(positions()[0], None).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::InCompletedZone)));
        map.select_mode(InteractionMode::AddingDangerous);
        let outcome = map.click(positions()[0], None).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::InCompletedZone)));

        map.select_mode(InteractionMode::AddingSafe);
        map.click(Coordinates::new(30.0, 30.0), None).await;
        let outcome = map.click(Coordinates::new(30.0, 30.0), None).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::Duplicate)));
        assert_eq!(map.accumulator().len(ZoneType::Safe), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_marker_pending() {
        let mut map = controller();
        map.backend().fail_add_marker(true);
        map.select_mode(InteractionMode::AddingSafe);

        let outcome = map.click(Coordinates::new(1.0, 1.0), None).await;
        assert!(matches!(outcome, ClickOutcome::Added { persisted: false, pending: 1, .. }));
        assert!(map.accumulator().pending(ZoneType::Safe)[0].server_id.is_none());
    }

    #[tokio::test]
    async fn test_failed_finalization_can_be_retried() {
        let mut map = controller();
        map.backend().fail_create(true);
        map.select_mode(InteractionMode::AddingSafe);

        let mut last = None;
        for p in positions() {
            last = Some(map.click(p, None).await);
        }
        assert!(matches!(last, Some(ClickOutcome::FinalizationFailed { .. })));
        assert_eq!(map.accumulator().len(ZoneType::Safe), 10);

        map.backend().fail_create(false);
        let zone = map.finalize_pending(ZoneType::Safe).await.unwrap();
        assert_eq!(zone.markers.len(), 10);
        assert_eq!(map.accumulator().len(ZoneType::Safe), 0);
    }

    #[tokio::test]
    async fn test_full_pending_list_rejects_clicks_until_finalized() {
        let mut map = controller();
        map.backend().fail_create(true);
        map.select_mode(InteractionMode::AddingSafe);
        for p in positions() {
            map.click(p, None).await;
        }
        assert_eq!(map.accumulator().len(ZoneType::Safe), 10);

        let outcome = map.click(Coordinates::new(0.3, 0.3), None).await;
        assert!(matches!(outcome, ClickOutcome::Rejected(RejectReason::ZoneFull)));
        assert_eq!(map.accumulator().len(ZoneType::Safe), 10);
        assert_eq!(map.backend().added_markers(), 10);

        // The other zone type is unaffected
        map.select_mode(InteractionMode::AddingDangerous);
        let outcome = map.click(Coordinates::new(0.3, 0.3), Some("glass".to_string())).await;
        assert!(matches!(outcome, ClickOutcome::Added { pending: 1, .. }));

        map.backend().fail_create(false);
        let zone = map.finalize_pending(ZoneType::Safe).await.unwrap();
        let submitted = zone.positions();
        for p in positions() {
            assert!(submitted.iter().any(|s| s.same_position(&p)));
        }
        assert_eq!(map.accumulator().len(ZoneType::Safe), 0);
    }

    #[tokio::test]
    async fn test_remove_pending_deletes_backend_copy() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingSafe);
        map.click(Coordinates::new(1.0, 1.0), None).await;
        map.click(Coordinates::new(2.0, 2.0), None).await;

        let removed = map.remove_pending(ZoneType::Safe, 0).await.unwrap();
        assert_eq!(removed.position, Coordinates::new(1.0, 1.0));
        assert_eq!(map.backend().deleted_markers(), vec!["marker-1".to_string()]);
        assert_eq!(map.accumulator().len(ZoneType::Safe), 1);
        assert!(map.remove_pending(ZoneType::Safe, 3).await.is_none());
    }

    #[tokio::test]
    async fn test_route_takes_two_points() {
        let mut map = controller();
        map.select_mode(InteractionMode::DrawingRoute);

        assert!(matches!(map.click(Coordinates::new(1.0, 1.0), None).await, ClickOutcome::RoutePoint { count: 1 }));
        assert!(matches!(map.click(Coordinates::new(2.0, 2.0), None).await, ClickOutcome::RoutePoint { count: 2 }));
        assert!(matches!(
            map.click(Coordinates::new(3.0, 3.0), None).await,
            ClickOutcome::Rejected(RejectReason::RouteFull)
        ));
        assert_eq!(map.route().len(), 2);
        assert_eq!(map.mode(), InteractionMode::DrawingRoute);

        map.clear_route();
        assert!(map.route().is_empty());
    }

    #[tokio::test]
    async fn test_context_click_is_independent_of_accumulation() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingSafe);

        let marker = map.context_click(Coordinates::new(4.0, 5.0)).await.unwrap();
        assert_eq!(marker.place_name, "Place 4.000,5.000");
        assert_eq!(map.search_marker(), Some(&marker));
        assert_eq!(map.accumulator().len(ZoneType::Safe), 0);

        let found = map.search("Harbor").await.unwrap().unwrap();
        assert_eq!(found.place_name, "Harbor");
        assert_ne!(found.id, marker.id);
    }

    #[tokio::test]
    async fn test_delete_zone_cascades_and_invalidates() {
        let mut map = controller();
        map.select_mode(InteractionMode::AddingSafe);
        let mut zone_id = String::new();
        for p in positions() {
            if let ClickOutcome::Finalized(zone) = map.click(p, None).await {
                zone_id = zone.id;
            }
        }
        assert!(map.overlays().is_completed(&zone_id));

        map.delete_zone(&zone_id).await.unwrap();
        assert!(!map.overlays().is_completed(&zone_id));
        assert!(map.overlays().overlays().is_empty());
        assert_eq!(map.backend().deleted_markers().len(), 10);
        assert_eq!(map.backend().zone_count(ZoneType::Safe), 0);

        // Positions are free again
        let outcome = map.click(positions()[0], None).await;
        assert!(matches!(outcome, ClickOutcome::Added { .. }));

        assert!(matches!(map.delete_zone("missing").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reload_picks_up_remote_zones() {
        let mut map = controller();
        map.backend().seed_zone(ZoneType::Dangerous, "remote", square_markers(5.0));

        let summary = map.reload().await.unwrap();
        assert_eq!(summary.overlays, 1);
        assert!(map.overlays().is_completed("remote"));
    }

    #[tokio::test]
    async fn test_search_uses_configured_limit() {
        let mut map = MapController::new(StubGeocoder::new(StubMode::Named), MemoryBackend::new())
            .with_forward_limit(2);
        map.search("Harbor").await.unwrap();
        assert_eq!(map.geocoder.last_limit(), 2);

        let mut map = controller();
        map.search("Harbor").await.unwrap();
        assert_eq!(map.geocoder.last_limit(), DEFAULT_FORWARD_LIMIT);
    }

    #[tokio::test]
    async fn test_refresh_flat_zone_leaves_backend_untouched() {
        let mut map = controller();
        let line: Vec<Marker> = (0..10)
            .map(|i| Marker::new(Coordinates::new(i as f64 * 0.1, i as f64 * 0.1)))
            .collect();
        map.backend().seed_zone(ZoneType::Safe, "flat", line);
        map.reload().await.unwrap();
        assert!(map.overlays().is_completed("flat"));

        let result = map.refresh_zone_places("flat").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(map.geocoder.calls(), 0);
        let stored = map.backend().zone_markers(ZoneType::Safe, "flat").unwrap();
        assert!(stored.iter().all(|m| m.place_name.is_none()));
    }

    #[tokio::test]
    async fn test_refresh_zone_places() {
        let geocoder = StubGeocoder::new(StubMode::Named);
        let mut map = MapController::new(geocoder, MemoryBackend::new());
        map.backend().seed_zone(ZoneType::Safe, "remote", square_markers(0.0));
        map.reload().await.unwrap();

        let zone = map.refresh_zone_places("remote").await.unwrap();
        assert!(zone.markers.iter().all(|m| m.place_name.as_deref().unwrap().starts_with("Place")));
        assert_eq!(map.overlays().overlays().len(), 1);
    }
}
