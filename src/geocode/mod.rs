//! Geocoding
//!
//! Forward (text to coordinates) and reverse (coordinates to place name)
//! lookups through the backend's geocoding proxy. Lookups are single
//! attempts; callers that only need a label go through [`enrich`], which never
//! fails.

pub mod gateway;

use crate::constants::geocode::UNKNOWN_LOCATION;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::zone::ContextEntry;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::warn;

/// A geocoded feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeFeature {
    pub coordinates: Coordinates,
    pub place_name: String,
    #[serde(default)]
    pub context: Vec<ContextEntry>,
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Search for a free-text query, best match first
    fn forward_geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<GeocodeFeature>>> + Send;

    /// Place name and context for a coordinate
    fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> impl Future<Output = Result<Option<GeocodeFeature>>> + Send;
}

/// Place name and context attached to a marker
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub place_name: String,
    pub context: Vec<ContextEntry>,
}

impl Enrichment {
    /// Placeholder used when a lookup fails or finds nothing
    pub fn unknown() -> Self {
        Self {
            place_name: UNKNOWN_LOCATION.to_string(),
            context: Vec::new(),
        }
    }
}

impl From<GeocodeFeature> for Enrichment {
    fn from(feature: GeocodeFeature) -> Self {
        Self {
            place_name: feature.place_name,
            context: feature.context,
        }
    }
}

/// Reverse geocode a coordinate, degrading to "Unknown location"
pub async fn enrich<G: GeoBackend>(geocoder: &G, coords: Coordinates) -> Enrichment {
    match geocoder.reverse_geocode(coords).await {
        Ok(Some(feature)) if !feature.place_name.is_empty() => feature.into(),
        Ok(_) => {
            warn!(%coords, "reverse geocode returned no features");
            Enrichment::unknown()
        }
        Err(e) => {
            warn!(%coords, error = %e, "reverse geocode failed");
            Enrichment::unknown()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory geocoder for tests

    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Geocoder that answers from a fixed behaviour and counts calls
    #[derive(Debug, Default)]
    pub struct StubGeocoder {
        pub mode: StubMode,
        pub calls: AtomicUsize,
        pub last_limit: AtomicUsize,
    }

    #[derive(Debug, Default, Clone, Copy)]
    pub enum StubMode {
        /// Name every point after its coordinates
        #[default]
        Named,
        /// Return zero features
        Empty,
        /// Fail every request
        Failing,
    }

    impl StubGeocoder {
        pub fn new(mode: StubMode) -> Self {
            Self {
                mode,
                calls: AtomicUsize::new(0),
                last_limit: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Limit passed to the most recent forward lookup
        pub fn last_limit(&self) -> usize {
            self.last_limit.load(Ordering::SeqCst)
        }
    }

    impl GeoBackend for StubGeocoder {
        async fn forward_geocode(&self, query: &str, limit: usize) -> Result<Vec<GeocodeFeature>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_limit.store(limit, Ordering::SeqCst);
            match self.mode {
                StubMode::Named => Ok(vec![GeocodeFeature {
                    coordinates: Coordinates::new(1.0, 2.0),
                    place_name: query.to_string(),
                    context: Vec::new(),
                }]
                .into_iter()
                .take(limit)
                .collect()),
                StubMode::Empty => Ok(Vec::new()),
                StubMode::Failing => Err(Error::Geocoding("stub failure".to_string())),
            }
        }

        async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<GeocodeFeature>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                StubMode::Named => Ok(Some(GeocodeFeature {
                    coordinates: coords,
                    place_name: format!("Place {:.3},{:.3}", coords.lat, coords.lng),
                    context: vec![ContextEntry {
                        id: "place.1".to_string(),
                        text: "Testville".to_string(),
                    }],
                })),
                StubMode::Empty => Ok(None),
                StubMode::Failing => Err(Error::Geocoding("stub failure".to_string())),
            }
        }
    }
}
