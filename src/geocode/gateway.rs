//! Backend geocoding proxy
//!
//! The backend forwards `/mapbox/forward` and `/mapbox/reverse-geocode` to a
//! hosted geocoder and returns its feature list unchanged.

use crate::api::types::{FeatureDto, GeocodeResponse};
use crate::api::ApiClient;
use crate::constants::api::{FORWARD_GEOCODE_PATH, REVERSE_GEOCODE_PATH};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geocode::{GeoBackend, GeocodeFeature};

/// Geocoder backed by the SafeZone API
#[derive(Debug, Clone)]
pub struct GatewayGeocoder {
    client: ApiClient,
}

impl GatewayGeocoder {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn forward_path(query: &str, limit: usize) -> String {
        format!(
            "{}?q={}&limit={}",
            FORWARD_GEOCODE_PATH,
            urlencoding::encode(query),
            limit
        )
    }

    fn reverse_path(coords: Coordinates) -> String {
        format!(
            "{}?longitude={}&latitude={}",
            REVERSE_GEOCODE_PATH, coords.lng, coords.lat
        )
    }

    /// Convert a proxy feature; the query point stands in when geometry is absent
    fn to_feature(dto: FeatureDto, fallback: Option<Coordinates>) -> Option<GeocodeFeature> {
        let coordinates = dto
            .geometry
            .map(|g| Coordinates::from_lng_lat(g.coordinates))
            .or(fallback)?;
        Some(GeocodeFeature {
            coordinates,
            place_name: dto.place_name.unwrap_or_default(),
            context: dto.context,
        })
    }
}

impl GeoBackend for GatewayGeocoder {
    async fn forward_geocode(&self, query: &str, limit: usize) -> Result<Vec<GeocodeFeature>> {
        if query.trim().is_empty() {
            return Err(Error::Validation("Search query is empty".to_string()));
        }

        let response: GeocodeResponse = self
            .client
            .get(&Self::forward_path(query, limit))
            .await
            .map_err(|e| Error::Geocoding(format!("Forward geocode failed: {}", e)))?;

        Ok(response
            .features
            .into_iter()
            .filter_map(|f| Self::to_feature(f, None))
            .take(limit)
            .collect())
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<GeocodeFeature>> {
        let response: GeocodeResponse = self
            .client
            .get(&Self::reverse_path(coords))
            .await
            .map_err(|e| Error::Geocoding(format!("Reverse geocode failed: {}", e)))?;

        Ok(response
            .features
            .into_iter()
            .next()
            .and_then(|f| Self::to_feature(f, Some(coords))))
    }
}
