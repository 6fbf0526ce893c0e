//! Wire types for the SafeZone backend
//!
//! Everything here speaks `[lng, lat]`. Conversion to and from the in-memory
//! `Coordinates` happens in the `From` impls at the bottom of this file.

use crate::constants::geocode::UNKNOWN_LOCATION;
use crate::coord::Coordinates;
use crate::zone::{ContextEntry, Marker};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geocoding proxy response (`/mapbox/forward`, `/mapbox/reverse-geocode`)
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureDto {
    pub geometry: Option<GeometryDto>,
    pub place_name: Option<String>,
    #[serde(default)]
    pub context: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GeometryDto {
    pub coordinates: [f64; 2],
}

/// Marker body sent to zone and marker endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerPayload {
    pub coordinates: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub place_name: String,
    pub context: Vec<ContextEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of `POST /{safe|danger}zones/add` and `PUT /{safe|danger}zones/:id`
#[derive(Debug, Serialize, Deserialize)]
pub struct ZoneMarkersBody {
    pub markers: Vec<MarkerPayload>,
}

/// Marker as returned inside a zone listing
#[derive(Debug, Deserialize)]
pub struct MarkerDto {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub coordinates: [f64; 2],
    pub description: Option<String>,
    pub place_name: Option<String>,
    #[serde(default)]
    pub context: Vec<ContextEntry>,
    pub timestamp: Option<String>,
}

/// Zone as returned by `GET /{safe|danger}zones`
#[derive(Debug, Deserialize)]
pub struct ZoneDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub markers: Vec<MarkerDto>,
}

/// Zone listings come back either bare or wrapped in `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ZoneListResponse {
    Bare(Vec<ZoneDto>),
    Wrapped { data: Vec<ZoneDto> },
}

impl ZoneListResponse {
    pub fn into_zones(self) -> Vec<ZoneDto> {
        match self {
            ZoneListResponse::Bare(zones) => zones,
            ZoneListResponse::Wrapped { data } => data,
        }
    }
}

/// A zone fetched from the backend, converted to in-memory markers
#[derive(Debug, Clone)]
pub struct RemoteZone {
    pub id: String,
    pub markers: Vec<Marker>,
}

impl From<&Marker> for MarkerPayload {
    fn from(marker: &Marker) -> Self {
        Self {
            coordinates: marker.position.to_lng_lat(),
            description: marker.description.clone(),
            place_name: marker
                .place_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            context: marker.context.clone(),
            timestamp: marker.timestamp.clone(),
        }
    }
}

impl From<MarkerDto> for Marker {
    fn from(dto: MarkerDto) -> Self {
        Self {
            position: Coordinates::from_lng_lat(dto.coordinates),
            description: dto.description,
            place_name: dto.place_name,
            context: dto.context,
            timestamp: dto.timestamp,
            server_id: dto.id,
        }
    }
}

impl From<ZoneDto> for RemoteZone {
    fn from(dto: ZoneDto) -> Self {
        Self {
            id: dto.id,
            markers: dto.markers.into_iter().map(Marker::from).collect(),
        }
    }
}

/// Find the created resource id in a create response
///
/// The backend nests it as `data.zone._id`, `data.marker._id` or `data._id`
/// depending on the endpoint; a top-level `_id` is accepted too.
pub fn extract_id(body: &Value, resource: &str) -> Option<String> {
    let candidates = [
        body.pointer(&format!("/data/{}/_id", resource)),
        body.pointer("/data/_id"),
        body.pointer(&format!("/{}/_id", resource)),
        body.pointer("/_id"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_payload_is_lng_lat() {
        let marker = Marker::new(Coordinates::new(40.0, -74.0)).with_description("alley");
        let payload = MarkerPayload::from(&marker);
        assert_eq!(payload.coordinates, [-74.0, 40.0]);
        assert_eq!(payload.place_name, UNKNOWN_LOCATION);
        assert_eq!(payload.description.as_deref(), Some("alley"));
    }

    #[test]
    fn test_zone_list_shapes() {
        let bare = json!([{ "_id": "z1", "markers": [{ "_id": "m1", "coordinates": [2.0, 1.0] }] }]);
        let zones = serde_json::from_value::<ZoneListResponse>(bare).unwrap().into_zones();
        assert_eq!(zones.len(), 1);

        let remote = RemoteZone::from(zones.into_iter().next().unwrap());
        assert_eq!(remote.markers[0].position, Coordinates::new(1.0, 2.0));
        assert_eq!(remote.markers[0].server_id.as_deref(), Some("m1"));

        let wrapped = json!({ "data": [{ "_id": "z2" }] });
        let zones = serde_json::from_value::<ZoneListResponse>(wrapped).unwrap().into_zones();
        assert_eq!(zones[0].id, "z2");
        assert!(zones[0].markers.is_empty());
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            extract_id(&json!({ "data": { "zone": { "_id": "z9" } } }), "zone").as_deref(),
            Some("z9")
        );
        assert_eq!(
            extract_id(&json!({ "data": { "_id": "m3" } }), "marker").as_deref(),
            Some("m3")
        );
        assert_eq!(extract_id(&json!({ "ok": true }), "zone"), None);
    }

    #[test]
    fn test_geocode_response_tolerates_missing_fields() {
        let body = json!({ "features": [{ "place_name": "Somewhere" }] });
        let parsed: GeocodeResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.features[0].geometry.is_none());
        assert!(parsed.features[0].context.is_empty());

        let empty: GeocodeResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.features.is_empty());
    }
}
