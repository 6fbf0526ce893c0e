//! SafeZone backend client
//!
//! `ApiClient` talks JSON to the backend REST surface. Credentials are never
//! read from ambient storage: every client is built from an explicit
//! [`RequestContext`] carrying the base URL and bearer token.

pub mod types;


use crate::constants::api::BEARER_PREFIX;
use crate::coord::ZoneType;
use crate::error::{Error, Result};
use crate::zone::Marker;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use types::{extract_id, MarkerPayload, RemoteZone, ZoneListResponse, ZoneMarkersBody};

const USER_AGENT: &str = concat!("safezone/", env!("CARGO_PKG_VERSION"));

/// Per-session request context threaded into every API call
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: None,
        }
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Per-request timeout (transport default when unset)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `Authorization` header value, if a token is set
    pub fn auth_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| format!("{} {}", BEARER_PREFIX, t))
    }

    /// Join a path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Zone and marker persistence
///
/// Implemented by [`ApiClient`]; the zone pipeline is generic over it so it can
/// run against any backend.
pub trait ZoneBackend: Send + Sync {
    /// Create a zone from its markers, returning the new zone id
    fn create_zone(
        &self,
        zone_type: ZoneType,
        markers: &[Marker],
    ) -> impl Future<Output = Result<String>> + Send;

    /// All zones of one type
    fn list_zones(&self, zone_type: ZoneType) -> impl Future<Output = Result<Vec<RemoteZone>>> + Send;

    /// Replace a zone's marker list
    fn update_zone(
        &self,
        zone_type: ZoneType,
        zone_id: &str,
        markers: &[Marker],
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_zone(&self, zone_type: ZoneType, zone_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Persist a single marker placed interactively; returns its id when the
    /// backend reports one
    fn add_marker(
        &self,
        zone_type: ZoneType,
        marker: &Marker,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    fn delete_marker(&self, zone_type: ZoneType, marker_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// HTTP client for the SafeZone backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    context: RequestContext,
}

impl ApiClient {
    /// Create a client for the given request context
    pub fn new(context: RequestContext) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = context.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, context })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.context.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// GET a path (query string included) and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.context.url(path);
        debug!(%url, "GET");
        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::handle_response(response).await
    }

    /// POST a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.context.url(path);
        debug!(%url, "POST");
        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// PUT a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.context.url(path);
        debug!(%url, "PUT");
        let response = self
            .authorize(self.client.put(&url).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// DELETE a resource, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.context.url(path);
        debug!(%url, "DELETE");
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
            StatusCode::NOT_FOUND => Error::NotFound(body),
            StatusCode::CONFLICT => Error::Conflict(body),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(body),
            _ => Error::Api {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        // Some endpoints answer 2xx with an empty body
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Reachability check used by `safezone status`
    pub async fn ping(&self) -> Result<StatusCode> {
        let response = self
            .authorize(self.client.get(self.context.url("/")))
            .send()
            .await?;
        Ok(response.status())
    }
}

fn zones_path(zone_type: ZoneType) -> String {
    format!("/{}zones", zone_type.path_prefix())
}

fn markers_path(zone_type: ZoneType) -> String {
    format!("/{}markers", zone_type.path_prefix())
}

impl ZoneBackend for ApiClient {
    async fn create_zone(&self, zone_type: ZoneType, markers: &[Marker]) -> Result<String> {
        let body = ZoneMarkersBody {
            markers: markers.iter().map(MarkerPayload::from).collect(),
        };
        let response: Value = self
            .post(&format!("{}/add", zones_path(zone_type)), &body)
            .await?;

        let id = extract_id(&response, "zone").ok_or_else(|| Error::Api {
            status: 200,
            body: "zone creation response carried no id".to_string(),
        })?;
        info!(%zone_type, zone_id = %id, "zone created");
        Ok(id)
    }

    async fn list_zones(&self, zone_type: ZoneType) -> Result<Vec<RemoteZone>> {
        let response: ZoneListResponse = self.get(&zones_path(zone_type)).await?;
        Ok(response
            .into_zones()
            .into_iter()
            .map(RemoteZone::from)
            .collect())
    }

    async fn update_zone(&self, zone_type: ZoneType, zone_id: &str, markers: &[Marker]) -> Result<()> {
        let body = ZoneMarkersBody {
            markers: markers.iter().map(MarkerPayload::from).collect(),
        };
        let _: Value = self
            .put(
                &format!("{}/{}", zones_path(zone_type), urlencoding::encode(zone_id)),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn delete_zone(&self, zone_type: ZoneType, zone_id: &str) -> Result<()> {
        self.delete(&format!(
            "{}/{}",
            zones_path(zone_type),
            urlencoding::encode(zone_id)
        ))
        .await
    }

    async fn add_marker(&self, zone_type: ZoneType, marker: &Marker) -> Result<Option<String>> {
        let response: Value = self
            .post(
                &format!("{}/add", markers_path(zone_type)),
                &MarkerPayload::from(marker),
            )
            .await?;
        Ok(extract_id(&response, "marker"))
    }

    async fn delete_marker(&self, zone_type: ZoneType, marker_id: &str) -> Result<()> {
        self.delete(&format!(
            "{}/{}",
            markers_path(zone_type),
            urlencoding::encode(marker_id)
        ))
        .await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory backend for tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct State {
        zones: HashMap<ZoneType, Vec<RemoteZone>>,
        create_calls: Vec<(ZoneType, Vec<Marker>)>,
        added_markers: Vec<(ZoneType, Marker)>,
        deleted_markers: Vec<String>,
        next_id: usize,
        fail_create: bool,
        fail_add_marker: bool,
        fail_next_list: bool,
    }

    /// Backend that keeps zones in memory and records every call
    #[derive(Debug, Default)]
    pub struct MemoryBackend {
        state: Mutex<State>,
    }

    impl MemoryBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed_zone(&self, zone_type: ZoneType, id: &str, markers: Vec<Marker>) {
            let mut state = self.state.lock().unwrap();
            state.zones.entry(zone_type).or_default().push(RemoteZone {
                id: id.to_string(),
                markers,
            });
        }

        pub fn fail_create(&self, fail: bool) {
            self.state.lock().unwrap().fail_create = fail;
        }

        pub fn fail_add_marker(&self, fail: bool) {
            self.state.lock().unwrap().fail_add_marker = fail;
        }

        pub fn fail_next_list(&self) {
            self.state.lock().unwrap().fail_next_list = true;
        }

        pub fn create_calls(&self) -> Vec<(ZoneType, Vec<Marker>)> {
            self.state.lock().unwrap().create_calls.clone()
        }

        pub fn added_markers(&self) -> usize {
            self.state.lock().unwrap().added_markers.len()
        }

        pub fn deleted_markers(&self) -> Vec<String> {
            self.state.lock().unwrap().deleted_markers.clone()
        }

        pub fn zone_markers(&self, zone_type: ZoneType, zone_id: &str) -> Option<Vec<Marker>> {
            self.state
                .lock()
                .unwrap()
                .zones
                .get(&zone_type)?
                .iter()
                .find(|z| z.id == zone_id)
                .map(|z| z.markers.clone())
        }

        pub fn zone_count(&self, zone_type: ZoneType) -> usize {
            self.state
                .lock()
                .unwrap()
                .zones
                .get(&zone_type)
                .map_or(0, Vec::len)
        }
    }

    impl ZoneBackend for MemoryBackend {
        async fn create_zone(&self, zone_type: ZoneType, markers: &[Marker]) -> Result<String> {
            let mut state = self.state.lock().unwrap();
            if state.fail_create {
                return Err(Error::Api {
                    status: 500,
                    body: "create failed".to_string(),
                });
            }
            state.next_id += 1;
            let id = format!("zone-{}", state.next_id);
            state.create_calls.push((zone_type, markers.to_vec()));
            state.zones.entry(zone_type).or_default().push(RemoteZone {
                id: id.clone(),
                markers: markers.to_vec(),
            });
            Ok(id)
        }

        async fn list_zones(&self, zone_type: ZoneType) -> Result<Vec<RemoteZone>> {
            let mut state = self.state.lock().unwrap();
            if std::mem::take(&mut state.fail_next_list) {
                return Err(Error::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(state.zones.get(&zone_type).cloned().unwrap_or_default())
        }

        async fn update_zone(&self, zone_type: ZoneType, zone_id: &str, markers: &[Marker]) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let zone = state
                .zones
                .get_mut(&zone_type)
                .and_then(|zones| zones.iter_mut().find(|z| z.id == zone_id))
                .ok_or_else(|| Error::NotFound(zone_id.to_string()))?;
            zone.markers = markers.to_vec();
            Ok(())
        }

        async fn delete_zone(&self, zone_type: ZoneType, zone_id: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let zones = state.zones.entry(zone_type).or_default();
            let before = zones.len();
            zones.retain(|z| z.id != zone_id);
            if zones.len() == before {
                return Err(Error::NotFound(zone_id.to_string()));
            }
            Ok(())
        }

        async fn add_marker(&self, zone_type: ZoneType, marker: &Marker) -> Result<Option<String>> {
            let mut state = self.state.lock().unwrap();
            if state.fail_add_marker {
                return Err(Error::Api {
                    status: 500,
                    body: "marker failed".to_string(),
                });
            }
            state.added_markers.push((zone_type, marker.clone()));
            Ok(Some(format!("marker-{}", state.added_markers.len())))
        }

        async fn delete_marker(&self, _zone_type: ZoneType, marker_id: &str) -> Result<()> {
            self.state
                .lock()
                .unwrap()
                .deleted_markers
                .push(marker_id.to_string());
            Ok(())
        }
    }
}
