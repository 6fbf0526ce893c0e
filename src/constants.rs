//! Centralized constants for the safezone crate
//!
//! Values shared between the zone pipeline, the API client and the CLI.

/// Zone assembly constants
pub mod zone {
    /// Number of markers that make up one zone
    pub const ZONE_SIZE: usize = 10;

    /// Minimum distinct hull vertices for a usable polygon
    pub const MIN_HULL_VERTICES: usize = 3;

    /// Hull area (square degrees) below which the hull is treated as degenerate
    pub const MIN_HULL_AREA: f64 = 1e-12;
}

/// Geocoding constants
pub mod geocode {
    /// Place name used whenever a lookup fails or comes back empty
    pub const UNKNOWN_LOCATION: &str = "Unknown location";

    /// Default number of forward-geocoding results requested
    pub const DEFAULT_FORWARD_LIMIT: usize = 5;
}

/// Backend REST paths
pub mod api {
    /// Forward geocoding proxy
    pub const FORWARD_GEOCODE_PATH: &str = "/mapbox/forward";

    /// Reverse geocoding proxy
    pub const REVERSE_GEOCODE_PATH: &str = "/mapbox/reverse-geocode";

    /// Prefix for the bearer authorization header
    pub const BEARER_PREFIX: &str = "Bearer";
}

/// Map interaction constants
pub mod map {
    /// Delay before a hover triggers a reverse lookup, in milliseconds
    pub const HOVER_DELAY_MS: u64 = 2000;

    /// Route endpoints collected before itinerary calculation
    pub const ROUTE_POINTS: usize = 2;

    /// Capacity of the state-change notification channel
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
}
