//! safezone: operator client for the SafeZone safety map
//!
//! Operators mark safe and dangerous places on a map. Every ten markers of one
//! type become a zone: the markers are reverse geocoded, enclosed in a convex
//! hull and submitted to the backend, and the hull is drawn as an overlay.
//!
//! ## Modules
//!
//! - [`api`]: backend REST client and wire types
//! - [`geocode`]: forward/reverse geocoding through the backend proxy
//! - [`coord`]: coordinates, zone types and convex hulls
//! - [`zone`]: marker accumulation, finalization and overlays
//! - [`map`]: the interaction controller tying it together
//!
//! ## Quick Start
//!
//! ```rust
//! use safezone::coord::{hull::zone_hull, Coordinates};
//!
//! let points: Vec<Coordinates> = [
//!     (0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.5, 0.5),
//!     (0.2, 0.3), (0.7, 0.1), (0.4, 0.9), (0.6, 0.6), (0.1, 0.8),
//! ]
//! .iter()
//! .map(|(lat, lng)| Coordinates::new(*lat, *lng))
//! .collect();
//!
//! let hull = zone_hull(&points).unwrap();
//! assert_eq!(hull.vertices().len(), 4);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geocode;
pub mod map;
pub mod zone;

// Re-export commonly used types
pub use api::{ApiClient, RequestContext, ZoneBackend};
pub use config::Config;
pub use coord::{Coordinates, ZoneType};
pub use error::{Error, Result};
pub use geocode::GeoBackend;
pub use map::{ClickOutcome, InteractionMode, MapController, MapEvent};
pub use zone::{Marker, Zone};
