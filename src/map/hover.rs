//! Debounced hover lookups
//!
//! Hovering a marker schedules a reverse geocode after a fixed delay. The
//! scheduled task's handle is kept so that moving the pointer away (or onto
//! another marker) cancels the lookup before it is issued.

use crate::coord::Coordinates;
use crate::geocode::{enrich, Enrichment, GeoBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Place name resolved for a hovered position
#[derive(Debug, Clone, PartialEq)]
pub struct HoverResult {
    pub position: Coordinates,
    pub enrichment: Enrichment,
}

/// Cancellable delayed reverse lookups
pub struct HoverLookup<G> {
    geocoder: Arc<G>,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    results: mpsc::UnboundedSender<HoverResult>,
}

impl<G: GeoBackend + 'static> HoverLookup<G> {
    /// Create a lookup scheduler and the channel its results arrive on
    pub fn new(geocoder: Arc<G>, delay: Duration) -> (Self, mpsc::UnboundedReceiver<HoverResult>) {
        let (results, rx) = mpsc::unbounded_channel();
        let lookup = Self {
            geocoder,
            delay,
            pending: None,
            results,
        };
        (lookup, rx)
    }

    /// Pointer entered `position`; replaces any outstanding lookup
    pub fn hover(&mut self, position: Coordinates) {
        self.leave();

        let geocoder = Arc::clone(&self.geocoder);
        let results = self.results.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let enrichment = enrich(geocoder.as_ref(), position).await;
            let _ = results.send(HoverResult {
                position,
                enrichment,
            });
        }));
    }

    /// Pointer left; cancel the outstanding lookup if it has not fired
    pub fn leave(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("hover lookup cancelled");
            }
            handle.abort();
        }
    }

    /// Whether a lookup is scheduled or in flight
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<G> Drop for HoverLookup<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
