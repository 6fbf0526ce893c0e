//! Pending marker accumulation
//!
//! Holds the markers of the zone currently being drawn, one list per zone
//! type. Lists only ever hold 0-9 markers between finalizations; the
//! finalizer resets a list right after the tenth marker is submitted.

use crate::constants::zone::ZONE_SIZE;
use crate::coord::{Coordinates, ZoneType};
use crate::zone::Marker;
use std::collections::HashMap;
use tracing::debug;

/// Result of an append attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Marker was added; `len` is the new pending length
    Added { len: usize },
    /// A pending marker of the same type already sits at this position
    Duplicate,
    /// The position belongs to an already completed zone
    InCompletedZone,
}

/// Answers whether a coordinate is part of a completed zone
pub trait CompletedLookup {
    fn contains_coordinate(&self, coords: &Coordinates) -> bool;
}

impl CompletedLookup for () {
    fn contains_coordinate(&self, _coords: &Coordinates) -> bool {
        false
    }
}

/// Pending markers per zone type
#[derive(Debug, Default, Clone)]
pub struct MarkerAccumulator {
    pending: HashMap<ZoneType, Vec<Marker>>,
}

impl MarkerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker unless it conflicts
    ///
    /// Conflicts leave the accumulator unchanged.
    pub fn append(
        &mut self,
        zone_type: ZoneType,
        marker: Marker,
        completed: &impl CompletedLookup,
    ) -> AppendOutcome {
        if completed.contains_coordinate(&marker.position) {
            debug!(%zone_type, position = %marker.position, "rejecting marker inside completed zone");
            return AppendOutcome::InCompletedZone;
        }
        if self.contains(zone_type, &marker.position) {
            debug!(%zone_type, position = %marker.position, "rejecting duplicate pending marker");
            return AppendOutcome::Duplicate;
        }

        let list = self.pending.entry(zone_type).or_default();
        list.push(marker);
        AppendOutcome::Added { len: list.len() }
    }

    /// Remove the marker at `index`, preserving the order of the rest
    pub fn remove_at(&mut self, zone_type: ZoneType, index: usize) -> Option<Marker> {
        let list = self.pending.get_mut(&zone_type)?;
        if index >= list.len() {
            debug!(%zone_type, index, len = list.len(), "remove_at out of range");
            return None;
        }
        Some(list.remove(index))
    }

    /// Clear the pending list for a zone type
    pub fn reset(&mut self, zone_type: ZoneType) {
        self.pending.remove(&zone_type);
    }

    /// Pending markers for a zone type, oldest first
    pub fn pending(&self, zone_type: ZoneType) -> &[Marker] {
        self.pending
            .get(&zone_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Mutable access to a pending marker, used to record its server id
    pub fn pending_mut(&mut self, zone_type: ZoneType, index: usize) -> Option<&mut Marker> {
        self.pending.get_mut(&zone_type)?.get_mut(index)
    }

    pub fn len(&self, zone_type: ZoneType) -> usize {
        self.pending(zone_type).len()
    }

    pub fn is_empty(&self, zone_type: ZoneType) -> bool {
        self.len(zone_type) == 0
    }

    /// Whether a pending marker of this type sits at `coords`
    pub fn contains(&self, zone_type: ZoneType, coords: &Coordinates) -> bool {
        self.pending(zone_type)
            .iter()
            .any(|m| m.position.same_position(coords))
    }

    /// Finalization is due when the pending length is a positive multiple of ten
    pub fn is_ready(&self, zone_type: ZoneType) -> bool {
        is_finalization_due(self.len(zone_type))
    }

    /// The most recent [`ZONE_SIZE`] markers, or `None` if fewer are pending
    pub fn latest_batch(&self, zone_type: ZoneType) -> Option<&[Marker]> {
        let pending = self.pending(zone_type);
        if pending.len() < ZONE_SIZE {
            return None;
        }
        Some(&pending[pending.len() - ZONE_SIZE..])
    }
}

/// Trigger rule for zone finalization
pub fn is_finalization_due(len: usize) -> bool {
    len > 0 && len % ZONE_SIZE == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Completed(Vec<Coordinates>);

    impl CompletedLookup for Completed {
        fn contains_coordinate(&self, coords: &Coordinates) -> bool {
            self.0.iter().any(|c| c.same_position(coords))
        }
    }

    fn marker(lat: f64, lng: f64) -> Marker {
        Marker::new(Coordinates::new(lat, lng))
    }

    #[test]
    fn test_append_and_len() {
        let mut acc = MarkerAccumulator::new();
        assert_eq!(
            acc.append(ZoneType::Safe, marker(1.0, 1.0), &()),
            AppendOutcome::Added { len: 1 }
        );
        assert_eq!(
            acc.append(ZoneType::Safe, marker(2.0, 2.0), &()),
            AppendOutcome::Added { len: 2 }
        );
        assert_eq!(acc.len(ZoneType::Safe), 2);
        assert!(acc.is_empty(ZoneType::Dangerous));
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut acc = MarkerAccumulator::new();
        acc.append(ZoneType::Safe, marker(1.0, 1.0), &());
        assert_eq!(
            acc.append(ZoneType::Safe, marker(1.0, 1.0), &()),
            AppendOutcome::Duplicate
        );
        assert_eq!(acc.len(ZoneType::Safe), 1);

        // Same spot is fine for the other zone type
        assert_eq!(
            acc.append(ZoneType::Dangerous, marker(1.0, 1.0), &()),
            AppendOutcome::Added { len: 1 }
        );
    }

    #[test]
    fn test_completed_zone_coordinate_rejected() {
        let mut acc = MarkerAccumulator::new();
        let completed = Completed(vec![Coordinates::new(3.0, 3.0)]);

        for zone_type in ZoneType::all() {
            assert_eq!(
                acc.append(zone_type, marker(3.0, 3.0), &completed),
                AppendOutcome::InCompletedZone
            );
            assert_eq!(acc.len(zone_type), 0);
        }
    }

    #[test]
    fn test_remove_at_preserves_order() {
        let mut acc = MarkerAccumulator::new();
        for i in 0..5 {
            acc.append(ZoneType::Dangerous, marker(i as f64, 0.0), &());
        }

        let removed = acc.remove_at(ZoneType::Dangerous, 2).unwrap();
        assert_eq!(removed.position.lat, 2.0);

        let lats: Vec<f64> = acc
            .pending(ZoneType::Dangerous)
            .iter()
            .map(|m| m.position.lat)
            .collect();
        assert_eq!(lats, vec![0.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut acc = MarkerAccumulator::new();
        acc.append(ZoneType::Safe, marker(0.0, 0.0), &());
        assert!(acc.remove_at(ZoneType::Safe, 5).is_none());
        assert!(acc.remove_at(ZoneType::Dangerous, 0).is_none());
        assert_eq!(acc.len(ZoneType::Safe), 1);
    }

    #[test]
    fn test_ready_only_at_multiples_of_ten() {
        for len in 0..=30 {
            assert_eq!(is_finalization_due(len), len != 0 && len % 10 == 0, "len {}", len);
        }

        let mut acc = MarkerAccumulator::new();
        for i in 0..9 {
            acc.append(ZoneType::Safe, marker(i as f64, i as f64 * 2.0), &());
            assert!(!acc.is_ready(ZoneType::Safe));
        }
        acc.append(ZoneType::Safe, marker(50.0, 50.0), &());
        assert!(acc.is_ready(ZoneType::Safe));
    }

    #[test]
    fn test_latest_batch_and_reset() {
        let mut acc = MarkerAccumulator::new();
        for i in 0..10 {
            acc.append(ZoneType::Safe, marker(i as f64, 0.0), &());
        }
        let batch = acc.latest_batch(ZoneType::Safe).unwrap();
        assert_eq!(batch.len(), 10);
        assert_eq!(batch[0].position.lat, 0.0);

        acc.reset(ZoneType::Safe);
        assert_eq!(acc.len(ZoneType::Safe), 0);
        assert!(acc.latest_batch(ZoneType::Safe).is_none());
    }
}
