//! Marker storage: the ordered collection of positions the user has placed.
//!
//! The store is owned by the click controller and only ever mutated from the
//! single-threaded UI event flow, so it needs no internal synchronization.

use crate::geo::ProjectedPoint;

/// A placed marker. Immutable after creation; `id` is its sequence index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub id: usize,
    pub position: ProjectedPoint,
}

/// Ordered, append-only collection of markers.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new marker at the given projected position and return it.
    /// Ids are assigned sequentially starting at 0.
    pub fn add(&mut self, position: ProjectedPoint) -> Marker {
        let marker = Marker { id: self.markers.len(), position };
        self.markers.push(marker);
        marker
    }

    /// All markers in placement order.
    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    /// Look up a marker by its sequence index.
    pub fn get(&self, id: usize) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Remove all markers. Subsequent ids start from 0 again.
    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_sequential_ids() {
        let mut store = MarkerStore::new();
        let a = store.add(ProjectedPoint::new(1.0, 2.0));
        let b = store.add(ProjectedPoint::new(3.0, 4.0));
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert_eq!(store.count(), 2);
        assert_eq!(store.get(1), Some(&b));
    }

    #[test]
    fn all_preserves_placement_order() {
        let mut store = MarkerStore::new();
        store.add(ProjectedPoint::new(0.0, 0.0));
        store.add(ProjectedPoint::new(1.0, 1.0));
        store.add(ProjectedPoint::new(2.0, 2.0));
        let xs: Vec<f64> = store.all().iter().map(|m| m.position.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn clear_resets_ids() {
        let mut store = MarkerStore::new();
        store.add(ProjectedPoint::new(0.0, 0.0));
        store.add(ProjectedPoint::new(1.0, 1.0));
        store.clear();
        assert!(store.is_empty());
        let m = store.add(ProjectedPoint::new(5.0, 5.0));
        assert_eq!(m.id, 0);
    }
}
