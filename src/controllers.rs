//! Controllers for interacting with the map UI from external code.
//!
//! The controllers expose lightweight state and a subscription mechanism so
//! non-UI code can observe the marker collection and distance announcements,
//! and push simple requests (like clearing the markers).

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::geo::GeoPoint;
use crate::markers::Marker;

/// A pairwise distance announcement, published when the second marker of a
/// pair lands.
#[derive(Debug, Clone)]
pub struct DistanceAnnouncement {
    pub km: f64,
    /// User-facing formatted distance ("3.93 km").
    pub formatted: String,
    /// Geographic endpoints of the measured pair.
    pub endpoints: [GeoPoint; 2],
}

/// Controller to observe markers/distances and request simple UI actions.
#[derive(Clone)]
pub struct MarkersController {
    pub(crate) inner: Arc<Mutex<MarkersCtrlInner>>, // crate-visible for UI
}

pub(crate) struct MarkersCtrlInner {
    pub(crate) markers: Vec<Marker>,
    pub(crate) last_distance: Option<DistanceAnnouncement>,
    pub(crate) request_clear: bool,
    pub(crate) listeners: Vec<Sender<DistanceAnnouncement>>,
}

impl MarkersController {
    /// Create a fresh controller.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MarkersCtrlInner {
                markers: Vec::new(),
                last_distance: None,
                request_clear: false,
                listeners: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current marker collection, in placement order.
    pub fn markers(&self) -> Vec<Marker> {
        self.inner.lock().unwrap().markers.clone()
    }

    /// The most recent distance announcement, if any.
    pub fn last_distance(&self) -> Option<DistanceAnnouncement> {
        self.inner.lock().unwrap().last_distance.clone()
    }

    /// Request that all markers be cleared. The request is recorded and
    /// honored by the UI on its next frame.
    pub fn request_clear(&self) {
        self.inner.lock().unwrap().request_clear = true;
    }

    /// Subscribe to distance announcements. The returned receiver gets a
    /// [`DistanceAnnouncement`] every time a marker pair is measured.
    pub fn subscribe_distances(&self) -> std::sync::mpsc::Receiver<DistanceAnnouncement> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.push(tx);
        rx
    }

    // ── UI-side publishing ───────────────────────────────────────────────────

    /// Publish the current marker snapshot. Called by the UI each frame.
    pub(crate) fn publish_markers(&self, markers: &[Marker]) {
        let mut inner = self.inner.lock().unwrap();
        if inner.markers != markers {
            inner.markers = markers.to_vec();
        }
    }

    /// Publish a new distance announcement and notify subscribers.
    pub(crate) fn publish_distance(&self, announcement: DistanceAnnouncement) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_distance = Some(announcement.clone());
        inner.listeners.retain(|tx| tx.send(announcement.clone()).is_ok());
    }

    /// Consume a pending clear request, if one was made.
    pub(crate) fn take_clear_request(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.request_clear)
    }
}

impl Default for MarkersController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::ProjectedPoint;

    #[test]
    fn publish_and_snapshot_markers() {
        let ctrl = MarkersController::new();
        assert!(ctrl.markers().is_empty());
        let markers =
            vec![Marker { id: 0, position: ProjectedPoint::new(1.0, 2.0) }];
        ctrl.publish_markers(&markers);
        assert_eq!(ctrl.markers(), markers);
    }

    #[test]
    fn distance_subscription_receives_announcements() {
        let ctrl = MarkersController::new();
        let rx = ctrl.subscribe_distances();
        ctrl.publish_distance(DistanceAnnouncement {
            km: 3.93,
            formatted: "3.93 km".to_string(),
            endpoints: [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)],
        });
        let got = rx.try_recv().unwrap();
        assert_eq!(got.formatted, "3.93 km");
        assert!(ctrl.last_distance().is_some());
    }

    #[test]
    fn clear_request_is_consumed_once() {
        let ctrl = MarkersController::new();
        assert!(!ctrl.take_clear_request());
        ctrl.request_clear();
        assert!(ctrl.take_clear_request());
        assert!(!ctrl.take_clear_request());
    }
}
