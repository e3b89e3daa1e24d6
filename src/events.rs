//! Event system for the map workflow.
//!
//! Callers can subscribe to UI and workflow events via [`EventController`].
//! Each event carries a set of [`EventKind`] flags (bitflags-style) so a
//! single occurrence can match multiple categories (e.g. the click that
//! completes a marker pair is both a `CLICK` and a `DISTANCE_MEASURED`).
//!
//! Subscribers specify an [`EventFilter`]: a simple OR mask. An event is
//! delivered when `event.kinds` intersects the mask.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::geo::{GeoPoint, ProjectedPoint};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u32);

impl EventKind {
    /// A primary click on the map surface.
    pub const CLICK: Self = Self(1 << 0);
    /// A marker was appended to the store.
    pub const MARKER_PLACED: Self = Self(1 << 1);
    /// An entry was appended to the info log.
    pub const LOG_APPENDED: Self = Self(1 << 2);
    /// A reverse-geocode lookup resolved with a display name.
    pub const GEOCODE_RESOLVED: Self = Self(1 << 3);
    /// A reverse-geocode lookup came back without a display name.
    pub const GEOCODE_FAILED: Self = Self(1 << 4);
    /// A pairwise distance was computed and announced.
    pub const DISTANCE_MEASURED: Self = Self(1 << 5);
    /// All markers were cleared.
    pub const MARKERS_CLEARED: Self = Self(1 << 6);
    /// The distance notice was dismissed.
    pub const NOTICE_DISMISSED: Self = Self(1 << 7);

    /// Wildcard: matches every event kind.
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }
        let pairs: &[(EventKind, &str)] = &[
            (EventKind::CLICK, "CLICK"),
            (EventKind::MARKER_PLACED, "MARKER_PLACED"),
            (EventKind::LOG_APPENDED, "LOG_APPENDED"),
            (EventKind::GEOCODE_RESOLVED, "GEOCODE_RESOLVED"),
            (EventKind::GEOCODE_FAILED, "GEOCODE_FAILED"),
            (EventKind::DISTANCE_MEASURED, "DISTANCE_MEASURED"),
            (EventKind::MARKERS_CLEARED, "MARKERS_CLEARED"),
            (EventKind::NOTICE_DISMISSED, "NOTICE_DISMISSED"),
        ];
        let mut names = Vec::new();
        let mut known: u32 = 0;
        for (kind, name) in pairs {
            known |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }
        let extra = self.0 & !known;
        if extra != 0 {
            names.push(format!("0x{extra:x}"));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata – per-event-type payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata attached to click / marker-placement events.
#[derive(Debug, Clone, Copy)]
pub struct ClickMeta {
    pub marker_id: usize,
    /// Click position in the map's projected space.
    pub projected: ProjectedPoint,
    /// Click position in geographic coordinates.
    pub geographic: GeoPoint,
}

/// Metadata for geocode resolution events.
#[derive(Debug, Clone)]
pub struct GeocodeMeta {
    pub marker_id: usize,
    /// Resolved display name; `None` for a degraded lookup.
    pub display_name: Option<String>,
}

/// Metadata for distance announcements.
#[derive(Debug, Clone, Copy)]
pub struct DistanceMeta {
    pub km: f64,
    pub a: GeoPoint,
    pub b: GeoPoint,
}

/// An event emitted by the map workflow.
#[derive(Debug, Clone)]
pub struct MapEvent {
    /// Bitflag set of categories this event belongs to.
    pub kinds: EventKind,
    /// Monotonic timestamp, seconds since the controller was created.
    pub timestamp: f64,
    pub click: Option<ClickMeta>,
    pub geocode: Option<GeocodeMeta>,
    pub distance: Option<DistanceMeta>,
}

impl MapEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self { kinds, timestamp: 0.0, click: None, geocode: None, distance: None }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter and EventController
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask filter selecting which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self { mask: EventKind::ALL }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &MapEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

struct Subscriber {
    filter: EventFilter,
    sender: Sender<MapEvent>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

/// Collects workflow events and distributes them to subscribers.
///
/// Attach it to [`MapConfig`](crate::config::MapConfig) before launching the
/// UI, then call [`subscribe`](Self::subscribe) to receive events over an
/// `mpsc` channel.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<MapEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    /// Subscribe to all events (no filtering).
    pub fn subscribe_all(&self) -> Receiver<MapEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit an event to all subscribers whose filter matches. Subscribers
    /// whose receiving end was dropped are pruned.
    pub fn emit(&self, mut event: MapEvent) {
        let mut inner = self.inner.lock().unwrap();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}
