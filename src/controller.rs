//! Click controller: orchestrates the marker / annotate / distance workflow.
//!
//! Each map click runs three steps strictly in order:
//! 1. *Place* — append a marker to the injected [`MarkerStore`].
//! 2. *Annotate* — reserve an info-log entry with the geographic coordinates
//!    and dispatch an asynchronous reverse-geocode lookup for it.
//! 3. *Pairwise distance* — when the store holds exactly two markers, compute
//!    the great-circle distance and raise a modal [`DistanceNotice`], with
//!    both endpoints' place names looked up for display inside the notice.
//!
//! Log entries are reserved synchronously at click time and filled in when
//! their lookup resolves, so the log order always matches click order even
//! when network completions interleave.

use std::collections::HashMap;
use std::sync::mpsc::Sender;

use chrono::{DateTime, Local};

use crate::events::{ClickMeta, DistanceMeta, EventController, EventKind, GeocodeMeta, MapEvent};
use crate::geo::{self, format_km, haversine_km, GeoPoint, ProjectedPoint};
use crate::geocoder::{GeocodeRequest, GeocodeResponse, GeocodeResult};
use crate::markers::{Marker, MarkerStore};

/// Resolution state of an asynchronous reverse-geocode lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    Pending,
    Resolved(GeocodeResult),
}

impl LookupState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LookupState::Pending)
    }

    /// Resolved display text (place name or placeholder); `None` while pending.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            LookupState::Pending => None,
            LookupState::Resolved(result) => Some(result.display_or_placeholder()),
        }
    }
}

/// One block of the append-only info log; produced per click.
#[derive(Debug, Clone)]
pub struct InfoEntry {
    /// Sequence token of the lookup that fills this entry.
    pub seq: u64,
    pub marker_id: usize,
    pub timestamp: DateTime<Local>,
    /// Click position in geographic coordinates.
    pub position: GeoPoint,
    pub location: LookupState,
}

impl InfoEntry {
    /// Coordinate line, latitude and longitude to 4 decimal places.
    pub fn coordinate_line(&self) -> String {
        format!(
            "Latitude: {:.4}  Longitude: {:.4}",
            self.position.lat, self.position.lon
        )
    }
}

/// The modal announcement raised when the second marker of a pair lands.
#[derive(Debug, Clone)]
pub struct DistanceNotice {
    pub km: f64,
    /// Geographic positions of markers 0 and 1.
    pub endpoints: [GeoPoint; 2],
    /// Place names of the two endpoints, resolved asynchronously.
    pub names: [LookupState; 2],
}

impl DistanceNotice {
    pub fn headline(&self) -> String {
        format!("Distance between marker 1 and marker 2: {}", format_km(self.km))
    }
}

/// Where a resolved lookup is routed.
#[derive(Debug, Clone, Copy)]
enum PendingLookup {
    LogEntry,
    NoticeEndpoint { index: usize },
}

/// Orchestrates the click workflow. Owns the marker store (injected at
/// construction), the info log, and the distance notice; dispatches
/// reverse-geocode lookups over the given channel and consumes their
/// responses via [`on_geocode_result`](Self::on_geocode_result).
///
/// Only ever driven from the single-threaded UI event flow.
pub struct ClickController {
    store: MarkerStore,
    geocode_tx: Sender<GeocodeRequest>,
    next_seq: u64,
    pending: HashMap<u64, PendingLookup>,
    log: Vec<InfoEntry>,
    notice: Option<DistanceNotice>,
    events: Option<EventController>,
}

impl ClickController {
    pub fn new(store: MarkerStore, geocode_tx: Sender<GeocodeRequest>) -> Self {
        Self {
            store,
            geocode_tx,
            next_seq: 0,
            pending: HashMap::new(),
            log: Vec::new(),
            notice: None,
            events: None,
        }
    }

    /// Attach an event controller; workflow events are emitted through it.
    pub fn with_events(mut self, events: EventController) -> Self {
        self.events = Some(events);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    /// The append-only info log, one entry per click, in click order.
    pub fn log(&self) -> &[InfoEntry] {
        &self.log
    }

    /// The active distance notice, if one is showing.
    pub fn notice(&self) -> Option<&DistanceNotice> {
        self.notice.as_ref()
    }

    /// Whether any dispatched lookup has not resolved yet.
    pub fn has_pending_lookups(&self) -> bool {
        !self.pending.is_empty()
    }

    // ── Click workflow ───────────────────────────────────────────────────────

    /// Handle a map click at the given projected position.
    pub fn handle_click(&mut self, position: ProjectedPoint) -> Marker {
        // Step 1: place.
        let marker = self.store.add(position);
        let geographic = geo::to_geographic(position);
        log::debug!(
            "marker {} placed at lat={:.4} lon={:.4}",
            marker.id,
            geographic.lat,
            geographic.lon
        );

        // Step 2: annotate. The entry is reserved now; the lookup fills it.
        // Lookups that degrade immediately (dead worker) are held back until
        // the click event has been emitted, so subscribers always see the
        // click before its geocode outcome.
        let mut degraded = Vec::new();
        let seq = self.alloc_seq();
        self.log.push(InfoEntry {
            seq,
            marker_id: marker.id,
            timestamp: Local::now(),
            position: geographic,
            location: LookupState::Pending,
        });
        degraded.extend(self.send_lookup(seq, PendingLookup::LogEntry, marker.id, geographic));

        let mut event =
            MapEvent::new(EventKind::CLICK | EventKind::MARKER_PLACED | EventKind::LOG_APPENDED);
        event.click = Some(ClickMeta { marker_id: marker.id, projected: position, geographic });

        // Step 3: pairwise distance, only when this click made the count
        // exactly two. A third click appends a marker but never re-fires.
        if self.store.count() == 2 {
            let a = geo::to_geographic(self.store.all()[0].position);
            let b = geo::to_geographic(self.store.all()[1].position);
            let km = haversine_km(a, b);

            // Drop stale endpoint lookups from any previous pair.
            self.pending
                .retain(|_, purpose| matches!(purpose, PendingLookup::LogEntry));
            self.notice = Some(DistanceNotice {
                km,
                endpoints: [a, b],
                names: [LookupState::Pending, LookupState::Pending],
            });
            let id0 = self.store.all()[0].id;
            let id1 = self.store.all()[1].id;
            let seq0 = self.alloc_seq();
            degraded
                .extend(self.send_lookup(seq0, PendingLookup::NoticeEndpoint { index: 0 }, id0, a));
            let seq1 = self.alloc_seq();
            degraded
                .extend(self.send_lookup(seq1, PendingLookup::NoticeEndpoint { index: 1 }, id1, b));

            event.kinds |= EventKind::DISTANCE_MEASURED;
            event.distance = Some(DistanceMeta { km, a, b });
        }

        self.emit(event);
        for response in degraded {
            self.on_geocode_result(response);
        }
        marker
    }

    /// Route a resolved lookup to the log entry or notice slot that asked.
    /// Responses whose target is gone (dismissed notice, unknown token) are
    /// silently discarded.
    pub fn on_geocode_result(&mut self, response: GeocodeResponse) {
        let Some(purpose) = self.pending.remove(&response.seq) else {
            return;
        };
        let resolved = response.result.display_name.is_some();
        match purpose {
            PendingLookup::LogEntry => {
                if let Some(entry) = self.log.iter_mut().find(|e| e.seq == response.seq) {
                    entry.location = LookupState::Resolved(response.result.clone());
                }
            }
            PendingLookup::NoticeEndpoint { index } => {
                if let Some(notice) = &mut self.notice {
                    notice.names[index] = LookupState::Resolved(response.result.clone());
                }
            }
        }

        let kinds = if resolved { EventKind::GEOCODE_RESOLVED } else { EventKind::GEOCODE_FAILED };
        let mut event = MapEvent::new(kinds);
        event.geocode = Some(GeocodeMeta {
            marker_id: response.marker_id,
            display_name: response.result.display_name,
        });
        self.emit(event);
    }

    /// Dismiss the distance notice, if showing.
    pub fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.emit(MapEvent::new(EventKind::NOTICE_DISMISSED));
        }
    }

    /// Remove all markers and any active notice. The info log is retained;
    /// in-flight log-entry lookups still resolve into it.
    pub fn clear_markers(&mut self) {
        self.store.clear();
        self.notice = None;
        self.pending
            .retain(|_, purpose| matches!(purpose, PendingLookup::LogEntry));
        self.emit(MapEvent::new(EventKind::MARKERS_CLEARED));
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Dispatch a lookup. If the worker is gone, returns a degraded empty
    /// response for the caller to apply (after its own event is emitted) so
    /// the slot does not stay pending forever.
    fn send_lookup(
        &mut self,
        seq: u64,
        purpose: PendingLookup,
        marker_id: usize,
        point: GeoPoint,
    ) -> Option<GeocodeResponse> {
        self.pending.insert(seq, purpose);
        let request = GeocodeRequest { seq, marker_id, point };
        if self.geocode_tx.send(request).is_err() {
            log::warn!("geocode worker unavailable, marker {marker_id} degrades to placeholder");
            return Some(GeocodeResponse { seq, marker_id, result: GeocodeResult::default() });
        }
        None
    }

    fn emit(&self, event: MapEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}
