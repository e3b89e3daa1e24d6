//! Scenario tests for the click workflow: place, annotate, pairwise distance.
//!
//! The controller is driven directly with a hand-held geocode channel, so no
//! map widget or network is involved.

use std::sync::mpsc::{self, Receiver};

use mapmeasure::controller::ClickController;
use mapmeasure::geo::{to_projected, GeoPoint};
use mapmeasure::geocoder::{GeocodeRequest, GeocodeResponse, GeocodeResult};
use mapmeasure::events::{EventController, EventFilter, EventKind};
use mapmeasure::MarkerStore;

const JAKARTA_A: GeoPoint = GeoPoint { lon: 106.8456, lat: -6.2088 };
const JAKARTA_B: GeoPoint = GeoPoint { lon: 106.8272, lat: -6.1754 };

fn controller() -> (ClickController, Receiver<GeocodeRequest>) {
    let (tx, rx) = mpsc::channel();
    (ClickController::new(MarkerStore::new(), tx), rx)
}

fn resolve(ctrl: &mut ClickController, req: &GeocodeRequest, name: Option<&str>) {
    ctrl.on_geocode_result(GeocodeResponse {
        seq: req.seq,
        marker_id: req.marker_id,
        result: GeocodeResult { display_name: name.map(str::to_string) },
    });
}

#[test]
fn single_click_adds_one_marker_and_one_log_block() {
    let (mut ctrl, rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));

    assert_eq!(ctrl.store().count(), 1);
    assert_eq!(ctrl.log().len(), 1);
    assert!(ctrl.notice().is_none(), "no distance after a single click");
    // Exactly one lookup was dispatched.
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[test]
fn second_click_triggers_exactly_one_distance_notice() {
    let (mut ctrl, rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    assert!(ctrl.notice().is_none());

    ctrl.handle_click(to_projected(JAKARTA_B));
    let notice = ctrl.notice().expect("distance notice after second click");
    assert!(notice.km > 3.90 && notice.km < 4.00, "got {}", notice.km);
    assert!(notice.headline().ends_with("km"));

    // Two annotation lookups plus two notice-endpoint lookups.
    assert_eq!(rx.try_iter().count(), 4);
}

#[test]
fn third_click_appends_marker_but_never_refires() {
    let (mut ctrl, _rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    ctrl.handle_click(to_projected(JAKARTA_B));
    ctrl.dismiss_notice();

    ctrl.handle_click(to_projected(GeoPoint::new(100.0, -5.0)));
    assert_eq!(ctrl.store().count(), 3);
    assert!(ctrl.notice().is_none(), "the exactly-2 check must not re-fire");
    assert_eq!(ctrl.log().len(), 3, "the log still grows per click");
}

#[test]
fn missing_display_name_yields_placeholder_not_error() {
    let (mut ctrl, rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    let req = rx.try_recv().unwrap();

    resolve(&mut ctrl, &req, None);
    assert_eq!(
        ctrl.log()[0].location.display_text(),
        Some("Location not found")
    );
}

#[test]
fn log_order_matches_click_order_despite_interleaved_completions() {
    let (mut ctrl, rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    ctrl.handle_click(to_projected(JAKARTA_B));
    let requests: Vec<GeocodeRequest> = rx.try_iter().collect();

    // Resolve the second click's annotation before the first click's.
    resolve(&mut ctrl, &requests[1], Some("Second"));
    resolve(&mut ctrl, &requests[0], Some("First"));

    assert_eq!(ctrl.log()[0].location.display_text(), Some("First"));
    assert_eq!(ctrl.log()[1].location.display_text(), Some("Second"));
}

#[test]
fn distance_notice_collects_both_place_names() {
    let (mut ctrl, rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    ctrl.handle_click(to_projected(JAKARTA_B));
    let requests: Vec<GeocodeRequest> = rx.try_iter().collect();

    // requests[2] and [3] are the notice endpoints for markers 0 and 1.
    resolve(&mut ctrl, &requests[2], Some("Menteng, Jakarta"));
    resolve(&mut ctrl, &requests[3], Some("Senen, Jakarta"));

    let notice = ctrl.notice().unwrap();
    assert_eq!(notice.names[0].display_text(), Some("Menteng, Jakarta"));
    assert_eq!(notice.names[1].display_text(), Some("Senen, Jakarta"));
}

#[test]
fn clearing_markers_allows_a_fresh_pair_to_measure_again() {
    let (mut ctrl, _rx) = controller();
    ctrl.handle_click(to_projected(JAKARTA_A));
    ctrl.handle_click(to_projected(JAKARTA_B));
    assert!(ctrl.notice().is_some());

    ctrl.clear_markers();
    assert_eq!(ctrl.store().count(), 0);
    assert!(ctrl.notice().is_none());

    ctrl.handle_click(to_projected(JAKARTA_B));
    assert!(ctrl.notice().is_none());
    ctrl.handle_click(to_projected(JAKARTA_A));
    assert!(ctrl.notice().is_some(), "a fresh pair measures again");
}

#[test]
fn workflow_emits_filtered_events() {
    let (tx, rx) = mpsc::channel();
    let events = EventController::new();
    let all = events.subscribe_all();
    let distances = events.subscribe(EventFilter::only(EventKind::DISTANCE_MEASURED));
    let mut ctrl =
        ClickController::new(MarkerStore::new(), tx).with_events(events);

    ctrl.handle_click(to_projected(JAKARTA_A));
    let first = all.try_recv().unwrap();
    assert!(first.kinds.contains(EventKind::CLICK | EventKind::MARKER_PLACED));
    assert!(!first.kinds.contains(EventKind::DISTANCE_MEASURED));
    assert!(distances.try_recv().is_err());

    ctrl.handle_click(to_projected(JAKARTA_B));
    let second = all.try_recv().unwrap();
    assert!(second.kinds.contains(EventKind::DISTANCE_MEASURED));
    let announced = distances.try_recv().unwrap();
    let meta = announced.distance.expect("distance metadata");
    assert!(meta.km > 3.90 && meta.km < 4.00);

    // Resolving an annotation produces a geocode event.
    let req = rx.try_iter().next().unwrap();
    ctrl.on_geocode_result(GeocodeResponse {
        seq: req.seq,
        marker_id: req.marker_id,
        result: GeocodeResult { display_name: Some("Jakarta".into()) },
    });
    let geocode = all
        .try_iter()
        .find(|e| e.kinds.intersects(EventKind::GEOCODE_RESOLVED))
        .expect("geocode event");
    assert_eq!(
        geocode.geocode.unwrap().display_name.as_deref(),
        Some("Jakarta")
    );
}
