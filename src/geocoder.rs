//! Reverse geocoding: resolving a geographic point to a human-readable place
//! name via the Nominatim HTTP API.
//!
//! The [`ReverseGeocode`] trait is the seam between the click workflow and
//! the network: the UI uses [`NominatimGeocoder`] on a background worker
//! thread, tests substitute their own implementation. Lookups are plain
//! request/response pairs over `mpsc` channels so the UI thread never blocks
//! on a network round trip.

use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::GeoPoint;

/// Default Nominatim reverse-geocoding endpoint.
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Nominatim requires an identifying User-Agent for API access.
const USER_AGENT: &str = concat!("mapmeasure/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a single reverse lookup round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a reverse-geocode lookup. `display_name` is absent when the
/// service has no answer for the point (or the lookup degraded on error).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeResult {
    pub display_name: Option<String>,
}

impl GeocodeResult {
    /// User-visible placeholder shown when no display name is available.
    pub const PLACEHOLDER: &'static str = "Location not found";

    /// The display name, or the placeholder when absent.
    pub fn display_or_placeholder(&self) -> &str {
        self.display_name.as_deref().unwrap_or(Self::PLACEHOLDER)
    }
}

/// Errors a reverse lookup can produce. All of these are absorbed before
/// reaching the user; they only surface as the placeholder string.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("coordinate out of range: lon {lon}, lat {lat}")]
    OutOfRange { lon: f64, lat: f64 },
    #[error("reverse geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed reverse geocoding payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A reverse-geocoding backend.
pub trait ReverseGeocode: Send {
    fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, GeocodeError>;
}

/// The only field consumed from the Nominatim response.
#[derive(Debug, Deserialize)]
struct ReversePayload {
    #[serde(default)]
    display_name: Option<String>,
}

/// Parse a Nominatim reverse response body. A payload without `display_name`
/// is a valid "no result", not an error.
pub fn parse_reverse_payload(body: &str) -> Result<GeocodeResult, GeocodeError> {
    let payload: ReversePayload = serde_json::from_str(body)?;
    Ok(GeocodeResult { display_name: payload.display_name })
}

/// Shared blocking HTTP client. Lookups run on the geocode worker thread.
static HTTP: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("default TLS backend available")
});

/// Reverse geocoder backed by the Nominatim HTTP API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new(NOMINATIM_ENDPOINT)
    }
}

impl ReverseGeocode for NominatimGeocoder {
    fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, GeocodeError> {
        if !point.is_valid() {
            return Err(GeocodeError::OutOfRange { lon: point.lon, lat: point.lat });
        }
        log::debug!("reverse geocoding lat={:.4} lon={:.4}", point.lat, point.lon);
        let body = HTTP
            .get(&self.endpoint)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("format", "json".to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()?;
        parse_reverse_payload(&body)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker thread and channels
// ─────────────────────────────────────────────────────────────────────────────

/// A lookup request dispatched by the click controller. `seq` is a per-click
/// sequence token used to route the response back to the spot that asked.
#[derive(Debug, Clone, Copy)]
pub struct GeocodeRequest {
    pub seq: u64,
    pub marker_id: usize,
    pub point: GeoPoint,
}

/// A resolved lookup. Failed lookups arrive here too, degraded to an empty
/// [`GeocodeResult`]; they are never fatal.
#[derive(Debug, Clone)]
pub struct GeocodeResponse {
    pub seq: u64,
    pub marker_id: usize,
    pub result: GeocodeResult,
}

/// Spawn the geocode worker thread.
///
/// Requests sent on the returned sender are resolved one at a time (Nominatim
/// asks for at most one request in flight) and answered on the returned
/// receiver. The worker exits when either channel end is dropped.
pub fn spawn_worker<G: ReverseGeocode + 'static>(
    geocoder: G,
) -> (Sender<GeocodeRequest>, Receiver<GeocodeResponse>) {
    let (req_tx, req_rx) = std::sync::mpsc::channel::<GeocodeRequest>();
    let (resp_tx, resp_rx) = std::sync::mpsc::channel::<GeocodeResponse>();
    std::thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            let result = match geocoder.reverse(req.point) {
                Ok(result) => result,
                Err(err) => {
                    log::warn!("reverse geocoding failed for marker {}: {err}", req.marker_id);
                    GeocodeResult::default()
                }
            };
            let response = GeocodeResponse { seq: req.seq, marker_id: req.marker_id, result };
            if resp_tx.send(response).is_err() {
                break;
            }
        }
    });
    (req_tx, resp_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_display_name() {
        let body = r#"{"place_id": 1, "display_name": "Jakarta, Indonesia", "lat": "-6.2"}"#;
        let result = parse_reverse_payload(body).unwrap();
        assert_eq!(result.display_name.as_deref(), Some("Jakarta, Indonesia"));
        assert_eq!(result.display_or_placeholder(), "Jakarta, Indonesia");
    }

    #[test]
    fn payload_without_display_name_is_no_result() {
        let body = r#"{"error": "Unable to geocode"}"#;
        let result = parse_reverse_payload(body).unwrap();
        assert_eq!(result.display_name, None);
        assert_eq!(result.display_or_placeholder(), GeocodeResult::PLACEHOLDER);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_reverse_payload("<html>rate limited</html>").is_err());
    }

    #[test]
    fn out_of_range_point_is_rejected_before_the_network() {
        let geocoder = NominatimGeocoder::default();
        let err = geocoder.reverse(GeoPoint::new(500.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeocodeError::OutOfRange { .. }));
    }

    #[test]
    fn worker_degrades_failures_to_empty_results() {
        struct Failing;
        impl ReverseGeocode for Failing {
            fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, GeocodeError> {
                Err(GeocodeError::OutOfRange { lon: point.lon, lat: point.lat })
            }
        }
        let (tx, rx) = spawn_worker(Failing);
        tx.send(GeocodeRequest { seq: 7, marker_id: 0, point: GeoPoint::new(1.0, 2.0) })
            .unwrap();
        let resp = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(resp.seq, 7);
        assert_eq!(resp.result.display_name, None);
    }

    #[test]
    fn worker_preserves_request_order() {
        struct Echo;
        impl ReverseGeocode for Echo {
            fn reverse(&self, point: GeoPoint) -> Result<GeocodeResult, GeocodeError> {
                Ok(GeocodeResult { display_name: Some(format!("{:.1}", point.lon)) })
            }
        }
        let (tx, rx) = spawn_worker(Echo);
        for seq in 0..3u64 {
            tx.send(GeocodeRequest {
                seq,
                marker_id: seq as usize,
                point: GeoPoint::new(seq as f64, 0.0),
            })
            .unwrap();
        }
        for expected in 0..3u64 {
            let resp = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(resp.seq, expected);
        }
    }
}
