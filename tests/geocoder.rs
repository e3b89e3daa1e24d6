//! Nominatim payload handling checked through the public API. No network.

use mapmeasure::geocoder::{parse_reverse_payload, GeocodeResult};

#[test]
fn payload_with_display_name_is_extracted() {
    let body = r#"{"place_id": 42, "display_name": "Jakarta, Indonesia", "lat": "-6.2", "lon": "106.8"}"#;
    let result = parse_reverse_payload(body).unwrap();
    assert_eq!(result.display_name.as_deref(), Some("Jakarta, Indonesia"));
}

#[test]
fn payload_without_display_name_falls_back_to_placeholder() {
    let body = r#"{"error": "Unable to geocode"}"#;
    let result = parse_reverse_payload(body).unwrap();
    assert_eq!(result.display_name, None);
    assert_eq!(result.display_or_placeholder(), "Location not found");
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(parse_reverse_payload("<html>gateway timeout</html>").is_err());
}

#[test]
fn empty_result_helper_matches_absent_name() {
    let r = GeocodeResult { display_name: None };
    assert_eq!(r.display_or_placeholder(), "Location not found");
}
