//! Geographic and projected coordinate types, the spherical Mercator
//! transform, and great-circle distance.
//!
//! Everything in this module is a pure function over immutable value types.
//! The projection is standard spherical (Web) Mercator, EPSG:3857; distances
//! use the haversine formula on a sphere of radius 6371 km.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};

/// Earth radius used by the haversine distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Semi-major axis of the spherical Mercator projection, in meters.
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// A geographic position in decimal degrees.
///
/// Valid range: longitude ∈ [-180, 180], latitude ∈ [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether both coordinates are finite and within the valid geographic range.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// A position in the map's projected space (spherical Mercator meters).
///
/// Opaque to application logic except via [`to_geographic`] / [`to_projected`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Forward spherical Mercator projection.
pub fn to_projected(g: GeoPoint) -> ProjectedPoint {
    let x = MERCATOR_RADIUS_M * g.lon.to_radians();
    let y = MERCATOR_RADIUS_M * (FRAC_PI_4 + g.lat.to_radians() / 2.0).tan().ln();
    ProjectedPoint { x, y }
}

/// Inverse spherical Mercator projection.
pub fn to_geographic(p: ProjectedPoint) -> GeoPoint {
    let lon = (p.x / MERCATOR_RADIUS_M).to_degrees();
    let lat = (2.0 * (p.y / MERCATOR_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    GeoPoint { lon, lat }
}

/// Great-circle distance between two geographic points, in kilometers.
///
/// NaN coordinates propagate to a NaN result; no other failure modes.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Format a distance for display: two decimal places with a "km" suffix.
pub fn format_km(km: f64) -> String {
    format!("{:.2} km", km)
}
