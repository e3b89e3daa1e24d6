//! MapMeasure crate root: re-exports and module wiring.
//!
//! This crate provides an interactive world map built on egui/eframe and the
//! `walkers` tile widget: clicking places markers, each marker is
//! reverse-geocoded through Nominatim, and once two markers exist the
//! great-circle distance between them is announced.
//!
//! The workflow is split into cohesive modules:
//! - `geo`: coordinate types, Mercator transform, haversine distance
//! - `markers`: the ordered marker store
//! - `geocoder`: the Nominatim reverse geocoder and its worker thread
//! - `controller`: the click workflow (place / annotate / distance)
//! - `events`: filterable workflow event subscriptions
//! - `controllers`: programmatic observation and control of the UI
//! - `config`: shared configuration
//! - `app`: the eframe application and run helpers

pub mod app;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod events;
pub mod geo;
pub mod geocoder;
pub mod markers;

// Public re-exports for a compact external API
pub use app::{run_map, MapApp};
pub use config::{Controllers, FeatureFlags, MapConfig};
pub use controller::{ClickController, DistanceNotice, InfoEntry, LookupState};
pub use controllers::{DistanceAnnouncement, MarkersController};
pub use events::{EventController, EventFilter, EventKind, MapEvent};
pub use geo::{format_km, haversine_km, to_geographic, to_projected, GeoPoint, ProjectedPoint};
pub use geocoder::{GeocodeResult, NominatimGeocoder, ReverseGeocode};
pub use markers::{Marker, MarkerStore};
