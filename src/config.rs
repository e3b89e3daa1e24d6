//! Configuration types for the map UI.

use crate::controllers::MarkersController;
use crate::events::EventController;
use crate::geo::GeoPoint;
use crate::geocoder::NOMINATIM_ENDPOINT;

// ─────────────────────────────────────────────────────────────────────────────
// Feature flags
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle individual UI features on or off.
///
/// All features default to `true` (enabled). Disable features to create a
/// minimal, focused map view.
#[derive(Clone, Debug)]
pub struct FeatureFlags {
    /// Show the top toolbar (marker count, clear button).
    pub toolbar: bool,
    /// Show the info-log side panel.
    pub info_panel: bool,
    /// Show the modal distance notice when the second marker lands.
    pub distance_notice: bool,
    /// Show the "clear markers" toolbar button.
    pub clear_button: bool,
    /// Show the tile-source attribution line over the map.
    pub attribution: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            toolbar: true,
            info_panel: true,
            distance_notice: true,
            clear_button: true,
            attribution: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controllers sub-config
// ─────────────────────────────────────────────────────────────────────────────

/// Optional programmatic controllers attached to the map.
#[derive(Clone, Default)]
pub struct Controllers {
    pub event: Option<EventController>,
    pub markers: Option<MarkersController>,
}

// ─────────────────────────────────────────────────────────────────────────────
// MapConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for the map window.
#[derive(Clone)]
pub struct MapConfig {
    /// Native window title.
    pub title: String,
    /// Initial map center.
    pub start_position: GeoPoint,
    /// Initial zoom level.
    pub start_zoom: f64,
    /// Reverse-geocoding endpoint (Nominatim-compatible).
    pub nominatim_endpoint: String,
    /// Toggle individual UI features on/off.
    pub features: FeatureFlags,
    /// Optional eframe native-window options.
    pub native_options: Option<eframe::NativeOptions>,
    /// External controllers for programmatic interaction.
    pub controllers: Controllers,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "MapMeasure".to_string(),
            // Jakarta
            start_position: GeoPoint::new(106.8456, -6.2088),
            start_zoom: 5.0,
            nominatim_endpoint: NOMINATIM_ENDPOINT.to_string(),
            features: FeatureFlags::default(),
            native_options: None,
            controllers: Controllers::default(),
        }
    }
}
