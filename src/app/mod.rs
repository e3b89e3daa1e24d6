//! Main application module for MapMeasure.
//!
//! | Sub-module     | Responsibility |
//! | -------------- | -------------- |
//! | [`map_plugin`] | Walkers plugin: pin drawing and click capture |
//! | [`run`]        | Top-level [`run_map()`] entry point and icon loading |
//!
//! [`MapApp`] itself lives here: the eframe application that wires the map
//! widget, the info-log panel, the click controller, and the geocode worker
//! together.

mod map_plugin;
mod run;

pub use run::run_map;

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use walkers::sources::OpenStreetMap;
use walkers::{HttpTiles, Map, MapMemory, Position};

use crate::config::{FeatureFlags, MapConfig};
use crate::controller::ClickController;
use crate::controllers::{DistanceAnnouncement, MarkersController};
use crate::geo::{self, format_km, GeoPoint};
use crate::geocoder::{spawn_worker, GeocodeResponse, NominatimGeocoder};
use crate::markers::MarkerStore;
use map_plugin::MarkerPins;

fn to_position(g: GeoPoint) -> Position {
    walkers::lat_lon(g.lat, g.lon)
}

fn from_position(p: Position) -> GeoPoint {
    GeoPoint::new(p.x(), p.y())
}

/// The eframe application: an interactive world map where clicks place
/// markers, each marker is reverse-geocoded into the info log, and the
/// second marker of a pair raises a modal distance notice.
pub struct MapApp {
    controller: ClickController,
    geocode_rx: Receiver<GeocodeResponse>,
    features: FeatureFlags,
    markers_ctrl: Option<MarkersController>,

    // Map state. Tiles are created lazily because they need an egui context.
    tiles: Option<HttpTiles>,
    map_memory: MapMemory,
    start_position: Position,

    /// Click position captured by the map plugin during the previous frame.
    clicked: Arc<Mutex<Option<Position>>>,
}

impl MapApp {
    pub fn new(cfg: MapConfig) -> Self {
        let (geocode_tx, geocode_rx) =
            spawn_worker(NominatimGeocoder::new(cfg.nominatim_endpoint.clone()));
        let mut controller = ClickController::new(MarkerStore::new(), geocode_tx);
        if let Some(events) = cfg.controllers.event.clone() {
            controller = controller.with_events(events);
        }

        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(cfg.start_zoom).is_err() {
            log::debug!("start zoom {} out of range, keeping widget default", cfg.start_zoom);
        }

        Self {
            controller,
            geocode_rx,
            features: cfg.features.clone(),
            markers_ctrl: cfg.controllers.markers.clone(),
            tiles: None,
            map_memory,
            start_position: to_position(cfg.start_position),
            clicked: Arc::new(Mutex::new(None)),
        }
    }

    /// Drain resolved geocode lookups into the controller.
    fn ingest_geocode_results(&mut self) {
        while let Ok(response) = self.geocode_rx.try_recv() {
            self.controller.on_geocode_result(response);
        }
    }

    /// Process controller requests and publish state for external observers.
    fn sync_markers_controller(&mut self) {
        let Some(ctrl) = self.markers_ctrl.clone() else {
            return;
        };
        if ctrl.take_clear_request() {
            self.controller.clear_markers();
        }
        ctrl.publish_markers(self.controller.store().all());
    }

    /// Handle a click captured by the map plugin on the previous frame.
    fn process_pending_click(&mut self) {
        let Some(position) = self.clicked.lock().unwrap().take() else {
            return;
        };
        let geographic = from_position(position);
        if !geographic.is_valid() {
            return;
        }
        let count_before = self.controller.store().count();
        self.controller.handle_click(geo::to_projected(geographic));

        // The pair just completed: publish the distance for subscribers.
        if count_before == 1 {
            if let (Some(ctrl), Some(notice)) = (&self.markers_ctrl, self.controller.notice()) {
                ctrl.publish_distance(DistanceAnnouncement {
                    km: notice.km,
                    formatted: format_km(notice.km),
                    endpoints: notice.endpoints,
                });
            }
        }
    }

    fn toolbar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} {} markers",
                egui_phosphor::regular::MAP_PIN,
                self.controller.store().count()
            ));
            ui.separator();
            if self.features.clear_button {
                let label = format!("{} Clear markers", egui_phosphor::regular::TRASH);
                if ui.button(label).clicked() {
                    self.controller.clear_markers();
                }
                ui.separator();
            }
            if let Some(notice) = self.controller.notice() {
                ui.label(format!(
                    "{} {}",
                    egui_phosphor::regular::RULER,
                    format_km(notice.km)
                ));
            }
        });
    }

    fn info_panel_ui(&self, ui: &mut egui::Ui) {
        ui.heading("Info");
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in self.controller.log() {
                    ui.label(
                        egui::RichText::new(format!(
                            "You clicked at ({})",
                            entry.timestamp.format("%H:%M:%S")
                        ))
                        .strong(),
                    );
                    ui.label(entry.coordinate_line());
                    match entry.location.display_text() {
                        Some(name) => {
                            ui.label(format!("Location: {name}"));
                            ui.label(entry.coordinate_line());
                        }
                        None => {
                            ui.label(egui::RichText::new("Looking up location…").italics());
                        }
                    }
                    ui.separator();
                }
            });
    }

    fn map_ui(&mut self, ui: &mut egui::Ui) {
        if self.tiles.is_none() {
            self.tiles = Some(HttpTiles::new(OpenStreetMap, ui.ctx().clone()));
        }
        let map_rect = ui.available_rect_before_wrap();

        let pins: Vec<Position> = self
            .controller
            .store()
            .all()
            .iter()
            .map(|m| to_position(geo::to_geographic(m.position)))
            .collect();
        let plugin = MarkerPins { pins, clicked: self.clicked.clone() };

        if let Some(tiles) = self.tiles.as_mut() {
            let map = Map::new(Some(tiles), &mut self.map_memory, self.start_position)
                .with_plugin(plugin);
            ui.add(map);
        }

        if self.features.attribution {
            ui.painter().text(
                map_rect.max - egui::vec2(5.0, 5.0),
                egui::Align2::RIGHT_BOTTOM,
                "© OpenStreetMap contributors",
                egui::FontId::proportional(10.0),
                egui::Color32::from_black_alpha(150),
            );
        }
    }

    /// Modal distance notice. Blocks interaction with the rest of the UI
    /// until dismissed, but never the runtime.
    fn distance_notice_ui(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        let modal = egui::Modal::new(egui::Id::new("distance_notice")).show(ctx, |ui| {
            ui.heading(format!("{} Distance", egui_phosphor::regular::RULER));
            ui.label(notice.headline());
            ui.separator();
            for (index, (endpoint, name)) in
                notice.endpoints.iter().zip(notice.names.iter()).enumerate()
            {
                let place = name.display_text().unwrap_or("Looking up location…");
                ui.label(format!(
                    "Marker {}: {place} ({:.4}, {:.4})",
                    index + 1,
                    endpoint.lat,
                    endpoint.lon
                ));
            }
            ui.separator();
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.controller.dismiss_notice();
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ingest_geocode_results();
        self.sync_markers_controller();
        self.process_pending_click();

        // Lookups resolve off-thread; keep repainting until they land.
        if self.controller.has_pending_lookups() {
            ctx.request_repaint_after(Duration::from_millis(150));
        }

        if self.features.toolbar {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                self.toolbar_ui(ui);
            });
        }
        if self.features.info_panel {
            egui::SidePanel::right("info_panel")
                .default_width(320.0)
                .show(ctx, |ui| {
                    self.info_panel_ui(ui);
                });
        }
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.map_ui(ui);
            });

        if self.features.distance_notice {
            self.distance_notice_ui(ctx);
        }
    }
}
