//! Walkers plugin that draws marker pins and captures map clicks.

use std::sync::{Arc, Mutex};

use walkers::{MapMemory, Plugin, Position, Projector};

/// Scale applied to the pin glyph relative to its base size.
const PIN_SCALE: f32 = 0.4;

/// Per-frame plugin: draws one pin per marker and records the geographic
/// position of a primary click into the shared `clicked` cell.
pub(crate) struct MarkerPins {
    pub(crate) pins: Vec<Position>,
    pub(crate) clicked: Arc<Mutex<Option<Position>>>,
}

impl Plugin for MarkerPins {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter().with_clip_rect(response.rect);

        for pos in &self.pins {
            let screen = projector.project(*pos);
            draw_pin(&painter, egui::pos2(screen.x, screen.y));
        }

        // A click that was not a drag places a marker. Dragging pans the map
        // and does not count.
        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let position = projector.unproject(pointer.to_vec2());
                *self.clicked.lock().unwrap() = Some(position);
            }
        }
    }
}

/// Draw a map pin with its tip at `tip`: a filled head circle with a white
/// center dot, tapering down to the anchor point.
fn draw_pin(painter: &egui::Painter, tip: egui::Pos2) {
    let head_radius = 16.0 * PIN_SCALE;
    let head = tip - egui::vec2(0.0, 34.0 * PIN_SCALE);
    let fill = egui::Color32::from_rgb(217, 64, 39);

    painter.add(egui::Shape::convex_polygon(
        vec![
            tip,
            head + egui::vec2(-head_radius * 0.85, head_radius * 0.4),
            head + egui::vec2(head_radius * 0.85, head_radius * 0.4),
        ],
        fill,
        egui::Stroke::NONE,
    ));
    painter.circle_filled(head, head_radius, fill);
    painter.circle_stroke(head, head_radius, egui::Stroke::new(1.5, egui::Color32::WHITE));
    painter.circle_filled(head, head_radius * 0.35, egui::Color32::WHITE);
}
