//! Top-level entry point for running MapMeasure as a native window.
//!
//! The [`run_map`] function is the primary public API for launching the map
//! application. It accepts a configuration object, wires up controllers, and
//! enters the eframe event loop.

use crate::config::MapConfig;

use super::MapApp;

/// Launch the map application in a native window.
///
/// The call blocks until the window is closed.
pub fn run_map(mut cfg: MapConfig) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let mut opts = cfg
        .native_options
        .take()
        .unwrap_or_else(eframe::NativeOptions::default);

    // Window icon, unless the caller already provided one.
    if opts.viewport.icon.is_none() {
        if let Some(icon) = load_app_icon_svg() {
            opts.viewport = opts.viewport.clone().with_icon(icon);
        }
    }

    // Roomy default size when the caller did not pick one.
    if opts.viewport.inner_size.is_none() {
        opts.viewport = opts
            .viewport
            .clone()
            .with_inner_size(egui::vec2(1200.0, 800.0));
    }

    let app = MapApp::new(cfg);
    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}

/// Rasterize the crate's `icon.svg` into window-icon pixel data.
///
/// Any failure along the way (missing file, parse or raster error) yields
/// `None` and the window keeps the platform default icon.
fn load_app_icon_svg() -> Option<egui::IconData> {
    let data = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/icon.svg")).ok()?;

    let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).ok()?;
    let size = tree.size().to_int_size();
    if size.width() == 0 || size.height() == 0 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Some(egui::IconData {
        rgba: pixmap.take(),
        width: size.width(),
        height: size.height(),
    })
}
