use mapmeasure::{run_map, MapConfig};

fn main() -> eframe::Result<()> {
    env_logger::init();
    run_map(MapConfig::default())
}
