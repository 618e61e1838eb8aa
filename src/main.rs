mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::WaterQualityApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
        log::error!("Ignoring config: {e:#}");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Water Quality Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(WaterQualityApp::new(config)))),
    )
}
