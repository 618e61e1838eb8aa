use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{metrics, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WaterQualityApp {
    pub state: AppState,
}

impl WaterQualityApp {
    /// Create the app and load the configured site files.
    pub fn new(config: DashboardConfig) -> Self {
        let sources = config.sources();
        let mut state = AppState::new(config);
        state.load_sources(sources);
        Self { state }
    }
}

impl eframe::App for WaterQualityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: parameter + site selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: per-site averages ----
        egui::TopBottomPanel::bottom("metrics_panel")
            .resizable(true)
            .default_height(200.0)
            .show(ctx, |ui| {
                metrics::metrics_table(ui, &self.state);
            });

        // ---- Central panel: trend chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::trend_plot(ui, &self.state);
        });
    }
}
