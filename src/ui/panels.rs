use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::discover_sources;
use crate::data::model::Parameter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("💧 Water Quality");
    ui.label(format!(
        "Multi-site monitoring data for the last {} days.",
        state.selection.window_days
    ));
    ui.separator();

    // ---- Parameter selector ----
    ui.strong("Parameter");
    let current = state.selection.parameter;
    let mut picked = current;
    egui::ComboBox::from_id_salt("parameter")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for p in Parameter::ALL {
                ui.selectable_value(&mut picked, p, p.to_string());
            }
        });
    if picked != current {
        state.set_parameter(picked);
    }
    ui.separator();

    let sites = state.all_sites();
    if sites.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Site selector ----
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Sites  ({}/{})", state.selection.sites.len(), sites.len()));
        if ui.small_button("All").clicked() {
            state.select_all_sites();
        }
        if ui.small_button("None").clicked() {
            state.select_no_sites();
        }
    });

    let mut toggled: Option<String> = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() * 0.7)
        .show(ui, |ui: &mut Ui| {
            for site in &sites {
                let mut checked = state.selection.sites.contains(site);
                let text = RichText::new(site).color(state.colors.color_for(site));
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(site.clone());
                }
            }
        });
    if let Some(site) = toggled {
        state.toggle_site(&site);
    }

    // ---- Skipped sources ----
    let warnings = state
        .report
        .as_ref()
        .map(|r| r.warnings.clone())
        .unwrap_or_default();
    if !warnings.is_empty() {
        ui.separator();
        egui::CollapsingHeader::new(
            RichText::new(format!("⚠ {} sources skipped", warnings.len())).color(Color32::YELLOW),
        )
        .id_salt("skipped_sources")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for warning in &warnings {
                ui.label(RichText::new(warning.to_string()).small())
                    .on_hover_text(warning.path().display().to_string());
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            let in_window = state.view.as_ref().map_or(0, |v| v.window_rows);
            ui.label(format!(
                "{} rows from {} sites, {} in window",
                report.dataset.len(),
                report.dataset.sites.len(),
                in_window
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Open water-quality data folder")
        .pick_folder()
    else {
        return;
    };

    match discover_sources(&dir) {
        Ok(sources) if sources.is_empty() => {
            log::warn!("No *_joined site files in {}", dir.display());
            state.status_message =
                Some(format!("No *_joined site files found in {}", dir.display()));
        }
        Ok(sources) => {
            log::info!("Found {} site files in {}", sources.len(), dir.display());
            state.load_sources(sources);
        }
        Err(e) => {
            log::error!("Failed to scan folder: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
