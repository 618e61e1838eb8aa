use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Text shown for a site average. A missing mean is never shown as zero.
pub fn format_mean(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Per-site averages (bottom panel)
// ---------------------------------------------------------------------------

pub fn metrics_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };

    ui.heading(format!("📊 Average {} by site", view.parameter));
    ui.separator();

    if view.metrics.is_empty() {
        ui.label("No sites selected.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(220.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Site");
            });
            header.col(|ui| {
                ui.strong(format!("Mean {}", view.parameter));
            });
            header.col(|ui| {
                ui.strong("Values");
            });
        })
        .body(|mut body| {
            for metric in &view.metrics {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(
                            RichText::new(&metric.site).color(state.colors.color_for(&metric.site)),
                        );
                    });
                    row.col(|ui| {
                        let text = RichText::new(format_mean(metric.mean)).monospace();
                        if metric.mean.is_some() {
                            ui.label(text.strong());
                        } else {
                            ui.label(text.weak());
                        }
                    });
                    row.col(|ui| {
                        ui.label(metric.count.to_string());
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_mean_renders_as_not_available() {
        assert_eq!(format_mean(None), "N/A");
        assert_eq!(format_mean(Some(0.0)), "0.00");
        assert_eq!(format_mean(Some(12.346)), "12.35");
    }
}
