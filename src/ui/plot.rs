use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::data::aggregate::SeriesPoint;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Trend plot (central panel)
// ---------------------------------------------------------------------------

fn to_plot_x(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn format_plot_x(x: f64, pattern: &str) -> String {
    DateTime::from_timestamp(x.round() as i64, 0)
        .map(|dt| dt.naive_utc().format(pattern).to_string())
        .unwrap_or_default()
}

/// Split a time-ordered series into per-site line segments, breaking each
/// site's line wherever it has a missing value.
fn site_segments(series: &[SeriesPoint]) -> BTreeMap<&str, Vec<Vec<[f64; 2]>>> {
    let mut segments: BTreeMap<&str, Vec<Vec<[f64; 2]>>> = BTreeMap::new();
    for point in series {
        let site = segments.entry(point.site.as_str()).or_default();
        match point.value {
            Some(value) => {
                if site.is_empty() {
                    site.push(Vec::new());
                }
                if let Some(open) = site.last_mut() {
                    open.push([to_plot_x(point.timestamp), value]);
                }
            }
            None => {
                if site.last().is_some_and(|open| !open.is_empty()) {
                    site.push(Vec::new());
                }
            }
        }
    }
    for site in segments.values_mut() {
        site.retain(|segment| !segment.is_empty());
    }
    segments.retain(|_, site| !site.is_empty());
    segments
}

/// Render the per-site trend lines for the selected parameter.
pub fn trend_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.report.is_some() {
                "Nothing to show for the current selection"
            } else {
                "No data loaded  (File → Open data folder…)"
            };
            ui.heading(hint);
        });
        return;
    };

    ui.heading(format!(
        "📈 {} trend (last {} days)",
        view.parameter, state.selection.window_days
    ));
    ui.separator();

    let lines = site_segments(&view.series);

    let parameter = view.parameter.to_string();
    Plot::new("trend_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label(parameter.clone())
        .x_axis_formatter(|mark, _range| format_plot_x(mark.value, "%m-%d"))
        .label_formatter(move |name, point| {
            let when = format_plot_x(point.x, "%Y-%m-%d %H:%M");
            if name.is_empty() {
                format!("{when}\n{parameter}: {:.2}", point.y)
            } else {
                format!("{name}\n{when}\n{parameter}: {:.2}", point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Segments of one site share a name, so the legend shows the site once.
            for (site, segments) in lines {
                let color = state.colors.color_for(site);
                for points in segments {
                    let line = Line::new(PlotPoints::from(points))
                        .name(site)
                        .color(color)
                        .width(1.5);
                    plot_ui.line(line);
                }
            }
        });
}
