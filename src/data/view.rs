use chrono::NaiveDateTime;

use super::aggregate::{mean_by_site, series, SeriesPoint, SiteMean};
use super::error::DashboardError;
use super::filter::{indices_since, site_indices, window_bounds};
use super::model::{Parameter, WaterQualityDataset};

/// What the user picked in the side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub window_days: i64,
    /// Selected site identifiers, in display order.
    pub sites: Vec<String>,
    pub parameter: Parameter,
}

/// Everything the chart and metric panels need for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub parameter: Parameter,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Rows inside the window, over all sites.
    pub window_rows: usize,
    pub series: Vec<SeriesPoint>,
    pub metrics: Vec<SiteMean>,
}

/// Compute the view for `selection`.  Pure: no I/O and no state between calls.
pub fn render(
    dataset: &WaterQualityDataset,
    selection: &Selection,
) -> Result<DashboardView, DashboardError> {
    let (window_start, window_end) = window_bounds(dataset, selection.window_days)?;
    let windowed = indices_since(dataset, window_start);
    let selected = site_indices(dataset, &windowed, &selection.sites);

    let view = DashboardView {
        parameter: selection.parameter,
        window_start,
        window_end,
        window_rows: windowed.len(),
        series: series(dataset, &selected, selection.parameter),
        metrics: mean_by_site(dataset, &selected, &selection.sites, selection.parameter),
    };
    log::debug!(
        "Rendered {} for {} sites: {} of {} windowed rows",
        selection.parameter,
        selection.sites.len(),
        view.series.len(),
        view.window_rows
    );
    Ok(view)
}
