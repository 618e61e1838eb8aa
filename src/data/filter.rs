use chrono::{Duration, NaiveDateTime};

use super::error::DashboardError;
use super::model::WaterQualityDataset;

// ---------------------------------------------------------------------------
// Row predicates: time window and site selection
// ---------------------------------------------------------------------------

/// Lower bound of the trailing window: latest timestamp in the whole dataset
/// minus `days`.  Returns the `(start, end)` pair.
pub fn window_bounds(
    dataset: &WaterQualityDataset,
    days: i64,
) -> Result<(NaiveDateTime, NaiveDateTime), DashboardError> {
    let end = dataset.max_timestamp().ok_or(DashboardError::EmptyDataset)?;
    if days < 0 {
        return Err(DashboardError::InvalidWindow { days });
    }
    let start = Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or(DashboardError::InvalidWindow { days })?;
    Ok((start, end))
}

/// Indices of observations at or after `start`.
pub fn indices_since(dataset: &WaterQualityDataset, start: NaiveDateTime) -> Vec<usize> {
    dataset
        .observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| obs.timestamp >= start)
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of observations inside the trailing `days` window.
///
/// The window is anchored to the dataset-wide maximum, not per site, so a
/// site whose data stops early may have no rows at all.  The lower bound is
/// inclusive.
pub fn window_indices(
    dataset: &WaterQualityDataset,
    days: i64,
) -> Result<Vec<usize>, DashboardError> {
    let (start, _) = window_bounds(dataset, days)?;
    Ok(indices_since(dataset, start))
}

/// Keep only the indices whose site is in `selected_sites`.
/// An empty selection hides everything.
pub fn site_indices(
    dataset: &WaterQualityDataset,
    indices: &[usize],
    selected_sites: &[String],
) -> Vec<usize> {
    if selected_sites.is_empty() {
        return Vec::new();
    }
    indices
        .iter()
        .copied()
        .filter(|&i| selected_sites.contains(&dataset.observations[i].site))
        .collect()
}
