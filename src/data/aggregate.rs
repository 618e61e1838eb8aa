use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::model::{Parameter, WaterQualityDataset};

/// Average of one parameter at one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMean {
    pub site: String,
    /// `None` when the site has no non-null values in the filtered rows.
    pub mean: Option<f64>,
    /// Number of values that went into the mean.
    pub count: usize,
}

/// One chart sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub site: String,
}

/// Per-site arithmetic mean of `parameter` over the rows in `indices`.
///
/// One entry per selected site, in selection order.  Null values are left
/// out of both the sum and the count.
pub fn mean_by_site(
    dataset: &WaterQualityDataset,
    indices: &[usize],
    selected_sites: &[String],
    parameter: Parameter,
) -> Vec<SiteMean> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let obs = &dataset.observations[i];
        if let Some(v) = obs.value(parameter) {
            let entry = sums.entry(obs.site.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }

    selected_sites
        .iter()
        .map(|site| {
            let (sum, count) = sums.get(site.as_str()).copied().unwrap_or((0.0, 0));
            SiteMean {
                site: site.clone(),
                mean: (count > 0).then(|| sum / count as f64),
                count,
            }
        })
        .collect()
}

/// Time-ordered `(timestamp, value, site)` triples for the rows in `indices`.
/// Ties on timestamp are ordered by site, then by original row order.
pub fn series(
    dataset: &WaterQualityDataset,
    indices: &[usize],
    parameter: Parameter,
) -> Vec<SeriesPoint> {
    let mut ordered = indices.to_vec();
    ordered.sort_by(|&a, &b| {
        let (oa, ob) = (&dataset.observations[a], &dataset.observations[b]);
        oa.timestamp
            .cmp(&ob.timestamp)
            .then_with(|| oa.site.cmp(&ob.site))
            .then(a.cmp(&b))
    });

    ordered
        .into_iter()
        .map(|i| {
            let obs = &dataset.observations[i];
            SeriesPoint {
                timestamp: obs.timestamp,
                value: obs.value(parameter),
                site: obs.site.clone(),
            }
        })
        .collect()
}
