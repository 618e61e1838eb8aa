/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  <site>_joined.csv / .parquet  (one per site)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files, tag rows with site → WaterQualityDataset
///   └──────────┘   (memoized by cache)
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  trailing window + site selection → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  chart series + per-site mean
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  render(selection) → DashboardView
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
