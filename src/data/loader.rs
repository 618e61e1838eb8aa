use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMicrosecondType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{DashboardError, SourceWarning};
use super::model::{Observation, Parameter, WaterQualityDataset};

/// Column every site file must carry.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Suffix stripped from a file stem to obtain the site identifier.
pub const SITE_SUFFIX: &str = "_joined";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One per-site file and the site identifier its rows are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteSource {
    pub path: PathBuf,
    pub site: String,
}

impl SiteSource {
    /// Derive the site from the file name: `Tully_river_euramo_joined.csv` → `Tully_river_euramo`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let site = site_name(&path);
        SiteSource { path, site }
    }
}

fn site_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(SITE_SUFFIX) {
        Some(site) if !site.is_empty() => site.to_string(),
        _ if !stem.is_empty() => stem,
        _ => path.display().to_string(),
    }
}

/// The fixed fallback list of site files under `data_dir`.
pub fn default_sources(data_dir: &Path, file_names: &[String]) -> Vec<SiteSource> {
    file_names
        .iter()
        .map(|name| SiteSource::from_path(data_dir.join(name)))
        .collect()
}

/// Every `*_joined.{csv,parquet,pq}` file in `dir`, sorted by path.
pub fn discover_sources(dir: &Path) -> Result<Vec<SiteSource>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing data directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("reading directory entry")?.path();
        if !path.is_file() || !is_supported_extension(&path) {
            continue;
        }
        let is_site_file = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with(SITE_SUFFIX));
        if is_site_file {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths.into_iter().map(SiteSource::from_path).collect())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn is_supported_extension(path: &Path) -> bool {
    matches!(extension(path).as_str(), "csv" | "parquet" | "pq")
}

// ---------------------------------------------------------------------------
// Unified load
// ---------------------------------------------------------------------------

/// Result of a load: the unified dataset and the sources that were skipped.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub dataset: WaterQualityDataset,
    pub warnings: Vec<SourceWarning>,
    pub sources_loaded: usize,
}

/// Read every source, tag rows with their site and concatenate them.
///
/// Missing or unparseable sources are logged and skipped. The load only fails
/// when no source at all could be read.
pub fn load_sources(sources: &[SiteSource]) -> Result<LoadReport, DashboardError> {
    let mut observations = Vec::new();
    let mut warnings = Vec::new();
    let mut sources_loaded = 0;

    for source in sources {
        if !source.path.exists() {
            let warning = SourceWarning::Missing {
                path: source.path.clone(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            continue;
        }

        match load_site_file(&source.path, &source.site) {
            Ok(rows) => {
                log::info!(
                    "Loaded {} rows for site '{}' from {}",
                    rows.len(),
                    source.site,
                    source.path.display()
                );
                observations.extend(rows);
                sources_loaded += 1;
            }
            Err(e) => {
                let warning = SourceWarning::Unreadable {
                    path: source.path.clone(),
                    reason: format!("{e:#}"),
                };
                log::warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    if sources_loaded == 0 {
        log::error!("No readable data sources among {} attempted", sources.len());
        return Err(DashboardError::AllSourcesUnreadable {
            attempted: sources.len(),
        });
    }

    let dataset = WaterQualityDataset::from_observations(observations);
    log::info!(
        "Unified dataset: {} rows from {} sites ({} sources skipped)",
        dataset.len(),
        dataset.sites.len(),
        warnings.len()
    );

    Ok(LoadReport {
        dataset,
        warnings,
        sources_loaded,
    })
}

/// Load one site file, dispatching by extension.
///
/// Supported formats:
/// * `.csv`             – header row with `Timestamp` and parameter columns
/// * `.parquet` / `.pq` – `Timestamp` column (timestamp, date or string) plus numeric columns
pub fn load_site_file(path: &Path, site: &str) -> Result<Vec<Observation>> {
    match extension(path).as_str() {
        "csv" => load_csv(path, site),
        "parquet" | "pq" => load_parquet(path, site),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a `Timestamp` cell. `YYYY-MM-DD HH:MM:SS` is the usual layout; `T`
/// separators, minute precision, RFC 3339 offsets and bare dates are accepted too.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        bail!("empty timestamp");
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Some(ts) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }
    bail!("'{s}' is not a recognised timestamp")
}

/// Empty, unparseable and non-finite cells are "no value".
fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, site: &str) -> Result<Vec<Observation>> {
    // Short rows are allowed; their trailing cells read as missing values.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .context("CSV missing 'Timestamp' column")?;

    // Parameter columns absent from the header stay `None` for every row.
    let value_columns: Vec<(Parameter, usize)> = Parameter::ALL
        .into_iter()
        .filter_map(|p| {
            headers
                .iter()
                .position(|h| h == p.column_name())
                .map(|idx| (p, idx))
        })
        .collect();

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;

        let timestamp = parse_timestamp(record.get(ts_idx).unwrap_or(""))
            .with_context(|| format!("CSV row {}: bad Timestamp", row_no + 1))?;

        let mut obs = Observation::empty(timestamp, site);
        for &(parameter, idx) in &value_columns {
            obs.set_value(parameter, record.get(idx).and_then(parse_value));
        }
        observations.push(obs);
    }

    Ok(observations)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path, site: &str) -> Result<Vec<Observation>> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let ts_idx = schema
            .index_of(TIMESTAMP_COLUMN)
            .map_err(|_| anyhow!("Parquet file missing 'Timestamp' column"))?;
        let timestamps =
            timestamp_values(batch.column(ts_idx)).context("reading 'Timestamp' column")?;

        let mut rows: Vec<Observation> = timestamps
            .into_iter()
            .map(|ts| Observation::empty(ts, site))
            .collect();

        for parameter in Parameter::ALL {
            let Ok(idx) = schema.index_of(parameter.column_name()) else {
                continue;
            };
            let values = float_values(batch.column(idx))
                .with_context(|| format!("reading '{parameter}' column"))?;
            for (obs, value) in rows.iter_mut().zip(values) {
                obs.set_value(parameter, value);
            }
        }

        observations.extend(rows);
    }

    Ok(observations)
}

// -- Arrow helpers --

fn timestamp_values(col: &ArrayRef) -> Result<Vec<NaiveDateTime>> {
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let strings = cast(col.as_ref(), &DataType::Utf8).context("casting to Utf8")?;
            let strings = strings.as_string::<i32>();
            (0..strings.len())
                .map(|row| {
                    if strings.is_null(row) {
                        bail!("row {row}: null timestamp");
                    }
                    parse_timestamp(strings.value(row)).with_context(|| format!("row {row}"))
                })
                .collect()
        }
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            let micros = cast(
                col.as_ref(),
                &DataType::Timestamp(TimeUnit::Microsecond, None),
            )
            .context("casting to microsecond timestamps")?;
            let micros = micros.as_primitive::<TimestampMicrosecondType>();
            (0..micros.len())
                .map(|row| {
                    if micros.is_null(row) {
                        bail!("row {row}: null timestamp");
                    }
                    micros
                        .value_as_datetime(row)
                        .with_context(|| format!("row {row}: timestamp out of range"))
                })
                .collect()
        }
        other => bail!("Expected timestamp, date or string column, got {other:?}"),
    }
}

fn float_values(col: &ArrayRef) -> Result<Vec<Option<f64>>> {
    let floats = cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("cannot read {:?} as Float64", col.data_type()))?;
    let floats = floats.as_primitive::<Float64Type>();
    Ok(floats
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    const HEADER: &str = "Timestamp,Conductivity,NO3,Temp,Turbidity,Level";

    fn write_csv(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn site_name_strips_joined_suffix() {
        let src = SiteSource::from_path("/data/Tully_river_euramo_joined.csv");
        assert_eq!(src.site, "Tully_river_euramo");

        let src = SiteSource::from_path("plain_site.csv");
        assert_eq!(src.site, "plain_site");

        let src = SiteSource::from_path("_joined.csv");
        assert_eq!(src.site, "_joined");
    }

    #[test]
    fn default_sources_join_data_dir() {
        let names = vec!["a_joined.csv".to_string(), "b_joined.csv".to_string()];
        let sources = default_sources(Path::new("data"), &names);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].path, Path::new("data").join("a_joined.csv"));
        assert_eq!(sources[1].site, "b");
    }

    #[test]
    fn parses_supported_timestamp_layouts() {
        assert_eq!(parse_timestamp("2024-03-05 06:00:00").unwrap(), ts(5, 6));
        assert_eq!(parse_timestamp("2024-03-05T06:00:00").unwrap(), ts(5, 6));
        assert_eq!(parse_timestamp("2024-03-05 06:00").unwrap(), ts(5, 6));
        assert_eq!(parse_timestamp("2024-03-05").unwrap(), ts(5, 0));
        assert_eq!(parse_timestamp("2024-03-05T16:00:00+10:00").unwrap(), ts(5, 6));
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("05/03/2024").is_err());
    }

    #[test]
    fn csv_blank_and_garbage_cells_are_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "a_joined.csv",
            &format!("{HEADER}\n2024-03-01 00:00:00,120.5,,21.0,n/a,NaN\n"),
        );
        let rows = load_site_file(&path, "a").unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.site, "a");
        assert_eq!(row.conductivity, Some(120.5));
        assert_eq!(row.no3, None);
        assert_eq!(row.temp, Some(21.0));
        assert_eq!(row.turbidity, None);
        assert_eq!(row.level, None);
    }

    #[test]
    fn csv_short_rows_load_with_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "a_joined.csv",
            &format!(
                "{HEADER}\n2024-03-01 00:00:00,1,2,3,4,5\n2024-03-01 01:00:00,6,7,8\n2024-03-01 02:00:00,9,10,11,12,13\n"
            ),
        );
        let rows = load_site_file(&path, "a").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].conductivity, Some(6.0));
        assert_eq!(rows[1].temp, Some(8.0));
        assert_eq!(rows[1].turbidity, None);
        assert_eq!(rows[1].level, None);
        assert_eq!(rows[2].level, Some(13.0));
    }

    #[test]
    fn csv_ignores_unknown_columns_and_tolerates_absent_parameters() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "a_joined.csv",
            "Station,Timestamp,Temp\nX1,2024-03-01 00:00:00,19.5\n",
        );
        let rows = load_site_file(&path, "a").unwrap();
        assert_eq!(rows[0].temp, Some(19.5));
        assert_eq!(rows[0].conductivity, None);
    }

    #[test]
    fn csv_without_timestamp_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "a_joined.csv", "Date,Temp\n2024-03-01,1\n");
        let err = load_site_file(&path, "a").unwrap_err();
        assert!(format!("{err:#}").contains("Timestamp"));
    }

    #[test]
    fn load_skips_missing_and_unreadable_sources() {
        let dir = TempDir::new().unwrap();
        let a = write_csv(
            &dir,
            "a_joined.csv",
            &format!(
                "{HEADER}\n2024-03-01 00:00:00,1,,,,\n2024-03-02 00:00:00,2,,,,\n2024-03-03 00:00:00,3,,,,\n"
            ),
        );
        let b = write_csv(
            &dir,
            "b_joined.csv",
            &format!("{HEADER}\n2024-03-01 00:00:00,,,,,\n2024-03-02 00:00:00,,,,,\n"),
        );
        let bad = write_csv(&dir, "bad_joined.csv", &format!("{HEADER}\nyesterday,1,,,,\n"));
        let missing = dir.path().join("gone_joined.csv");

        let sources: Vec<SiteSource> = [a, missing.clone(), b, bad.clone()]
            .into_iter()
            .map(SiteSource::from_path)
            .collect();
        let report = load_sources(&sources).unwrap();

        assert_eq!(report.dataset.len(), 5);
        assert_eq!(report.sources_loaded, 2);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0], SourceWarning::Missing { path: missing });
        assert!(matches!(
            &report.warnings[1],
            SourceWarning::Unreadable { path, .. } if *path == bad
        ));
        assert_eq!(
            report.dataset.sites.iter().cloned().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string()]
        );
        // Concatenation order follows source order.
        assert_eq!(report.dataset.observations[0].site, "a");
        assert_eq!(report.dataset.observations[3].site, "b");
    }

    #[test]
    fn load_fails_when_no_source_is_readable() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            SiteSource::from_path(dir.path().join("x_joined.csv")),
            SiteSource::from_path(dir.path().join("y_joined.csv")),
        ];
        let err = load_sources(&sources).unwrap_err();
        assert_eq!(err, DashboardError::AllSourcesUnreadable { attempted: 2 });

        assert!(matches!(
            load_sources(&[]),
            Err(DashboardError::AllSourcesUnreadable { attempted: 0 })
        ));
    }

    #[test]
    fn header_only_file_counts_as_loaded() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "a_joined.csv", &format!("{HEADER}\n"));
        let report = load_sources(&[SiteSource::from_path(path)]).unwrap();
        assert!(report.dataset.is_empty());
        assert_eq!(report.sources_loaded, 1);
    }

    #[test]
    fn discover_lists_only_site_files_sorted() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "b_joined.csv", HEADER);
        write_csv(&dir, "a_joined.CSV", HEADER);
        write_csv(&dir, "notes.txt", "hello");
        write_csv(&dir, "summary.csv", HEADER);

        let sources = discover_sources(dir.path()).unwrap();
        let sites: Vec<&str> = sources.iter().map(|s| s.site.as_str()).collect();
        assert_eq!(sites, vec!["a", "b"]);
    }

    #[test]
    fn parquet_site_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c_joined.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(
                "Timestamp",
                DataType::Timestamp(TimeUnit::Second, None),
                false,
            ),
            Field::new("Temp", DataType::Float64, true),
            Field::new("Label", DataType::Utf8, true),
        ]));
        let t0 = ts(1, 0).and_utc().timestamp();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(TimestampSecondArray::from(vec![t0, t0 + 3600])),
                Arc::new(Float64Array::from(vec![Some(22.5), None])),
                Arc::new(StringArray::from(vec!["x", "y"])),
            ],
        )
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_site_file(&path, "c").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, ts(1, 0));
        assert_eq!(rows[1].timestamp, ts(1, 1));
        assert_eq!(rows[0].temp, Some(22.5));
        assert_eq!(rows[1].temp, None);
        assert_eq!(rows[0].level, None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "a_joined.xlsx", "");
        assert!(load_site_file(&path, "a").is_err());
    }
}
