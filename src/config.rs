use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::data::loader::{default_sources, SiteSource};

/// Config file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "water-quality-dashboard.json";

/// The ten monitoring sites shipped with the dashboard.
pub const DEFAULT_SITE_FILES: [&str; 10] = [
    "Johnstone_river_coquette_point_joined.csv",
    "Johnstone_river_innisfail_joined.csv",
    "Mulgrave_river_deeral_joined.csv",
    "Pioneer_Dumbleton_joined.csv",
    "Plane_ck_sucrogen_joined.csv",
    "Proserpine_river_glen_isla_joined.csv",
    "russell_river_east_russell_joined.csv",
    "sandy_ck_homebush_joined.csv",
    "sandy_ck_sorbellos_road_joined.csv",
    "Tully_river_euramo_joined.csv",
];

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Startup settings.  Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the per-site files.
    pub data_dir: PathBuf,
    /// File names (relative to `data_dir`) loaded at startup.
    pub site_files: Vec<String>,
    /// Length of the trailing window, in days.
    pub window_days: i64,
    /// How many sites (in sorted order) are selected initially.
    pub default_site_count: usize,
    /// Parameter column shown at startup.
    pub default_parameter: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            site_files: DEFAULT_SITE_FILES.iter().map(|s| s.to_string()).collect(),
            window_days: 30,
            default_site_count: 3,
            default_parameter: "Conductivity".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        ensure!(
            config.window_days > 0,
            "window_days must be positive, got {} in {}",
            config.window_days,
            path.display()
        );
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Site sources named by this config.
    pub fn sources(&self) -> Vec<SiteSource> {
        default_sources(&self.data_dir, &self.site_files)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.window_days, 30);
        assert_eq!(config.sources().len(), 10);
        assert_eq!(config.sources()[0].site, "Johnstone_river_coquette_point");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "data_dir": "/srv/wq", "window_days": 7 }"#).unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/wq"));
        assert_eq!(config.window_days, 7);
        assert_eq!(config.default_site_count, 3);
        assert_eq!(config.site_files.len(), 10);
        assert_eq!(config.default_parameter, "Conductivity");
    }

    #[test]
    fn non_positive_window_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        for days in ["0", "-5"] {
            std::fs::write(&path, format!(r#"{{ "window_days": {days} }}"#)).unwrap();
            let err = DashboardConfig::load(&path).unwrap_err();
            assert!(format!("{err:#}").contains("window_days"));
        }
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ window_days: ").unwrap();
        assert!(DashboardConfig::load(&path).is_err());
    }
}
