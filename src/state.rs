use std::sync::Arc;

use crate::color::SiteColors;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::loader::{LoadReport, SiteSource};
use crate::data::model::Parameter;
use crate::data::view::{render, DashboardView, Selection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized loads, keyed by source list.
    cache: DatasetCache,

    /// Sources behind the current dataset.
    pub sources: Vec<SiteSource>,

    /// Loaded dataset and skipped-source warnings (None until a load succeeds).
    pub report: Option<Arc<LoadReport>>,

    /// Current parameter / site selection.
    pub selection: Selection,

    /// View computed from `selection` (cached until the selection changes).
    pub view: Option<DashboardView>,

    /// Colour per site.
    pub colors: SiteColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let parameter = config
            .default_parameter
            .parse::<Parameter>()
            .unwrap_or_else(|e| {
                log::warn!("{e}, starting with Conductivity");
                Parameter::Conductivity
            });
        let selection = Selection {
            window_days: config.window_days,
            sites: Vec::new(),
            parameter,
        };
        Self {
            config,
            cache: DatasetCache::new(),
            sources: Vec::new(),
            report: None,
            selection,
            view: None,
            colors: SiteColors::default(),
            status_message: None,
        }
    }

    /// Load (or fetch from cache) the given sources and reset the selection.
    pub fn load_sources(&mut self, sources: Vec<SiteSource>) {
        self.sources = sources;
        match self.cache.get_or_load(&self.sources) {
            Ok(report) => self.set_report(report),
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.report = None;
                self.view = None;
                self.colors = SiteColors::default();
                self.selection.sites.clear();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop cached loads and re-read the current sources from disk.
    pub fn reload(&mut self) {
        self.cache.clear();
        let sources = self.sources.clone();
        self.load_sources(sources);
    }

    /// Ingest a loaded dataset: colours, default site selection, view.
    fn set_report(&mut self, report: Arc<LoadReport>) {
        let sites = &report.dataset.sites;
        self.colors = SiteColors::new(sites);
        self.selection.sites = sites
            .iter()
            .take(self.config.default_site_count)
            .cloned()
            .collect();
        self.report = Some(report);
        self.status_message = None;
        self.refresh();
    }

    /// Sorted site identifiers of the loaded dataset.
    pub fn all_sites(&self) -> Vec<String> {
        self.report
            .as_ref()
            .map(|r| r.dataset.sites.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Recompute `view` after a selection change.
    pub fn refresh(&mut self) {
        let Some(report) = &self.report else {
            self.view = None;
            return;
        };
        match render(&report.dataset, &self.selection) {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Cannot render dashboard: {e}");
                self.view = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_parameter(&mut self, parameter: Parameter) {
        if self.selection.parameter != parameter {
            self.selection.parameter = parameter;
            self.refresh();
        }
    }

    /// Toggle a single site; the selection stays in sorted order.
    pub fn toggle_site(&mut self, site: &str) {
        let sites = &mut self.selection.sites;
        if let Some(pos) = sites.iter().position(|s| s == site) {
            sites.remove(pos);
        } else {
            sites.push(site.to_string());
            sites.sort();
        }
        self.refresh();
    }

    pub fn select_all_sites(&mut self) {
        self.selection.sites = self.all_sites();
        self.refresh();
    }

    pub fn select_no_sites(&mut self) {
        self.selection.sites.clear();
        self.refresh();
    }
}
