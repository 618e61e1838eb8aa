use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::DashboardError;
use super::loader::{load_sources, LoadReport, SiteSource};

/// Memoizes [`load_sources`] per exact, ordered list of source paths.
///
/// Source files are treated as static for the life of the process, so an
/// entry is only dropped by [`DatasetCache::clear`].  Failed loads are not
/// stored.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<Vec<PathBuf>, Arc<LoadReport>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached report for `sources`, loading it on first access.
    pub fn get_or_load(
        &mut self,
        sources: &[SiteSource],
    ) -> Result<Arc<LoadReport>, DashboardError> {
        let key: Vec<PathBuf> = sources.iter().map(|s| s.path.clone()).collect();
        if let Some(report) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {} sources", key.len());
            return Ok(Arc::clone(report));
        }

        let report = Arc::new(load_sources(sources)?);
        self.entries.insert(key, Arc::clone(&report));
        Ok(report)
    }

    /// Forget every cached load so the next access re-reads the files.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
