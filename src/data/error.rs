use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Fatal pipeline errors
// ---------------------------------------------------------------------------

/// Errors that stop the dashboard pipeline from producing a view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Not a single source file could be read.
    #[error("none of the {attempted} data sources could be read")]
    AllSourcesUnreadable { attempted: usize },

    /// The unified dataset has no rows, so there is no latest timestamp to anchor a window.
    #[error("the dataset contains no observations")]
    EmptyDataset,

    /// A window length that is negative or too large to subtract from the latest timestamp.
    #[error("invalid window of {days} days")]
    InvalidWindow { days: i64 },

    /// A parameter name outside Conductivity / NO3 / Temp / Turbidity / Level.
    #[error("unknown water-quality parameter '{0}'")]
    UnknownParameter(String),
}

// ---------------------------------------------------------------------------
// Per-source warnings (non-fatal)
// ---------------------------------------------------------------------------

/// A source that was skipped while building the unified dataset.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceWarning {
    #[error("data file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("could not read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
}

impl SourceWarning {
    /// Path of the skipped source.
    pub fn path(&self) -> &PathBuf {
        match self {
            SourceWarning::Missing { path } | SourceWarning::Unreadable { path, .. } => path,
        }
    }
}
