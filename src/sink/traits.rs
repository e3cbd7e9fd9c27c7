//! Abstract sink trait.

use std::path::PathBuf;

use crate::error::PersistenceError;
use crate::run::{CompletedRun, RunId};

/// Where a run ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRun {
    /// Identifier of the persisted run.
    pub run_id: RunId,
    /// Time-series file, for file-backed sinks.
    pub results_path: Option<PathBuf>,
    /// Metadata file, for file-backed sinks.
    pub metadata_path: Option<PathBuf>,
}

impl PersistedRun {
    /// A run persisted somewhere without a filesystem location.
    #[must_use]
    pub const fn in_memory(run_id: RunId) -> Self {
        Self {
            run_id,
            results_path: None,
            metadata_path: None,
        }
    }
}

/// Persists completed runs.
///
/// Implementations must be safe to share between ensemble workers.
pub trait ResultSink: Send + Sync {
    /// Persist the time series and metadata of `run`.
    fn persist(&self, run: &CompletedRun) -> Result<PersistedRun, PersistenceError>;
}
