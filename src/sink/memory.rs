//! In-memory sink.
//!
//! Intended for embedded usage and tests.

use std::sync::RwLock;

use crate::error::PersistenceError;
use crate::run::{CompletedRun, RunId};

use super::traits::{PersistedRun, ResultSink};

fn lock_err(context: &'static str) -> PersistenceError {
    PersistenceError::Unavailable {
        message: format!("poisoned lock: {context}"),
    }
}

/// Keeps completed runs in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    runs: RwLock<Vec<CompletedRun>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored runs.
    pub fn len(&self) -> Result<usize, PersistenceError> {
        Ok(self.runs.read().map_err(|_| lock_err("memory sink len"))?.len())
    }

    /// True if no run has been stored.
    pub fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.len()? == 0)
    }

    /// Look up a run by id.
    pub fn get(&self, id: RunId) -> Result<Option<CompletedRun>, PersistenceError> {
        let runs = self.runs.read().map_err(|_| lock_err("memory sink get"))?;
        Ok(runs.iter().find(|r| r.id() == id).cloned())
    }

    /// Snapshot of every stored run.
    pub fn runs(&self) -> Result<Vec<CompletedRun>, PersistenceError> {
        Ok(self.runs.read().map_err(|_| lock_err("memory sink runs"))?.clone())
    }
}

impl ResultSink for MemorySink {
    fn persist(&self, run: &CompletedRun) -> Result<PersistedRun, PersistenceError> {
        let mut runs = self.runs.write().map_err(|_| lock_err("memory sink persist"))?;
        runs.push(run.clone());
        Ok(PersistedRun::in_memory(run.id()))
    }
}
