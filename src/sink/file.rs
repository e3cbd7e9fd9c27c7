//! Filesystem sink writing CSV time series and JSON metadata.
//!
//! Directories are opened up to mode 0o777 so that downstream jobs running as
//! other users can move files between them. Failing to change permissions is
//! logged and otherwise ignored.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::PersistenceError;
use crate::run::CompletedRun;

use super::traits::{PersistedRun, ResultSink};

/// Top-level directories maintained under the base directory.
pub const OUTPUT_DIRECTORIES: [&str; 4] = ["incoming", "processed", "archive", "failed"];

/// Writes runs to `<base>/incoming/<date>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
    base_dir: PathBuf,
}

impl FileSink {
    /// Create a sink rooted at `base_dir`. Nothing is created until
    /// [`prepare`](Self::prepare) or the first persist.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory receiving runs created on `date`.
    #[must_use]
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.base_dir.join("incoming").join(date.format("%Y-%m-%d").to_string())
    }

    /// Create the top-level directories if they do not exist.
    pub fn prepare(&self) -> Result<(), PersistenceError> {
        for name in OUTPUT_DIRECTORIES {
            ensure_dir(&self.base_dir.join(name))?;
        }
        Ok(())
    }
}

impl ResultSink for FileSink {
    fn persist(&self, run: &CompletedRun) -> Result<PersistedRun, PersistenceError> {
        self.prepare()?;

        let date = run.metadata().date_run.with_timezone(&Local).date_naive();
        let day_dir = self.day_dir(date);
        ensure_dir(&day_dir)?;

        let results_path = day_dir.join(run.results_file_name());
        write_results(run, &results_path)?;
        log::info!("simulation data saved at {}", results_path.display());

        let metadata_path = day_dir.join(run.metadata_file_name());
        write_metadata(run, &metadata_path)?;
        log::info!("metadata saved at {}", metadata_path.display());

        Ok(PersistedRun {
            run_id: run.id(),
            results_path: Some(results_path),
            metadata_path: Some(metadata_path),
        })
    }
}

fn write_results(run: &CompletedRun, path: &Path) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in run.rows() {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| PersistenceError::io(path, e))?;
    Ok(())
}

fn write_metadata(run: &CompletedRun, path: &Path) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec(run.metadata())?;
    fs::write(path, json).map_err(|e| PersistenceError::io(path, e))
}

fn ensure_dir(path: &Path) -> Result<(), PersistenceError> {
    fs::create_dir_all(path).map_err(|e| PersistenceError::io(path, e))?;
    open_permissions(path);
    Ok(())
}

#[cfg(unix)]
fn open_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o777)) {
        log::warn!("could not chmod {}: {e}", path.display());
    }
}

#[cfg(not(unix))]
fn open_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        sink.prepare().unwrap();
        for name in OUTPUT_DIRECTORIES {
            assert!(dir.path().join(name).is_dir(), "{name} missing");
        }
        // Idempotent.
        sink.prepare().unwrap();
    }

    #[test]
    fn day_dir_uses_iso_date() {
        let sink = FileSink::new("/data");
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(sink.day_dir(date), PathBuf::from("/data/incoming/2024-03-07"));
    }

    #[cfg(unix)]
    #[test]
    fn directories_are_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        FileSink::new(dir.path()).prepare().unwrap();
        let mode = fs::metadata(dir.path().join("incoming")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn unwritable_base_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let err = FileSink::new(&blocker).prepare().unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }
}
