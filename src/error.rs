//! Error types for batchsim.
//!
//! All errors in batchsim are strongly typed using thiserror.
//! A simulation that ends in `numerical_error` or `runaway_reaction` is a
//! normal outcome, not an error: the types here cover invalid configuration
//! and failures of the persistence layer only.

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors raised while checking configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Step size must be positive and finite (got {value})")]
    InvalidStepSize {
        value: f64,
    },

    #[error("Parameter '{field}' must be positive and finite (got {value})")]
    NonPositiveParameter {
        field: String,
        value: f64,
    },

    #[error("Parameter '{field}' must be finite (got {value})")]
    NonFiniteParameter {
        field: String,
        value: f64,
    },

    #[error("Probability '{field}' must lie in [0.0, 1.0] (got {value})")]
    ProbabilityOutOfRange {
        field: String,
        value: f64,
    },

    #[error("Empty sampling range for '{field}': [{low}, {high})")]
    EmptyRange {
        field: String,
        low: f64,
        high: f64,
    },

    #[error("Invalid stop policy: {reason}")]
    InvalidStopPolicy {
        reason: String,
    },

    #[error("Invalid ensemble configuration: {reason}")]
    InvalidEnsemble {
        reason: String,
    },

    #[error("Failed to load configuration from {path:?}: {reason}")]
    ConfigLoad {
        path: Option<PathBuf>,
        reason: String,
    },
}

/// Errors raised by result sinks while persisting a completed run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV time series: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Result sink is unavailable: {message}")]
    Unavailable {
        message: String,
    },
}

impl PersistenceError {
    /// Wraps an I/O error together with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level error type for batchsim.
#[derive(Debug, Error)]
pub enum BatchSimError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl BatchSimError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a persistence error.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for batchsim operations.
pub type SimResult<T> = Result<T, BatchSimError>;
