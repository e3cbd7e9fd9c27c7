//! Top-level configuration document.
//!
//! Every section has a default reproducing the reference reactor, so an empty
//! JSON object `{}` is a complete configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::driver::{RunConfig, SimulationDriver};
use crate::error::ValidationError;
use crate::params::PhysicalParameters;
use crate::sink::FileSink;

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory of the output layout.
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physical constants.
    pub params: PhysicalParameters,
    /// Per-run settings.
    pub run: RunConfig,
    /// Output location.
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::ConfigLoad {
            path: None,
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let load_err = |reason: String| ValidationError::ConfigLoad {
            path: Some(path.to_path_buf()),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override the output base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.output.base_dir = base_dir.into();
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.params.validate()?;
        self.run.validate()?;
        Ok(())
    }

    /// Build a driver from this configuration.
    pub fn driver(&self) -> Result<SimulationDriver, ValidationError> {
        SimulationDriver::new(self.params, self.run)
    }

    /// Build a file sink rooted at the configured base directory.
    #[must_use]
    pub fn sink(&self) -> FileSink {
        FileSink::new(&self.output.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::StopTiming;
    use crate::sampler::InitialConditions;

    #[test]
    fn empty_document_is_default() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let json = r#"{
            "run": {
                "step_size": 0.25,
                "stop_timing": "current",
                "initial_conditions": { "mode": "fixed", "ca0": 800.0, "cb0": 900.0, "t0": 300.0 },
                "stop_policy": { "max_time": 600.0 }
            },
            "output": { "base_dir": "/tmp/out" }
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.run.step_size, 0.25);
        assert_eq!(config.run.stop_timing, StopTiming::Current);
        assert_eq!(
            config.run.initial_conditions,
            InitialConditions::Fixed {
                ca0: 800.0,
                cb0: 900.0,
                t0: 300.0
            }
        );
        assert_eq!(config.run.stop_policy.max_time, 600.0);
        assert_eq!(config.run.stop_policy.lookback_window, 15.0);
        assert_eq!(config.params, PhysicalParameters::default());
        assert_eq!(config.output.base_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SimulationConfig::from_json_str(r#"{"run": {"step_size": -1.0}}"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidStepSize { .. }));
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        let err = SimulationConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ValidationError::ConfigLoad { path: None, .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = SimulationConfig::from_json_file(&path).unwrap_err();
        match err {
            ValidationError::ConfigLoad { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = SimulationConfig::default().with_base_dir(dir.path());
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(SimulationConfig::from_json_file(&path).unwrap(), config);
        assert_eq!(config.sink().base_dir(), dir.path());
        config.driver().unwrap();
    }

    #[test]
    fn derived_floats_survive_json_exactly() {
        let config = SimulationConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back = SimulationConfig::from_json_str(&text).unwrap();
        assert_eq!(
            back.params.ua_per_volume.to_bits(),
            config.params.ua_per_volume.to_bits()
        );
    }
}
