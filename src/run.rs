//! Completed runs: identity, metadata and the tabular time series.
//!
//! Column names and metadata keys are part of the contract with downstream
//! consumers of the output files and must not change.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::driver::SimulationOutcome;
use crate::params::REACTION_NAME;
use crate::state::{SimulationRecord, StopReason};

/// Unique identifier for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata document written alongside each time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    /// Run identifier.
    pub simulation_id: RunId,
    /// Name of the simulated reaction.
    pub reaction_name: String,
    /// Effective activation energy (J/mol).
    ///
    /// Written as a string; existing consumers parse it that way.
    #[serde(rename = "activation_energy (J/mol)", with = "float_as_string")]
    pub activation_energy: f64,
    /// Initial reactant A concentration.
    #[serde(rename = "CA0_(mol/m^3)")]
    pub ca0: f64,
    /// Initial reactant B concentration.
    #[serde(rename = "CB0_(mol/m^3)")]
    pub cb0: f64,
    /// Initial temperature.
    #[serde(rename = "T0_(K)")]
    pub t0: f64,
    /// When the run was assembled.
    pub date_run: DateTime<Utc>,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Elapsed simulated time at stop.
    #[serde(rename = "stop_time_(s)")]
    pub stop_time: f64,
}

/// One row of the output time series.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "CA (mol/m^3)")]
    pub ca: f64,
    #[serde(rename = "CB (mol/m^3)")]
    pub cb: f64,
    #[serde(rename = "CC (mol/m^3)")]
    pub cc: f64,
    #[serde(rename = "CD (mol/m^3)")]
    pub cd: f64,
    #[serde(rename = "T (K)")]
    pub temperature: f64,
    #[serde(rename = "Tsensor (K)")]
    pub sensor_temperature: f64,
    #[serde(rename = "t (sec)")]
    pub elapsed: f64,
    #[serde(rename = "SimulationID")]
    pub simulation_id: RunId,
}

impl TimeSeriesRow {
    fn from_record(record: &SimulationRecord, simulation_id: RunId) -> Self {
        Self {
            ca: record.state.ca,
            cb: record.state.cb,
            cc: record.state.cc,
            cd: record.state.cd,
            temperature: record.state.temperature,
            sensor_temperature: record.sensor.temperature,
            elapsed: record.elapsed,
            simulation_id,
        }
    }
}

/// A finished run with its identity attached, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRun {
    metadata: SimulationMetadata,
    history: Vec<SimulationRecord>,
}

impl CompletedRun {
    /// Assemble a run with a fresh id, stamped now.
    #[must_use]
    pub fn new(outcome: SimulationOutcome) -> Self {
        Self::with_identity(outcome, RunId::new(), Utc::now())
    }

    /// Assemble a run with an explicit id and timestamp.
    #[must_use]
    pub fn with_identity(outcome: SimulationOutcome, id: RunId, created_at: DateTime<Utc>) -> Self {
        let metadata = SimulationMetadata {
            simulation_id: id,
            reaction_name: REACTION_NAME.to_string(),
            activation_energy: outcome.activation_energy,
            ca0: outcome.initial_state.ca,
            cb0: outcome.initial_state.cb,
            t0: outcome.initial_state.temperature,
            date_run: created_at,
            stop_reason: outcome.stop_reason,
            stop_time: outcome.elapsed,
        };
        Self {
            metadata,
            history: outcome.history,
        }
    }

    /// The run id.
    #[must_use]
    pub const fn id(&self) -> RunId {
        self.metadata.simulation_id
    }

    /// The metadata document.
    #[must_use]
    pub const fn metadata(&self) -> &SimulationMetadata {
        &self.metadata
    }

    /// The frozen history.
    #[must_use]
    pub fn history(&self) -> &[SimulationRecord] {
        &self.history
    }

    /// Time-series rows, each tagged with the run id.
    pub fn rows(&self) -> impl Iterator<Item = TimeSeriesRow> + '_ {
        let id = self.id();
        self.history.iter().map(move |r| TimeSeriesRow::from_record(r, id))
    }

    /// File name of the time series.
    #[must_use]
    pub fn results_file_name(&self) -> String {
        format!("results_{}.csv", self.id())
    }

    /// File name of the metadata document.
    #[must_use]
    pub fn metadata_file_name(&self) -> String {
        format!("metadata_{}.json", self.id())
    }
}

/// Floats as strings in float notation: `45380.0`, not `45380`.
mod float_as_string {
    use super::{Deserialize, Deserializer, FromStr, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        // `Debug` keeps the fractional part on whole numbers.
        serializer.collect_str(&format_args!("{value:?}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        f64::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
