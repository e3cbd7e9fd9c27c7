//! Reactor state, sensor readings and the per-step history record.
//!
//! The physical state and the thermocouple reading are kept as distinct
//! records. They meet only in [`SimulationRecord`], so the derivative and the
//! integrator operate on physical quantities alone.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical state of the batch reactor.
///
/// Concentrations are in mol/m^3, temperature in K. The same shape is used
/// for time derivatives (mol m^-3 s^-1 and K s^-1).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactorState {
    /// Reactant A (ethyl acetate).
    pub ca: f64,
    /// Reactant B (hydroxide).
    pub cb: f64,
    /// Product C (acetate).
    pub cc: f64,
    /// Product D (ethanol).
    pub cd: f64,
    /// Bulk liquid temperature.
    pub temperature: f64,
}

impl ReactorState {
    /// Fresh charge: reactants only, no products.
    #[must_use]
    pub const fn charge(ca0: f64, cb0: f64, t0: f64) -> Self {
        Self {
            ca: ca0,
            cb: cb0,
            cc: 0.0,
            cd: 0.0,
            temperature: t0,
        }
    }

    /// Components in canonical order `[CA, CB, CC, CD, T]`.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 5] {
        [self.ca, self.cb, self.cc, self.cd, self.temperature]
    }

    /// Inverse of [`to_array`](Self::to_array).
    #[must_use]
    pub const fn from_array(values: [f64; 5]) -> Self {
        let [ca, cb, cc, cd, temperature] = values;
        Self {
            ca,
            cb,
            cc,
            cd,
            temperature,
        }
    }

    /// True if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// A single noisy thermocouple reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorReading {
    /// Measured temperature (K).
    pub temperature: f64,
}

/// One entry of the run history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// True reactor state at `elapsed`.
    pub state: ReactorState,
    /// Sensor reading of `state.temperature`.
    pub sensor: SensorReading,
    /// Elapsed simulated time (s).
    pub elapsed: f64,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Reactant A stopped decreasing over the look-back window.
    SteadyState,
    /// Reactant A or B fell below its minimum threshold.
    FullConversion,
    /// The maximum simulated time was reached.
    TimeLimit,
    /// Reactant A became NaN or negative.
    NumericalError,
    /// Temperature magnitude left the plausible band.
    RunawayReaction,
}

impl StopReason {
    /// All reasons, in evaluation priority order.
    pub const ALL: [Self; 5] = [
        Self::SteadyState,
        Self::FullConversion,
        Self::TimeLimit,
        Self::NumericalError,
        Self::RunawayReaction,
    ];

    /// The snake_case name used in metadata documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SteadyState => "steady_state",
            Self::FullConversion => "full_conversion",
            Self::TimeLimit => "time_limit",
            Self::NumericalError => "numerical_error",
            Self::RunawayReaction => "runaway_reaction",
        }
    }

    /// True for outcomes that indicate the physics or numerics broke down.
    #[must_use]
    pub const fn is_abnormal(&self) -> bool {
        matches!(self, Self::NumericalError | Self::RunawayReaction)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
