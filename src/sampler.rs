//! Randomized scenario generation.
//!
//! Each run starts from a random charge of the two reactants at a random
//! temperature between 5 and 80 degC. Half of the runs are "catalyzed": their
//! activation energy is scaled down by a factor drawn from a 0.001-spaced grid
//! over [0.45, 0.75).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::random::RandomSource;
use crate::state::ReactorState;

/// Ranges and probabilities used by [`ConditionSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Upper bound (exclusive) of the uniform CA0/CB0 draw (mol/m^3).
    pub max_concentration: f64,
    /// Lowest initial temperature (K), inclusive.
    pub min_temperature: i64,
    /// Highest initial temperature (K), inclusive.
    pub max_temperature: i64,
    /// Probability that a run is catalyzed.
    pub catalysis_probability: f64,
    /// Smallest catalytic multiplier.
    pub multiplier_base: f64,
    /// Spacing of the catalytic multiplier grid.
    pub multiplier_step: f64,
    /// Number of grid points above `multiplier_base`.
    pub multiplier_steps: i64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_concentration: 1500.0,
            min_temperature: 278,
            max_temperature: 353,
            catalysis_probability: 0.5,
            multiplier_base: 0.45,
            multiplier_step: 0.001,
            multiplier_steps: 300,
        }
    }
}

impl SamplingConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.max_concentration.is_finite() && self.max_concentration > 0.0) {
            return Err(ValidationError::EmptyRange {
                field: "initial_concentration".to_string(),
                low: 0.0,
                high: self.max_concentration,
            });
        }
        if self.min_temperature <= 0 || self.max_temperature < self.min_temperature {
            return Err(ValidationError::EmptyRange {
                field: "initial_temperature".to_string(),
                low: self.min_temperature as f64,
                high: self.max_temperature as f64 + 1.0,
            });
        }
        if !(0.0..=1.0).contains(&self.catalysis_probability) {
            return Err(ValidationError::ProbabilityOutOfRange {
                field: "catalysis_probability".to_string(),
                value: self.catalysis_probability,
            });
        }
        if self.multiplier_steps <= 0 {
            return Err(ValidationError::EmptyRange {
                field: "catalytic_multiplier".to_string(),
                low: self.multiplier_base,
                high: self.multiplier_base,
            });
        }
        crate::params::positive("multiplier_base", self.multiplier_base)?;
        crate::params::positive("multiplier_step", self.multiplier_step)?;
        Ok(())
    }

    /// Half-open range `[low, high)` of catalytic multipliers.
    #[must_use]
    pub fn multiplier_range(&self) -> (f64, f64) {
        (
            self.multiplier_base,
            self.multiplier_base + self.multiplier_steps as f64 * self.multiplier_step,
        )
    }
}

/// Draws initial conditions and effective activation energies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConditionSampler {
    config: SamplingConfig,
}

impl ConditionSampler {
    /// Create a sampler after validating its configuration.
    ///
    /// Empty integer ranges would otherwise panic inside the random source.
    pub fn new(config: SamplingConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The sampler configuration.
    #[must_use]
    pub const fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Random charge: CA0, CB0 uniform in `[0, max)`, no products, integer T0.
    pub fn sample_initial_state<R: RandomSource + ?Sized>(&self, rng: &mut R) -> ReactorState {
        let ca0 = self.config.max_concentration * rng.uniform();
        let cb0 = self.config.max_concentration * rng.uniform();
        let t0 = rng.uniform_int(self.config.min_temperature, self.config.max_temperature + 1);
        ReactorState::charge(ca0, cb0, t0 as f64)
    }

    /// Effective activation energy for one run.
    ///
    /// Returns `base` unchanged unless the run is catalyzed, in which case
    /// `base` is scaled by a multiplier from [`SamplingConfig::multiplier_range`].
    pub fn sample_activation_energy<R: RandomSource + ?Sized>(&self, base: f64, rng: &mut R) -> f64 {
        if rng.uniform() < self.config.catalysis_probability {
            let u = rng.uniform_int(0, self.config.multiplier_steps);
            base * (self.config.multiplier_base + u as f64 * self.config.multiplier_step)
        } else {
            base
        }
    }
}

/// How a run obtains its initial charge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InitialConditions {
    /// Draw from the [`ConditionSampler`].
    #[default]
    Random,
    /// Use a fixed charge (products start at zero).
    Fixed {
        /// Initial reactant A (mol/m^3).
        ca0: f64,
        /// Initial reactant B (mol/m^3).
        cb0: f64,
        /// Initial temperature (K).
        t0: f64,
    },
}

impl InitialConditions {
    /// Produce the initial reactor state.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        sampler: &ConditionSampler,
        rng: &mut R,
    ) -> ReactorState {
        match *self {
            Self::Random => sampler.sample_initial_state(rng),
            Self::Fixed { ca0, cb0, t0 } => ReactorState::charge(ca0, cb0, t0),
        }
    }

    /// Validate a fixed charge.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Self::Fixed { ca0, cb0, t0 } = *self {
            for (field, value) in [("ca0", ca0), ("cb0", cb0)] {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(ValidationError::NonFiniteParameter {
                        field: field.to_string(),
                        value,
                    });
                }
            }
            crate::params::positive("t0", t0)?;
        }
        Ok(())
    }
}
