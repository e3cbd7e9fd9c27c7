//! Single-run orchestration.
//!
//! The driver samples a scenario, steps the reactor until a stop rule fires
//! and returns the full history. It performs no I/O; persistence is handed to
//! a [`ResultSink`](crate::sink::ResultSink) by the caller or by
//! [`SimulationDriver::run_and_persist`].

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, ValidationError};
use crate::integrator::Rk4;
use crate::kinetics::KineticModel;
use crate::params::PhysicalParameters;
use crate::random::RandomSource;
use crate::run::CompletedRun;
use crate::sampler::{ConditionSampler, InitialConditions, SamplingConfig};
use crate::sensor::SensorModel;
use crate::sink::ResultSink;
use crate::state::{ReactorState, SimulationRecord, StopReason};
use crate::stop::{StopEvaluator, StopPolicy};

/// When the stop rules look at the history relative to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTiming {
    /// Evaluate before recording the current state.
    ///
    /// The rules see the history one step behind the true state, so a bad
    /// state is recorded and stepped once more before the run stops.
    #[default]
    Lagged,
    /// Record the current state first, then evaluate.
    Current,
}

/// Per-run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Integration step (s).
    pub step_size: f64,
    /// Stop rules.
    pub stop_policy: StopPolicy,
    /// Scenario sampling.
    pub sampling: SamplingConfig,
    /// Thermocouple model.
    pub sensor: SensorModel,
    /// Stop-check ordering.
    pub stop_timing: StopTiming,
    /// Random or fixed initial charge.
    pub initial_conditions: InitialConditions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            step_size: 0.5,
            stop_policy: StopPolicy::default(),
            sampling: SamplingConfig::default(),
            sensor: SensorModel::default(),
            stop_timing: StopTiming::default(),
            initial_conditions: InitialConditions::default(),
        }
    }
}

impl RunConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ValidationError::InvalidStepSize {
                value: self.step_size,
            });
        }
        self.stop_policy.validate()?;
        self.sampling.validate()?;
        self.sensor.validate()?;
        self.initial_conditions.validate()?;
        Ok(())
    }

    /// Upper bound on the number of records a run can produce.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        (self.stop_policy.max_time / self.step_size).ceil() as usize + 2
    }
}

/// Result of one run, before an id is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Recorded states, in time order.
    pub history: Vec<SimulationRecord>,
    /// Elapsed simulated time when the run stopped (s).
    pub elapsed: f64,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Effective activation energy (J/mol).
    pub activation_energy: f64,
    /// Initial charge.
    pub initial_state: ReactorState,
}

/// Runs batch-reactor simulations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationDriver {
    params: PhysicalParameters,
    config: RunConfig,
    sampler: ConditionSampler,
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self {
            params: PhysicalParameters::default(),
            config: RunConfig::default(),
            sampler: ConditionSampler::default(),
        }
    }
}

impl SimulationDriver {
    /// Create a driver after validating its configuration.
    pub fn new(params: PhysicalParameters, config: RunConfig) -> Result<Self, ValidationError> {
        params.validate()?;
        config.validate()?;
        let sampler = ConditionSampler::new(config.sampling)?;
        Ok(Self {
            params,
            config,
            sampler,
        })
    }

    /// The physical constants.
    #[must_use]
    pub const fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one run.
    pub fn run<R: RandomSource + ?Sized>(&self, rng: &mut R) -> SimulationOutcome {
        let activation_energy = self
            .sampler
            .sample_activation_energy(self.params.activation_energy, rng);
        let initial_state = self.config.initial_conditions.resolve(&self.sampler, rng);

        log::debug!(
            "sampled CA0={:.3} CB0={:.3} T0={:.2} Ea={:.1}",
            initial_state.ca,
            initial_state.cb,
            initial_state.temperature,
            activation_energy
        );

        let model = KineticModel::with_activation_energy(self.params, activation_energy);
        let rk4 = Rk4::new(self.config.step_size);
        let h = rk4.step_size();
        let evaluator = StopEvaluator::new(
            self.config.stop_policy.thresholds_for(&initial_state),
            h,
        );
        let sensor = self.config.sensor;

        let mut history: Vec<SimulationRecord> = Vec::with_capacity(self.config.history_capacity());
        let mut state = initial_state;
        let mut steps: u64 = 0;
        let mut elapsed = 0.0;

        let stop_reason = loop {
            match self.config.stop_timing {
                StopTiming::Lagged => {
                    if let Some(reason) = evaluator.evaluate(&history, elapsed) {
                        break reason;
                    }
                    history.push(observe(&sensor, state, elapsed, rng));
                }
                StopTiming::Current => {
                    history.push(observe(&sensor, state, elapsed, rng));
                    if let Some(reason) = evaluator.evaluate(&history, elapsed) {
                        break reason;
                    }
                }
            }

            state = rk4.step(|s| model.derivative(s), &state);
            steps += 1;
            // Multiply rather than accumulate so elapsed times stay on the step grid.
            elapsed = steps as f64 * h;
        };

        log::info!(
            "run stopped: {stop_reason} at t={elapsed}s after {} records",
            history.len()
        );

        SimulationOutcome {
            history,
            elapsed,
            stop_reason,
            activation_energy,
            initial_state,
        }
    }

    /// Execute one run, attach an identity and hand it to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if persistence fails. The failure is also
    /// logged.
    pub fn run_and_persist<R, S>(&self, rng: &mut R, sink: &S) -> SimResult<CompletedRun>
    where
        R: RandomSource + ?Sized,
        S: ResultSink + ?Sized,
    {
        let completed = CompletedRun::new(self.run(rng));
        if let Err(err) = sink.persist(&completed) {
            log::warn!("failed to persist run {}: {err}", completed.id());
            return Err(err.into());
        }
        Ok(completed)
    }
}

fn observe<R: RandomSource + ?Sized>(
    sensor: &SensorModel,
    state: ReactorState,
    elapsed: f64,
    rng: &mut R,
) -> SimulationRecord {
    SimulationRecord {
        state,
        sensor: sensor.read(state.temperature, rng),
        elapsed,
    }
}
