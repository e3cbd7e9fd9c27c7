//! # batchsim - Batch Reactor Simulator
//!
//! batchsim generates synthetic time-series data from a jacketed batch reactor
//! running a second-order exothermic liquid-phase reaction (ethyl acetate
//! saponification). Each run samples an initial charge and an optional
//! catalyst, integrates the coupled mass and energy balances with RK4, and
//! stops on steady state, full conversion, a time limit, numerical failure or
//! thermal runaway.
//!
//! ## Core Concepts
//!
//! - **PhysicalParameters**: immutable reaction and vessel constants
//! - **KineticModel**: Arrhenius rate law and the five-component derivative
//! - **SimulationDriver**: samples a scenario and steps it to a stop reason
//! - **CompletedRun**: a run with its id, metadata and tabular rows
//! - **ResultSink**: where completed runs go (`FileSink`, `MemorySink`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use batchsim::{FileSink, SeededSource, SimulationDriver};
//!
//! let driver = SimulationDriver::default();
//! let mut rng = SeededSource::seeded(42);
//! let run = driver.run_and_persist(&mut rng, &FileSink::new("data"))?;
//! println!("{} stopped: {}", run.id(), run.metadata().stop_reason);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// Numerics
pub mod integrator;
pub mod kinetics;
pub mod params;
pub mod state;

// Scenario and run control
pub mod driver;
pub mod random;
pub mod sampler;
pub mod sensor;
pub mod stop;

// Results, persistence and orchestration
pub mod config;
pub mod ensemble;
pub mod error;
pub mod run;
pub mod sink;

pub use config::{OutputConfig, SimulationConfig};
pub use driver::{RunConfig, SimulationDriver, SimulationOutcome, StopTiming};
pub use ensemble::{run_ensemble, EnsembleConfig, EnsembleMember};
pub use error::{BatchSimError, PersistenceError, SimResult, ValidationError};
pub use integrator::{rk4_step, Rk4, StateVector};
pub use kinetics::KineticModel;
pub use params::{PhysicalParameters, VesselGeometry, REACTION_NAME};
pub use random::{RandomSource, RngSource, SeededSource};
pub use run::{CompletedRun, RunId, SimulationMetadata, TimeSeriesRow};
pub use sampler::{ConditionSampler, InitialConditions, SamplingConfig};
pub use sensor::SensorModel;
pub use sink::{FileSink, MemorySink, PersistedRun, ResultSink};
pub use state::{ReactorState, SensorReading, SimulationRecord, StopReason};
pub use stop::{StopEvaluator, StopPolicy, StopThresholds};
