//! Parallel ensembles of independent runs.
//!
//! Runs share nothing but the immutable driver. Each run gets its own history
//! buffer and its own generator seeded from `base_seed + index`, so an
//! ensemble is reproducible regardless of worker count or scheduling.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::driver::{SimulationDriver, SimulationOutcome};
use crate::error::{BatchSimError, SimResult, ValidationError};
use crate::random::SeededSource;

/// Ensemble configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of runs.
    pub runs: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// Seed of run 0; run `i` uses `base_seed + i`.
    pub base_seed: u64,
    /// Maximum queued jobs.
    pub queue_capacity: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            runs: 1,
            workers: 4,
            base_seed: 0,
            queue_capacity: 64,
        }
    }
}

impl EnsembleConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::InvalidEnsemble {
                reason: "workers must be > 0".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidEnsemble {
                reason: "queue_capacity must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Seed used by run `index`.
    #[must_use]
    pub const fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

/// A finished ensemble member.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    /// Position in the ensemble.
    pub index: usize,
    /// Seed the run used.
    pub seed: u64,
    /// The run itself.
    pub outcome: SimulationOutcome,
}

struct Job {
    index: usize,
    seed: u64,
}

fn spawn_workers(
    driver: &Arc<SimulationDriver>,
    workers: usize,
    jobs: &Receiver<Job>,
    results: &Sender<EnsembleMember>,
) -> SimResult<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(workers);
    for idx in 0..workers {
        let driver = Arc::clone(driver);
        let jobs = jobs.clone();
        let results = results.clone();
        let handle = thread::Builder::new()
            .name(format!("batchsim-worker-{idx}"))
            .spawn(move || {
                while let Ok(Job { index, seed }) = jobs.recv() {
                    let outcome = driver.run(&mut SeededSource::seeded(seed));
                    if results.send(EnsembleMember { index, seed, outcome }).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| BatchSimError::internal(format!("failed to spawn ensemble worker: {e}")))?;
        handles.push(handle);
    }
    Ok(handles)
}

/// Run `config.runs` independent simulations on a bounded worker pool.
///
/// Members are returned in index order.
///
/// # Errors
///
/// Fails on invalid configuration, if a worker cannot be spawned, or if a
/// worker dies before delivering its result.
pub fn run_ensemble(driver: &SimulationDriver, config: &EnsembleConfig) -> SimResult<Vec<EnsembleMember>> {
    config.validate()?;
    if config.runs == 0 {
        return Ok(Vec::new());
    }

    let workers = config.workers.min(config.runs);
    let (job_tx, job_rx) = bounded::<Job>(config.queue_capacity);
    // Unbounded enough to never block a worker: one slot per run.
    let (result_tx, result_rx) = bounded::<EnsembleMember>(config.runs);

    let driver = Arc::new(*driver);
    let handles = spawn_workers(&driver, workers, &job_rx, &result_tx)?;
    drop(job_rx);
    drop(result_tx);

    log::info!("ensemble: {} runs on {workers} workers", config.runs);

    for index in 0..config.runs {
        let job = Job {
            index,
            seed: config.seed_for(index),
        };
        if job_tx.send(job).is_err() {
            break;
        }
    }
    // Close the queue: workers drain it then exit.
    drop(job_tx);

    let mut members: Vec<EnsembleMember> = result_rx.iter().collect();
    let mut panics = Vec::new();
    for handle in handles {
        let name = handle.thread().name().unwrap_or("batchsim-worker").to_string();
        if let Err(payload) = handle.join() {
            let message = panic_message(payload.as_ref());
            log::error!("{name} panicked: {message}");
            panics.push(format!("{name}: {message}"));
        }
    }

    if members.len() != config.runs {
        let mut message = format!("ensemble delivered {} of {} runs", members.len(), config.runs);
        if !panics.is_empty() {
            message.push_str(&format!(" (worker panics: {})", panics.join("; ")));
        }
        return Err(BatchSimError::internal(message));
    }

    members.sort_by_key(|m| m.index);
    Ok(members)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
