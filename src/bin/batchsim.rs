//! batchsim
//!
//! Runs one batch-reactor simulation and writes its time series and metadata
//! under the configured output directory. Takes no arguments; everything is
//! configured through the environment:
//!
//! - `BATCHSIM_CONFIG`: path to a JSON configuration document
//! - `BATCHSIM_OUTPUT_DIR`: overrides the output base directory
//! - `BATCHSIM_SEED`: fixed seed for a reproducible run
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::error::Error;
use std::path::PathBuf;

use batchsim::{SeededSource, SimulationConfig};

/// Settings read from the environment.
struct Settings {
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
}

fn read_settings() -> Result<Settings, Box<dyn Error>> {
    let seed = match env::var("BATCHSIM_SEED") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid BATCHSIM_SEED {raw:?}: {e}"))?,
        ),
        Err(_) => None,
    };
    Ok(Settings {
        config_path: env::var_os("BATCHSIM_CONFIG").map(PathBuf::from),
        output_dir: env::var_os("BATCHSIM_OUTPUT_DIR").map(PathBuf::from),
        seed,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = read_settings()?;

    let mut config = match &settings.config_path {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(dir) = settings.output_dir {
        config = config.with_base_dir(dir);
    }

    let driver = config.driver()?;
    let sink = config.sink();
    // The run goes ahead regardless; persisting it reports the failure again.
    if let Err(e) = sink.prepare() {
        log::warn!("cannot prepare output directory {}: {e}", sink.base_dir().display());
    }

    let mut rng = match settings.seed {
        Some(seed) => {
            log::info!("using seed {seed}");
            SeededSource::seeded(seed)
        }
        None => SeededSource::from_entropy(),
    };

    let run = driver.run_and_persist(&mut rng, &sink)?;
    let metadata = run.metadata();
    log::info!(
        "simulation {} finished: {} at t={}s ({} records)",
        run.id(),
        metadata.stop_reason,
        metadata.stop_time,
        run.history().len()
    );
    Ok(())
}
