//! Thermocouple noise model.
//!
//! A type T thermocouple has a limit of error of about +/-1.0 K at these
//! temperatures. Treating that as 3 sigma (99.7% of readings) gives the
//! default sigma of 0.333 K.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::random::RandomSource;
use crate::state::SensorReading;

/// Default measurement standard deviation (K).
pub const DEFAULT_SENSOR_STD_DEV: f64 = 0.333;

/// Adds zero-mean Gaussian noise to the true temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModel {
    /// Noise standard deviation (K).
    pub std_dev: f64,
}

impl Default for SensorModel {
    fn default() -> Self {
        Self {
            std_dev: DEFAULT_SENSOR_STD_DEV,
        }
    }
}

impl SensorModel {
    /// A sensor with the given noise level.
    #[must_use]
    pub const fn new(std_dev: f64) -> Self {
        Self { std_dev }
    }

    /// A noiseless sensor.
    #[must_use]
    pub const fn ideal() -> Self {
        Self { std_dev: 0.0 }
    }

    /// Read the temperature.
    pub fn read<R: RandomSource + ?Sized>(&self, true_temperature: f64, rng: &mut R) -> SensorReading {
        SensorReading {
            temperature: true_temperature + rng.gaussian(0.0, self.std_dev),
        }
    }

    /// Validate the noise level.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.std_dev.is_finite() && self.std_dev >= 0.0 {
            Ok(())
        } else {
            Err(ValidationError::NonFiniteParameter {
                field: "sensor.std_dev".to_string(),
                value: self.std_dev,
            })
        }
    }
}
