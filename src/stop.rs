//! Termination criteria.
//!
//! Rules are checked in a fixed priority order and the first match wins:
//!
//! 1. `steady_state`: CA decreased by less than `tolerance` over the look-back window
//! 2. `full_conversion`: CA or CB below its minimum
//! 3. `time_limit`: elapsed time reached the maximum
//! 4. `numerical_error`: CA is NaN or negative
//! 5. `runaway_reaction`: |T| outside the plausible band
//!
//! Evaluation is a pure function of the history, the thresholds and the
//! elapsed time.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::state::{ReactorState, SimulationRecord, StopReason};

/// Stop rules expressed relative to the initial charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopPolicy {
    /// Trailing window (s) used by the steady-state rule.
    pub lookback_window: f64,
    /// Steady-state tolerance as a fraction of CA0.
    pub steady_state_fraction: f64,
    /// Full-conversion thresholds as a fraction of CA0 and CB0.
    pub conversion_fraction: f64,
    /// Maximum simulated time (s).
    pub max_time: f64,
    /// Lower bound on |T| (K).
    pub min_temperature: f64,
    /// Upper bound on |T| (K).
    pub max_temperature: f64,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            lookback_window: 15.0,
            steady_state_fraction: 0.0005,
            conversion_fraction: 0.005,
            max_time: 7200.0,
            min_temperature: 50.0,
            max_temperature: 1000.0,
        }
    }
}

impl StopPolicy {
    /// Resolve absolute thresholds for a run starting from `initial`.
    #[must_use]
    pub fn thresholds_for(&self, initial: &ReactorState) -> StopThresholds {
        StopThresholds {
            tolerance: initial.ca * self.steady_state_fraction,
            lookback_window: self.lookback_window,
            ca_min: initial.ca * self.conversion_fraction,
            cb_min: initial.cb * self.conversion_fraction,
            max_time: self.max_time,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        }
    }

    /// Validate the policy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: String| Err(ValidationError::InvalidStopPolicy { reason });

        if !(self.lookback_window.is_finite() && self.lookback_window >= 0.0) {
            return invalid(format!("lookback_window must be >= 0 (got {})", self.lookback_window));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return invalid(format!("max_time must be > 0 (got {})", self.max_time));
        }
        for (name, value) in [
            ("steady_state_fraction", self.steady_state_fraction),
            ("conversion_fraction", self.conversion_fraction),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be >= 0 (got {value})"));
            }
        }
        if !(self.min_temperature.is_finite()
            && self.max_temperature.is_finite()
            && self.min_temperature <= self.max_temperature)
        {
            return invalid(format!(
                "temperature band [{}, {}] is empty",
                self.min_temperature, self.max_temperature
            ));
        }
        Ok(())
    }
}

/// Absolute thresholds for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopThresholds {
    /// Minimum CA decrease over the look-back window (mol/m^3).
    pub tolerance: f64,
    /// Look-back window (s).
    pub lookback_window: f64,
    /// Full-conversion threshold on CA (mol/m^3).
    pub ca_min: f64,
    /// Full-conversion threshold on CB (mol/m^3).
    pub cb_min: f64,
    /// Maximum simulated time (s).
    pub max_time: f64,
    /// Lower bound on |T| (K).
    pub min_temperature: f64,
    /// Upper bound on |T| (K).
    pub max_temperature: f64,
}

/// Evaluates the stop rules against a run history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopEvaluator {
    thresholds: StopThresholds,
    step_size: f64,
}

impl StopEvaluator {
    /// Create an evaluator for a fixed step size.
    #[must_use]
    pub const fn new(thresholds: StopThresholds, step_size: f64) -> Self {
        Self {
            thresholds,
            step_size,
        }
    }

    /// The thresholds in use.
    #[must_use]
    pub const fn thresholds(&self) -> &StopThresholds {
        &self.thresholds
    }

    /// Number of records spanned by the look-back window, inclusive of the latest.
    #[must_use]
    pub fn lookback_points(&self) -> usize {
        (self.thresholds.lookback_window / self.step_size).floor() as usize + 1
    }

    /// Returns the first rule that fires, or `None` to continue.
    ///
    /// With an empty history only the time limit can fire.
    #[must_use]
    pub fn evaluate(&self, history: &[SimulationRecord], elapsed: f64) -> Option<StopReason> {
        let th = &self.thresholds;
        let latest = history.last().map(|record| &record.state);

        if let Some(latest) = latest {
            let back = self.lookback_points();
            if history.len() > back {
                let reference = &history[history.len() - back].state;
                if reference.ca - latest.ca < th.tolerance {
                    return Some(StopReason::SteadyState);
                }
            }

            // A NaN CA is never "converted", whatever CB reads.
            if !latest.ca.is_nan() && (latest.ca < th.ca_min || latest.cb < th.cb_min) {
                return Some(StopReason::FullConversion);
            }
        }

        if elapsed >= th.max_time {
            return Some(StopReason::TimeLimit);
        }

        let latest = latest?;

        // Only CA is checked: the material balance ties the other species to it.
        if latest.ca.is_nan() || latest.ca < 0.0 {
            return Some(StopReason::NumericalError);
        }

        // Literal magnitude check, not a delta from the coolant temperature.
        if !(th.min_temperature..=th.max_temperature).contains(&latest.temperature.abs()) {
            return Some(StopReason::RunawayReaction);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SensorReading;

    const H: f64 = 0.5;

    fn record(ca: f64, cb: f64, t: f64, elapsed: f64) -> SimulationRecord {
        SimulationRecord {
            state: ReactorState {
                ca,
                cb,
                cc: 0.0,
                cd: 0.0,
                temperature: t,
            },
            sensor: SensorReading { temperature: t },
            elapsed,
        }
    }

    fn thresholds() -> StopThresholds {
        StopPolicy::default().thresholds_for(&ReactorState::charge(1000.0, 1000.0, 298.15))
    }

    fn evaluator() -> StopEvaluator {
        StopEvaluator::new(thresholds(), H)
    }

    /// CA falls by `drop` per step from 1000.
    fn declining_history(len: usize, drop: f64) -> Vec<SimulationRecord> {
        (0..len)
            .map(|i| {
                let ca = 1000.0 - drop * i as f64;
                record(ca, ca, 300.0, i as f64 * H)
            })
            .collect()
    }

    #[test]
    fn thresholds_scale_with_initial_charge() {
        let th = StopPolicy::default().thresholds_for(&ReactorState::charge(1000.0, 400.0, 300.0));
        assert!((th.tolerance - 0.5).abs() < 1e-12);
        assert!((th.ca_min - 5.0).abs() < 1e-12);
        assert!((th.cb_min - 2.0).abs() < 1e-12);
        assert_eq!(th.max_time, 7200.0);
    }

    #[test]
    fn lookback_points_for_default_window() {
        assert_eq!(evaluator().lookback_points(), 31);
    }

    #[test]
    fn empty_history_continues_until_time_limit() {
        let ev = evaluator();
        assert_eq!(ev.evaluate(&[], 0.0), None);
        assert_eq!(ev.evaluate(&[], 7200.0), Some(StopReason::TimeLimit));
    }

    #[test]
    fn healthy_history_continues() {
        let history = declining_history(100, 1.0);
        assert_eq!(evaluator().evaluate(&history, 50.0), None);
    }

    #[test]
    fn steady_state_needs_more_than_window() {
        let ev = evaluator();
        // Flat CA, but exactly 31 points: the window is not yet full.
        let history = declining_history(31, 0.0);
        assert_eq!(ev.evaluate(&history, 15.0), None);

        let history = declining_history(32, 0.0);
        assert_eq!(ev.evaluate(&history, 15.5), Some(StopReason::SteadyState));
    }

    #[test]
    fn steady_state_compares_against_lookback_index() {
        let ev = evaluator();
        // 31 points spanning the window; decrease = 30 * drop.
        let slow = declining_history(40, 0.4 / 30.0);
        assert_eq!(ev.evaluate(&slow, 20.0), Some(StopReason::SteadyState));

        let fast = declining_history(40, 0.6 / 30.0);
        assert_eq!(ev.evaluate(&fast, 20.0), None);
    }

    #[test]
    fn full_conversion_beats_time_limit() {
        let history = vec![record(1000.0, 1000.0, 300.0, 0.0), record(4.0, 500.0, 300.0, 0.5)];
        assert_eq!(
            evaluator().evaluate(&history, 10_000.0),
            Some(StopReason::FullConversion)
        );
    }

    #[test]
    fn full_conversion_on_either_reactant() {
        let ev = evaluator();
        assert_eq!(
            ev.evaluate(&[record(900.0, 1.0, 300.0, 0.0)], 0.0),
            Some(StopReason::FullConversion)
        );
    }

    #[test]
    fn time_limit_beats_numerical_error() {
        let history = vec![record(f64::NAN, 500.0, 300.0, 0.0)];
        assert_eq!(evaluator().evaluate(&history, 7200.0), Some(StopReason::TimeLimit));
    }

    #[test]
    fn nan_concentration_is_numerical_error() {
        let ev = evaluator();
        for t in [300.0, 5_000.0, f64::NAN, -2.0] {
            for cb in [500.0, 0.0, -3.0, f64::NAN] {
                let history = vec![record(f64::NAN, cb, t, 0.0)];
                assert_eq!(ev.evaluate(&history, 1.0), Some(StopReason::NumericalError));
            }
        }
    }

    #[test]
    fn negative_concentration_is_numerical_error() {
        // With a zero conversion threshold a negative CA is not "converted".
        let th = StopThresholds {
            ca_min: -10.0,
            ..thresholds()
        };
        let ev = StopEvaluator::new(th, H);
        let history = vec![record(-1.0, 500.0, 300.0, 0.0)];
        assert_eq!(ev.evaluate(&history, 1.0), Some(StopReason::NumericalError));
    }

    #[test]
    fn runaway_checks_temperature_magnitude() {
        let ev = evaluator();
        let hot = vec![record(900.0, 900.0, 1000.5, 0.0)];
        assert_eq!(ev.evaluate(&hot, 1.0), Some(StopReason::RunawayReaction));

        let cold = vec![record(900.0, 900.0, 49.0, 0.0)];
        assert_eq!(ev.evaluate(&cold, 1.0), Some(StopReason::RunawayReaction));

        // |-300| is inside the band.
        let negative = vec![record(900.0, 900.0, -300.0, 0.0)];
        assert_eq!(ev.evaluate(&negative, 1.0), None);

        let edge = vec![record(900.0, 900.0, 1000.0, 0.0)];
        assert_eq!(ev.evaluate(&edge, 1.0), None);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let ev = evaluator();
        let history = declining_history(50, 0.0);
        let first = ev.evaluate(&history, 25.0);
        assert_eq!(first, ev.evaluate(&history, 25.0));
    }

    #[test]
    fn policy_validation() {
        StopPolicy::default().validate().unwrap();
        let bad = StopPolicy {
            max_time: 0.0,
            ..StopPolicy::default()
        };
        assert!(bad.validate().is_err());
        let bad = StopPolicy {
            min_temperature: 2000.0,
            ..StopPolicy::default()
        };
        assert!(bad.validate().is_err());
    }
}
