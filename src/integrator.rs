//! Fixed-step explicit fourth-order Runge-Kutta integration.
//!
//! ```text
//! k1 = f(y)
//! k2 = f(y + h/2 * k1)
//! k3 = f(y + h/2 * k2)
//! k4 = f(y + h * k3)
//! y' = y + h/6 * (k1 + 2 k2 + 2 k3 + k4)
//! ```
//!
//! The stepper is pure and never inspects the values it combines: NaN or
//! infinite derivatives flow straight into the next state.

use crate::state::ReactorState;

/// A state vector the integrator can advance.
pub trait StateVector: Sized {
    /// Combines two vectors component-wise.
    #[must_use]
    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self;

    /// Returns `self + factor * other`, component-wise.
    #[must_use]
    fn add_scaled(&self, other: &Self, factor: f64) -> Self {
        self.zip_with(other, |s, d| s + factor * d)
    }
}

impl<const N: usize> StateVector for [f64; N] {
    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        let mut out = *self;
        for (o, d) in out.iter_mut().zip(other) {
            *o = f(*o, *d);
        }
        out
    }
}

impl StateVector for Vec<f64> {
    /// Panics if the vectors differ in length.
    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        assert_eq!(self.len(), other.len(), "state/derivative length mismatch");
        self.iter().zip(other).map(|(s, d)| f(*s, *d)).collect()
    }
}

impl StateVector for ReactorState {
    fn zip_with<F: Fn(f64, f64) -> f64>(&self, other: &Self, f: F) -> Self {
        Self::from_array(self.to_array().zip_with(&other.to_array(), f))
    }
}

/// Advance `state` by one RK4 step of size `h`.
pub fn rk4_step<S, F>(derivative: F, state: &S, h: f64) -> S
where
    S: StateVector,
    F: Fn(&S) -> S,
{
    let k1 = derivative(state);
    let k2 = derivative(&state.add_scaled(&k1, 0.5 * h));
    let k3 = derivative(&state.add_scaled(&k2, 0.5 * h));
    let k4 = derivative(&state.add_scaled(&k3, h));

    // Average as k1 plus weighted deviations from k1. For a constant slope the
    // deviations are exactly zero, so the step is exactly `state + h * k1`.
    let deviation = k2
        .zip_with(&k1, |b, a| 2.0 * (b - a))
        .zip_with(&k3.zip_with(&k1, |c, a| 2.0 * (c - a)), |x, y| x + y)
        .zip_with(&k4.zip_with(&k1, |d, a| d - a), |x, y| x + y);
    let slope = k1.zip_with(&deviation, |a, dev| a + dev / 6.0);
    state.add_scaled(&slope, h)
}

/// Fixed-step RK4 integrator bound to a step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rk4 {
    step_size: f64,
}

impl Rk4 {
    /// Create an integrator with the given step size.
    #[must_use]
    pub const fn new(step_size: f64) -> Self {
        Self { step_size }
    }

    /// The configured step size.
    #[must_use]
    pub const fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advance `state` by one step.
    pub fn step<S, F>(&self, derivative: F, state: &S) -> S
    where
        S: StateVector,
        F: Fn(&S) -> S,
    {
        rk4_step(derivative, state, self.step_size)
    }
}
