//! Injectable random sources.
//!
//! Sampling and sensor noise never reach for a global generator; they draw
//! from a [`RandomSource`] handed in by the caller. A fixed seed therefore
//! reproduces a run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Uniform and Gaussian draws.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `[low, high)`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `high <= low`.
    fn uniform_int(&mut self, low: i64, high: i64) -> i64;

    /// Gaussian draw with the given mean and standard deviation.
    ///
    /// A zero or invalid standard deviation returns `mean`.
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;
}

/// Adapter that turns any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Unwrap the generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..high)
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev == 0.0 {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        }
    }
}

/// Default seedable source for runs and tests.
pub type SeededSource = RngSource<ChaCha8Rng>;

impl SeededSource {
    /// Deterministic source from a 64-bit seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Source seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        (**self).uniform_int(low, high)
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        (**self).gaussian(mean, std_dev)
    }
}
