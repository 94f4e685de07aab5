//! Shared random source for the simulated collaborators

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError};

/// Lock-guarded RNG. Seeded in tests, entropy-backed otherwise.
pub struct SimRng {
    inner: Mutex<StdRng>,
}

impl SimRng {
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Run `f` with exclusive access to the generator.
    /// Never hold the result across an await.
    pub fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Uniform draw in `[min, max)`, collapsing to `min` for an empty range
pub(crate) fn uniform(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    use rand::Rng;
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Symmetric jitter in `[-spread, spread)`
pub(crate) fn jitter(rng: &mut StdRng, spread: f64) -> f64 {
    uniform(rng, -spread, spread)
}
