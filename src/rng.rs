//! Pluggable randomness for metric jitter, addresses and identifiers

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of randomness used by the simulator and lifecycle controller
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send {
    /// Uniform draw in `[low, high)`, or `low` when the range is empty
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Fill `dest` with random bytes
    fn fill_bytes(&mut self, dest: &mut [u8]);
}

/// Integer draw in `[base, base + span)`
pub fn offset_floor(rng: &mut dyn RandomSource, base: f64, span: f64) -> f64 {
    (base + rng.uniform(0.0, span)).floor()
}

/// Integer draw in `[low, high]`
pub fn int_inclusive(rng: &mut dyn RandomSource, low: u32, high: u32) -> u32 {
    let v = rng.uniform(low as f64, high as f64 + 1.0).floor() as u32;
    v.clamp(low, high)
}

/// [`StdRng`]-backed source, seeded from the OS or from a fixed seed
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for reproducible runs and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }
}
