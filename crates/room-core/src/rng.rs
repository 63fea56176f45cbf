//! Request-local random sources.
//!
//! Synthesis functions take any `rand::Rng` by mutable reference; nothing in
//! the crate touches a process-wide generator. [`seeded`] gives the
//! reproducible generator used by tests and the command-line front end.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;

/// Deterministic generator for `seed`.
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// `count` samples of zero-mean, unit-variance Gaussian noise.
pub fn white_noise<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.sample(StandardNormal)).collect()
}
