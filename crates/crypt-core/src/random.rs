//! The shared deterministic random stream.
//!
//! One [`SeededUniform`] is created per run and handed to every cell-cycle
//! operation that samples. It counts the draws it has produced, so its
//! position can be captured as a [`RandomSnapshot`] and restored later by
//! reseeding and replaying.

use crypt_cycle::{RandomSnapshot, UniformSource};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded uniform source with a draw counter.
#[derive(Debug, Clone)]
pub struct SeededUniform {
    seed: u64,
    draws: u64,
    rng: SmallRng,
}

impl SeededUniform {
    /// Create a stream from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reseed in place, discarding the current position.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Seed the stream was created from.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws consumed since seeding.
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Capture the stream position.
    pub const fn snapshot(&self) -> RandomSnapshot {
        RandomSnapshot {
            seed: self.seed,
            draws: self.draws,
        }
    }

    /// Rebuild a stream at a captured position by replaying its draws.
    pub fn restore(snapshot: RandomSnapshot) -> Self {
        let mut stream = Self::new(snapshot.seed);
        for _ in 0..snapshot.draws {
            let _ = stream.next_uniform01();
        }
        stream
    }
}

impl UniformSource for SeededUniform {
    fn next_uniform01(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.random::<f64>()
    }
}
