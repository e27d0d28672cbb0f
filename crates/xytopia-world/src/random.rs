//! Random sources for generation and visual variety.

/// Source of randomness used by the generator and tile renderer.
///
/// Implemented for `fastrand::Rng` so worlds can be reproduced from a seed.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[min, max]`.
    fn range_inclusive(&mut self, min: usize, max: usize) -> usize;

    /// `true` with probability `p`. `p >= 1` is always true, `p <= 0` never.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        self.range_inclusive(0, len.saturating_sub(1))
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }

    fn range_inclusive(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.usize(min..=max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn range_inclusive(&mut self, min: usize, max: usize) -> usize {
        (**self).range_inclusive(min, max)
    }
}

/// Creates the session RNG: seeded when a seed is configured, otherwise
/// seeded from fastrand's thread-local generator.
#[must_use]
pub fn session_rng(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}
