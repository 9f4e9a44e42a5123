// src/rng/halton.rs
//! Halton low-discrepancy sequence.
//!
//! Dimension `k` is the radical inverse of the point index in the `k`-th
//! prime base. The randomized variant applies a seeded Cranley–Patterson
//! shift (`u + s_k mod 1`) per dimension, which keeps the low-discrepancy
//! structure while making the points an unbiased random sample.

use super::CounterRng;

#[derive(Debug, Clone)]
pub struct HaltonSequence {
    bases: Vec<u64>,
    index: u64,
    shifts: Option<Vec<f64>>,
}

impl HaltonSequence {
    pub fn new(dimensions: usize) -> Self {
        Self {
            bases: first_primes(dimensions),
            index: 0,
            shifts: None,
        }
    }

    pub fn randomized(dimensions: usize, seed: u64) -> Self {
        let mut rng = CounterRng::new(seed, 0);
        let shifts = (0..dimensions).map(|_| rng.uniform()).collect();
        Self {
            bases: first_primes(dimensions),
            index: 0,
            shifts: Some(shifts),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.bases.len()
    }

    /// Computes the radical inverse of `index` in the given base.
    fn radical_inverse(index: u64, base: u64) -> f64 {
        let mut result = 0.0;
        let inv_base = 1.0 / base as f64;
        let mut f = inv_base;
        let mut i = index;

        while i > 0 {
            result += f * (i % base) as f64;
            i /= base;
            f *= inv_base;
        }

        result
    }

    /// Generates the next point in [0, 1)^d. Indices start at 1, so the
    /// origin is never produced by the unshifted sequence.
    pub fn next_into(&mut self, out: &mut [f64]) {
        self.index += 1;
        for (k, (u, &base)) in out.iter_mut().zip(&self.bases).enumerate() {
            let value = Self::radical_inverse(self.index, base);
            *u = match &self.shifts {
                Some(shifts) => (value + shifts[k]).fract(),
                None => value,
            };
        }
    }

    /// Skips ahead n points in the sequence.
    pub fn skip(&mut self, n: u64) {
        self.index += n;
    }
}

/// First `n` primes by trial division against the primes found so far.
pub fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate = 2_u64;
    while primes.len() < n {
        let is_prime = primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}
