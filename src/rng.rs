// src/rng.rs
//! Random Number Generation for Euler Sampling
//!
//! # Design Philosophy
//!
//! The Euler scheme consumes one standard normal vector per path per step.
//! Where those normals come from is selected by [`RandomType`]:
//! 1. **Pseudo-random**: `StdRng` + `StandardNormal`, optionally antithetic
//! 2. **Stateless**: counter-based generator, a pure function of the seed
//! 3. **Low-discrepancy**: Sobol and (randomized) Halton points pushed
//!    through the inverse normal CDF
//!
//! # Counter-Based RNG
//!
//! Uses a counter-based approach similar to Philox/Threefry algorithms:
//! - Deterministic mapping: (seed, counter) → random value
//! - No hidden global state, so repeated calls with one seed agree
//!
//! # Box-Muller Transform
//!
//! Converts uniform random variables to normal distributions:
//! ```text
//! Z₁ = √(-2ln(U₁)) * cos(2πU₂)
//! Z₂ = √(-2ln(U₁)) * sin(2πU₂)
//! ```
//! where U₁, U₂ ~ Uniform(0,1) and Z₁, Z₂ ~ N(0,1).

pub mod halton;
pub mod sobol;

use crate::error::{SdeError, SdeResult};
use crate::math_utils::norm_inv;
use halton::HaltonSequence;
use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use sobol::SobolSequence;

/// Source of the normal draws driving the Brownian increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RandomType {
    #[default]
    Pseudo,
    PseudoAntithetic,
    Stateless,
    StatelessAntithetic,
    Sobol,
    Halton,
    HaltonRandomized,
}

/// Random types whose draws must be generated for the whole path upfront,
/// regardless of the caller's precompute flag.
const PRECOMPUTE_POLICY: [(RandomType, bool); 7] = [
    (RandomType::Pseudo, false),
    (RandomType::PseudoAntithetic, false),
    (RandomType::Stateless, true),
    (RandomType::StatelessAntithetic, true),
    (RandomType::Sobol, true),
    (RandomType::Halton, true),
    (RandomType::HaltonRandomized, true),
];

impl RandomType {
    pub fn requires_precompute(self) -> bool {
        PRECOMPUTE_POLICY
            .iter()
            .any(|&(random_type, precompute)| random_type == self && precompute)
    }

    pub fn is_antithetic(self) -> bool {
        matches!(
            self,
            RandomType::PseudoAntithetic | RandomType::StatelessAntithetic
        )
    }

    pub fn is_low_discrepancy(self) -> bool {
        matches!(
            self,
            RandomType::Sobol | RandomType::Halton | RandomType::HaltonRandomized
        )
    }

    /// Stateless draws are only reproducible if the caller pins the seed.
    pub fn requires_seed(self) -> bool {
        matches!(
            self,
            RandomType::Stateless | RandomType::StatelessAntithetic
        )
    }
}

/// Counter-based RNG for reproducible stateless sampling
///
/// # Algorithm
///
/// Uses splitmix64-like algorithm for fast, high-quality random numbers:
/// ```text
/// z = base_seed + counter
/// z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
/// z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
/// output = z ⊕ (z >> 31)
/// ```
#[derive(Debug, Clone)]
pub struct CounterRng {
    base_seed: u64,
    counter: u64,
    spare: Option<f64>,
}

impl CounterRng {
    pub fn new(base_seed: u64, counter: u64) -> Self {
        Self {
            base_seed,
            counter,
            spare: None,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        let mut z = self.base_seed.wrapping_add(self.counter);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
        z ^ (z >> 31)
    }

    /// Uniform draw in the open interval (0, 1).
    pub fn uniform(&mut self) -> f64 {
        ((self.next_u64() >> 11) as f64 + 0.5) * (1.0 / 9007199254740992.0) // 2^53
    }

    pub fn normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }

        let u1 = self.uniform();
        let u2 = self.uniform();

        let mag = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * u2;
        self.spare = Some(mag * angle.sin());
        mag * angle.cos()
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Pins an optional seed once per sampling call.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen())
}

/// Multivariate standard normal sampler over all supported random types.
///
/// Each call to [`NormalSampler::sample`] returns a `[num_samples, dimension]`
/// array of N(0, 1) draws. Pseudo and stateless generators continue their
/// stream across calls; low-discrepancy sequences restart at `skip`, so the
/// whole path must be requested in one call.
#[derive(Debug, Clone)]
pub struct NormalSampler {
    random_type: RandomType,
    seed: u64,
    skip: u64,
    rng: StdRng,
    counter: CounterRng,
}

impl NormalSampler {
    pub fn new(random_type: RandomType, seed: u64, skip: u64) -> Self {
        Self {
            random_type,
            seed,
            skip,
            rng: seed_rng_from_u64(seed),
            counter: CounterRng::new(seed, 0),
        }
    }

    pub fn random_type(&self) -> RandomType {
        self.random_type
    }

    pub fn sample(&mut self, num_samples: usize, dimension: usize) -> SdeResult<Array2<f64>> {
        let antithetic = self.random_type.is_antithetic();
        if antithetic && num_samples % 2 != 0 {
            return Err(SdeError::RandomGeneration {
                reason: format!(
                    "{:?} requires an even number of samples, got {}",
                    self.random_type, num_samples
                ),
            });
        }
        let base_rows = if antithetic {
            num_samples / 2
        } else {
            num_samples
        };

        let mut draws = Array2::<f64>::zeros((num_samples, dimension));
        if dimension == 0 || num_samples == 0 {
            return Ok(draws);
        }

        {
            let mut head = draws.slice_mut(s![..base_rows, ..]);
            match self.random_type {
                RandomType::Pseudo | RandomType::PseudoAntithetic => {
                    let rng = &mut self.rng;
                    head.iter_mut().for_each(|x| *x = get_normal_draw(rng));
                }
                RandomType::Stateless | RandomType::StatelessAntithetic => {
                    let counter = &mut self.counter;
                    head.iter_mut().for_each(|x| *x = counter.normal());
                }
                RandomType::Sobol => {
                    let mut sequence = SobolSequence::new(dimension)?;
                    sequence.skip_to(self.skip);
                    let mut point = vec![0.0; dimension];
                    for mut row in head.rows_mut() {
                        sequence.next_into(&mut point)?;
                        row.iter_mut()
                            .zip(&point)
                            .for_each(|(x, &u)| *x = norm_inv(u));
                    }
                }
                RandomType::Halton | RandomType::HaltonRandomized => {
                    let mut sequence = if self.random_type == RandomType::Halton {
                        HaltonSequence::new(dimension)
                    } else {
                        HaltonSequence::randomized(dimension, self.seed)
                    };
                    sequence.skip(self.skip);
                    let mut point = vec![0.0; dimension];
                    for mut row in head.rows_mut() {
                        sequence.next_into(&mut point);
                        row.iter_mut()
                            .zip(&point)
                            .for_each(|(x, &u)| *x = norm_inv(u));
                    }
                }
            }
        }

        if antithetic {
            let mirrored = draws.slice(s![..base_rows, ..]).mapv(|x| -x);
            draws.slice_mut(s![base_rows.., ..]).assign(&mirrored);
        }

        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_rng_reproducibility() {
        let mut rng1 = CounterRng::new(42, 0);
        let mut rng2 = CounterRng::new(42, 0);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_counter_rng_different_seeds() {
        let mut rng1 = CounterRng::new(42, 0);
        let mut rng2 = CounterRng::new(43, 0);

        let vals1: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();
        let vals2: Vec<u64> = (0..10).map(|_| rng2.next_u64()).collect();

        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_normal_distribution() {
        let mut rng = CounterRng::new(42, 0);

        let samples: Vec<f64> = (0..10000).map(|_| rng.normal()).collect();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;

        assert!(mean.abs() < 0.05, "Mean should be close to 0, got {}", mean);
        assert!(
            (variance - 1.0).abs() < 0.05,
            "Variance should be close to 1, got {}",
            variance
        );
    }

    #[test]
    fn test_precompute_policy() {
        assert!(!RandomType::Pseudo.requires_precompute());
        assert!(!RandomType::PseudoAntithetic.requires_precompute());
        assert!(RandomType::Stateless.requires_precompute());
        assert!(RandomType::StatelessAntithetic.requires_precompute());
        assert!(RandomType::Sobol.requires_precompute());
        assert!(RandomType::Halton.requires_precompute());
        assert!(RandomType::HaltonRandomized.requires_precompute());
    }

    #[test]
    fn test_antithetic_rows_are_mirrored() {
        for random_type in [RandomType::PseudoAntithetic, RandomType::StatelessAntithetic] {
            let mut sampler = NormalSampler::new(random_type, 11, 0);
            let draws = sampler.sample(6, 4).unwrap();
            for i in 0..3 {
                for j in 0..4 {
                    assert_eq!(draws[[i, j]], -draws[[i + 3, j]]);
                }
            }
        }
    }

    #[test]
    fn test_antithetic_rejects_odd_sample_count() {
        let mut sampler = NormalSampler::new(RandomType::PseudoAntithetic, 1, 0);
        assert!(matches!(
            sampler.sample(5, 2),
            Err(SdeError::RandomGeneration { .. })
        ));
    }

    #[test]
    fn test_stateless_sampler_is_pure_function_of_seed() {
        let a = NormalSampler::new(RandomType::Stateless, 99, 0)
            .sample(8, 3)
            .unwrap();
        let b = NormalSampler::new(RandomType::Stateless, 99, 0)
            .sample(8, 3)
            .unwrap();
        let c = NormalSampler::new(RandomType::Stateless, 100, 0)
            .sample(8, 3)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_low_discrepancy_sampler_restarts_each_call() {
        let mut sampler = NormalSampler::new(RandomType::Sobol, 0, 0);
        let first = sampler.sample(16, 3).unwrap();
        let second = sampler.sample(16, 3).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_pseudo_sampler_continues_stream() {
        let mut sampler = NormalSampler::new(RandomType::Pseudo, 5, 0);
        let first = sampler.sample(4, 2).unwrap();
        let second = sampler.sample(4, 2).unwrap();
        assert_ne!(first, second);
    }
}
