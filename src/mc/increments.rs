// src/mc/increments.rs
//! Brownian increment sourcing.
//!
//! Either the unscaled N(0, 1) draws for every step are generated upfront
//! (`[num_steps, num_samples, dim]`), or a sampler draws one
//! `[num_samples, dim]` block per step. Scaling by `√dt` happens in the
//! step function.
//!
//! Precomputed draws are generated path-major, one `num_steps * dim`
//! dimensional point per path, so low-discrepancy points span whole paths
//! and antithetic pairs are mirrored over the full path.

use crate::error::{SdeError, SdeResult};
use crate::rng::{NormalSampler, RandomType};
use ndarray::{Array3, ArrayView2, Axis, CowArray, Ix2};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum IncrementSource {
    Precomputed(Arc<Array3<f64>>),
    Lazy(NormalSampler),
}

impl IncrementSource {
    /// Picks the sourcing mode for `random_type` and, when precomputing,
    /// generates all draws immediately.
    ///
    /// Cloning a freshly built source replays the same increments, which is
    /// how every sensitivity pass sees identical noise.
    pub fn new(
        random_type: RandomType,
        dim: usize,
        num_steps: usize,
        num_samples: usize,
        seed: u64,
        skip: u64,
        precompute: bool,
    ) -> SdeResult<Self> {
        let mut sampler = NormalSampler::new(random_type, seed, skip);
        if !(precompute || random_type.requires_precompute()) {
            debug!(?random_type, "drawing Brownian increments lazily per step");
            return Ok(IncrementSource::Lazy(sampler));
        }

        debug!(
            ?random_type,
            num_steps, num_samples, dim, "precomputing Brownian increments"
        );
        if num_steps == 0 {
            if random_type.is_antithetic() && num_samples % 2 != 0 {
                return Err(SdeError::RandomGeneration {
                    reason: format!(
                        "{:?} requires an even number of samples, got {}",
                        random_type, num_samples
                    ),
                });
            }
            return Ok(IncrementSource::Precomputed(Arc::new(Array3::zeros((
                0,
                num_samples,
                dim,
            )))));
        }

        let path_major = sampler.sample(num_samples, num_steps * dim)?;
        let draws = path_major
            .into_shape((num_samples, num_steps, dim))
            .map_err(|e| SdeError::ShapeMismatch {
                operation: format!("increment reshape ({})", e),
                expected: vec![num_samples, num_steps, dim],
                actual: vec![num_samples, num_steps * dim],
            })?
            .permuted_axes([1, 0, 2])
            .as_standard_layout()
            .into_owned();

        Ok(IncrementSource::Precomputed(Arc::new(draws)))
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, IncrementSource::Precomputed(_))
    }

    /// Unscaled N(0, 1) draws for `step`, shape `[num_samples, dim]`.
    pub fn step_draws(
        &mut self,
        step: usize,
        num_samples: usize,
        dim: usize,
    ) -> SdeResult<CowArray<'_, f64, Ix2>> {
        match self {
            IncrementSource::Precomputed(draws) => {
                let (steps, samples, width) = draws.dim();
                if step >= steps || samples != num_samples || width != dim {
                    return Err(SdeError::ShapeMismatch {
                        operation: format!("precomputed increments at step {}", step),
                        expected: vec![step + 1, num_samples, dim],
                        actual: vec![steps, samples, width],
                    });
                }
                let view: ArrayView2<'_, f64> = draws.index_axis(Axis(0), step);
                Ok(CowArray::from(view))
            }
            IncrementSource::Lazy(sampler) => Ok(CowArray::from(sampler.sample(num_samples, dim)?)),
        }
    }
}
