// src/mc/grid.rs
//! Simulation time grid for the Euler scheme.
//!
//! The grid merges the caller's observation times with the uniform grid
//! `0, h, 2h, ... < t_last`, sorted ascending with exact duplicates
//! collapsed. Alongside it we keep:
//! - `mask[i]`: whether `times[i]` is a requested observation time
//! - `time_indices[k]`: grid position of the k-th requested time
//!
//! `times[0] == 0` always holds, and `mask[0]` is set only when time 0 was
//! itself requested.

use crate::error::{validation::validate_time_step, SdeError, SdeResult};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    time_step: f64,
    times: Vec<f64>,
    mask: Vec<bool>,
    time_indices: Vec<usize>,
}

impl TimeGrid {
    /// Builds the grid. `requested_times` are assumed strictly increasing and
    /// non-negative; only emptiness and the step size are checked here.
    pub fn new(requested_times: &[f64], time_step: f64) -> SdeResult<Self> {
        validate_time_step(time_step)?;
        let last = match requested_times.last() {
            Some(&last) => last,
            None => {
                return Err(SdeError::DegenerateGrid {
                    reason: "requested times must not be empty".to_string(),
                })
            }
        };

        let uniform_points = (last / time_step).ceil() as usize;
        let mut times: Vec<f64> = (0..uniform_points)
            .map(|k| k as f64 * time_step)
            .filter(|&t| t < last)
            .collect();
        if times.is_empty() {
            times.push(0.0);
        }
        times.extend_from_slice(requested_times);
        times.sort_by(f64::total_cmp);
        times.dedup();

        let time_indices = requested_times
            .iter()
            .map(|&t| {
                times
                    .binary_search_by(|candidate| candidate.total_cmp(&t))
                    .map_err(|_| SdeError::DegenerateGrid {
                        reason: format!("requested time {} missing from merged grid", t),
                    })
            })
            .collect::<SdeResult<Vec<usize>>>()?;

        let mut mask = vec![false; times.len()];
        for &index in &time_indices {
            mask[index] = true;
        }

        debug!(
            grid_points = times.len(),
            requested = requested_times.len(),
            time_step,
            "built Euler time grid"
        );

        Ok(Self {
            time_step,
            times,
            mask,
            time_indices,
        })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn time_indices(&self) -> &[usize] {
        &self.time_indices
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of Euler steps, one per consecutive pair of grid points.
    pub fn num_steps(&self) -> usize {
        self.times.len().saturating_sub(1)
    }

    pub fn num_requested(&self) -> usize {
        self.time_indices.len()
    }

    /// Step sizes `times[i+1] - times[i]`.
    pub fn dt(&self) -> Vec<f64> {
        self.times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Upper bound on loop iterations, `ceil(1 / h) + len`. Always at least
    /// `num_steps()`; it bounds the driver loop and never truncates output.
    /// Saturates at `usize::MAX` for very small steps.
    pub fn maximum_iterations(&self) -> usize {
        ((1.0 / self.time_step).ceil() as usize).saturating_add(self.times.len())
    }
}
