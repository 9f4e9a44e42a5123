// src/solvers/euler_maruyama.rs
//! Euler-Maruyama Scheme for SDE Integration
//!
//! # Mathematical Framework
//!
//! For a multi-dimensional Itô process:
//! ```text
//! dX_t = a(t, X_t) dt + b(t, X_t) dW_t
//! ```
//!
//! The Euler-Maruyama scheme on the grid `t_0 < t_1 < ...` is:
//! ```text
//! X_{n+1} = X_n + a(t_{n+1}, X_n) Δt_n + b(t_{n+1}, X_n) · (√Δt_n Z_n)
//! ```
//!
//! Where:
//! - `a(t,x)` is the drift vector, `b(t,x)` the volatility matrix
//! - `Z_n ~ N(0, I)` are the unscaled increments from the increment source
//!
//! Coefficients are evaluated at the end of the step, `t_{n+1}`.
//!
//! # Convergence Properties
//!
//! - **Strong convergence**: Order 0.5 in step size
//! - **Weak convergence**: Order 1.0 in step size

use crate::error::{SdeError, SdeResult};
use crate::mc::grid::TimeGrid;
use crate::mc::increments::IncrementSource;
use crate::models::model::{ItoProcess, Scalar};
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Array3, Axis};
use tracing::trace;

/// Result of one Euler step: the advanced loop index, the updated write
/// cursor and the new state.
#[derive(Debug, Clone)]
pub struct StepOutcome<S> {
    pub index: usize,
    pub written_count: usize,
    pub state: Array2<S>,
}

/// Euler-Maruyama stepper bound to a process and a time grid.
pub struct EulerMaruyama<'a, P> {
    process: &'a P,
    grid: &'a TimeGrid,
    dt: Vec<f64>,
    sqrt_dt: Vec<f64>,
}

impl<'a, P: ItoProcess> EulerMaruyama<'a, P> {
    pub fn new(process: &'a P, grid: &'a TimeGrid) -> Self {
        let dt = grid.dt();
        let sqrt_dt = dt.iter().map(|&h| h.max(0.0).sqrt()).collect();
        EulerMaruyama {
            process,
            grid,
            dt,
            sqrt_dt,
        }
    }

    pub fn grid(&self) -> &TimeGrid {
        self.grid
    }

    pub fn process(&self) -> &P {
        self.process
    }

    pub fn num_steps(&self) -> usize {
        self.dt.len()
    }

    /// Single Euler-Maruyama step from grid point `i` to `i + 1`.
    ///
    /// # Algorithm
    ///
    /// 1. Take the raw draw `Z` for step `i` and scale it by `√Δt_i`
    /// 2. Drift increment: `Δt_i · a(t_{i+1}, X)`
    /// 3. Diffusion increment: `b(t_{i+1}, X) · (√Δt_i Z)` per sample
    /// 4. `X' = X + drift + diffusion`
    /// 5. If `t_{i+1}` is an observation time and an output buffer is
    ///    given, write `X'` into slot `written_count` and advance the cursor
    ///
    /// All samples advance together; the per-sample matrix-vector products
    /// run in parallel.
    pub fn step<S: Scalar>(
        &self,
        i: usize,
        written_count: usize,
        current_state: &Array2<S>,
        increments: &mut IncrementSource,
        params: &[S],
        output: Option<&mut Array3<S>>,
    ) -> SdeResult<StepOutcome<S>> {
        let (num_samples, dim) = current_state.dim();
        let time = self.grid.times()[i + 1];
        let dt = self.dt[i];
        let sqrt_dt = self.sqrt_dt[i];

        let dw = increments.step_draws(i, num_samples, dim)?;
        if dw.dim() != (num_samples, dim) {
            return Err(shape_mismatch(
                "Brownian increments",
                &[num_samples, dim],
                dw.shape(),
            ));
        }

        let drift = self.process.drift(time, current_state.view(), params);
        if drift.dim() != (num_samples, dim) {
            return Err(shape_mismatch("drift", &[num_samples, dim], drift.shape()));
        }

        let vol = self.process.volatility(time, current_state.view(), params);
        if vol.dim() != (num_samples, dim, dim) {
            return Err(shape_mismatch(
                "volatility",
                &[num_samples, dim, dim],
                vol.shape(),
            ));
        }

        let mut next_state = current_state.clone();
        next_state
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(sample, mut x)| {
                let a = drift.row(sample);
                let b = vol.index_axis(Axis(0), sample);
                let z = dw.row(sample);
                for j in 0..dim {
                    let mut diffusion = S::zero();
                    for k in 0..dim {
                        diffusion += b[[j, k]] * (z[k] * sqrt_dt);
                    }
                    x[j] = x[j] + a[j] * dt + diffusion;
                }
            });

        let mut written_count = written_count;
        if self.grid.mask()[i + 1] {
            if let Some(result) = output {
                let slots = result.len_of(Axis(1));
                if written_count >= slots {
                    return Err(shape_mismatch(
                        "output buffer",
                        &[num_samples, written_count + 1, dim],
                        result.shape(),
                    ));
                }
                result
                    .index_axis_mut(Axis(1), written_count)
                    .assign(&next_state);
                trace!(step = i, time, slot = written_count, "recorded observation");
            }
            written_count += 1;
        }

        Ok(StepOutcome {
            index: i + 1,
            written_count,
            state: next_state,
        })
    }
}

fn shape_mismatch(operation: &str, expected: &[usize], actual: &[usize]) -> SdeError {
    SdeError::ShapeMismatch {
        operation: operation.to_string(),
        expected: expected.to_vec(),
        actual: actual.to_vec(),
    }
}
