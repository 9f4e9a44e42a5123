// src/mc/driver.rs
//! Path drivers: run the Euler step over every grid step.
//!
//! - [`BulkDriver`]: plain bounded loop writing observations into a
//!   preallocated `[num_samples, num_requested, dim]` buffer through a
//!   running write cursor.
//! - [`SensitivityDriver`]: carries the state functionally in dual numbers
//!   through [`for_loop`], recording the states at the observation grid
//!   indices, and returns forward-mode tangents with respect to the watched
//!   parameters and the initial state.

use crate::error::{SdeError, SdeResult};
use crate::mc::increments::IncrementSource;
use crate::models::model::{ItoProcess, Scalar};
use crate::solvers::EulerMaruyama;
use ndarray::{stack, Array2, Array3, ArrayView2, Axis};
use num_dual::Dual64;
use rayon::prelude::*;
use tracing::debug;

/// Common interface of the two stepping strategies.
pub trait PathDriver {
    /// Runs all steps and returns the states at the requested times,
    /// shape `[num_samples, num_requested, dim]`.
    fn drive<P: ItoProcess>(
        &self,
        stepper: &EulerMaruyama<'_, P>,
        initial_state: &Array2<f64>,
        increments: IncrementSource,
        params: &[f64],
    ) -> SdeResult<Array3<f64>>;
}

/// Bulk stepping without derivative tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkDriver;

impl PathDriver for BulkDriver {
    fn drive<P: ItoProcess>(
        &self,
        stepper: &EulerMaruyama<'_, P>,
        initial_state: &Array2<f64>,
        mut increments: IncrementSource,
        params: &[f64],
    ) -> SdeResult<Array3<f64>> {
        let grid = stepper.grid();
        let (num_samples, dim) = initial_state.dim();
        let num_requested = grid.num_requested();
        let num_steps = stepper.num_steps();

        let mut result = Array3::<f64>::zeros((num_samples, num_requested, dim));
        let mut written_count = 0;
        if grid.mask()[0] {
            result
                .index_axis_mut(Axis(1), 0)
                .assign(initial_state);
            written_count = 1;
        }

        let maximum_iterations = grid.maximum_iterations();
        debug!(num_steps, maximum_iterations, "bulk driver start");

        let mut i = 0;
        let mut current_state = initial_state.clone();
        for _ in 0..maximum_iterations {
            if i >= num_steps {
                break;
            }
            let outcome = stepper.step(
                i,
                written_count,
                &current_state,
                &mut increments,
                params,
                Some(&mut result),
            )?;
            i = outcome.index;
            written_count = outcome.written_count;
            current_state = outcome.state;
        }

        if written_count != num_requested {
            return Err(SdeError::NumericalInstability {
                method: "bulk Euler driver".to_string(),
                reason: format!(
                    "wrote {} of {} observation slots after {} steps",
                    written_count, num_requested, i
                ),
            });
        }

        Ok(result)
    }
}

/// Derivative direction seeded in one dual-number pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// No seeded tangent; the pass only carries values.
    Unseeded,
    Parameter(usize),
    InitialState(usize),
}

/// Sampled paths plus their forward-mode tangents.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSensitivities {
    /// `[num_samples, num_requested, dim]`
    pub paths: Array3<f64>,
    /// Indices into [`ItoProcess::parameters`] that were watched.
    pub watched: Vec<usize>,
    /// `d paths / d parameters[watched[j]]`, one array per watched parameter.
    pub params: Vec<Array3<f64>>,
    /// `d paths / d initial_state[c]`, one array per state component.
    pub initial_state: Vec<Array3<f64>>,
}

/// Differentiable stepping: every derivative direction is one dual-number
/// pass over the same increments, passes run in parallel. Through
/// [`PathDriver::drive`] only one unseeded pass runs.
#[derive(Debug, Clone, Default)]
pub struct SensitivityDriver {
    watch_params: Vec<usize>,
}

impl SensitivityDriver {
    pub fn new(watch_params: Vec<usize>) -> Self {
        Self { watch_params }
    }

    pub fn watch_params(&self) -> &[usize] {
        &self.watch_params
    }

    pub fn drive_with_tangents<P: ItoProcess>(
        &self,
        stepper: &EulerMaruyama<'_, P>,
        initial_state: &Array2<f64>,
        increments: IncrementSource,
        params: &[f64],
    ) -> SdeResult<PathSensitivities> {
        let (_, dim) = initial_state.dim();
        self.check_watched(params.len())?;

        let directions: Vec<Direction> = self
            .watch_params
            .iter()
            .map(|&j| Direction::Parameter(j))
            .chain((0..dim).map(Direction::InitialState))
            .collect();
        debug!(
            passes = directions.len(),
            watched = self.watch_params.len(),
            "sensitivity driver start"
        );

        let passes = directions
            .par_iter()
            .map(|&direction| {
                self.dual_pass(stepper, initial_state, increments.clone(), params, direction)
            })
            .collect::<SdeResult<Vec<Array3<Dual64>>>>()?;

        let paths = passes
            .first()
            .map(|pass| pass.mapv(|x| x.re))
            .ok_or_else(|| SdeError::InvalidConfiguration {
                field: "dim".to_string(),
                reason: "no derivative directions to propagate".to_string(),
            })?;

        let mut tangents = passes.iter().map(|pass| pass.mapv(|x| x.eps));
        let param_tangents: Vec<Array3<f64>> =
            tangents.by_ref().take(self.watch_params.len()).collect();
        let state_tangents: Vec<Array3<f64>> = tangents.collect();

        Ok(PathSensitivities {
            paths,
            watched: self.watch_params.clone(),
            params: param_tangents,
            initial_state: state_tangents,
        })
    }

    fn check_watched(&self, num_params: usize) -> SdeResult<()> {
        match self.watch_params.iter().find(|&&j| j >= num_params) {
            Some(&bad) => Err(SdeError::InvalidConfiguration {
                field: "watch_params".to_string(),
                reason: format!(
                    "index {} out of range for {} process parameters",
                    bad, num_params
                ),
            }),
            None => Ok(()),
        }
    }

    fn dual_pass<P: ItoProcess>(
        &self,
        stepper: &EulerMaruyama<'_, P>,
        initial_state: &Array2<f64>,
        mut increments: IncrementSource,
        params: &[f64],
        direction: Direction,
    ) -> SdeResult<Array3<Dual64>> {
        let grid = stepper.grid();
        let dual_params: Vec<Dual64> = params
            .iter()
            .enumerate()
            .map(|(j, &p)| {
                let seed = if direction == Direction::Parameter(j) { 1.0 } else { 0.0 };
                Dual64::new(p, seed)
            })
            .collect();
        let dual_state = Array2::from_shape_fn(initial_state.dim(), |(i, c)| {
            let seed = if direction == Direction::InitialState(c) { 1.0 } else { 0.0 };
            Dual64::new(initial_state[[i, c]], seed)
        });

        let num_time_points = grid.num_requested();
        let record_at: Vec<usize> = if num_time_points == 1 {
            vec![stepper.num_steps()]
        } else {
            grid.time_indices().to_vec()
        };

        let states = for_loop(
            |i, state: &Array2<Dual64>| {
                stepper
                    .step(i, 0, state, &mut increments, &dual_params, None)
                    .map(|outcome| outcome.state)
            },
            dual_state,
            &record_at,
        )?;

        if num_time_points == 1 {
            let state = states.into_iter().next().ok_or_else(|| SdeError::NumericalInstability {
                method: "sensitivity driver".to_string(),
                reason: "no state recorded".to_string(),
            })?;
            return Ok(state.insert_axis(Axis(1)));
        }

        let views: Vec<ArrayView2<'_, Dual64>> = states.iter().map(|s| s.view()).collect();
        let stacked = stack(Axis(0), &views).map_err(|e| SdeError::ShapeMismatch {
            operation: format!("stacking recorded states ({})", e),
            expected: vec![num_time_points],
            actual: vec![views.len()],
        })?;
        Ok(stacked
            .permuted_axes([1, 0, 2])
            .as_standard_layout()
            .into_owned())
    }
}

impl PathDriver for SensitivityDriver {
    fn drive<P: ItoProcess>(
        &self,
        stepper: &EulerMaruyama<'_, P>,
        initial_state: &Array2<f64>,
        increments: IncrementSource,
        params: &[f64],
    ) -> SdeResult<Array3<f64>> {
        self.check_watched(params.len())?;
        debug!("sensitivity driver start, values only");
        self.dual_pass(stepper, initial_state, increments, params, Direction::Unseeded)
            .map(|pass| pass.mapv(|x| x.re))
    }
}

/// Runs `body` functionally from `initial_state` and returns the state after
/// each iteration count in `record_at` (ascending; `0` records the initial
/// state). Iterates exactly `max(record_at)` times.
pub fn for_loop<S, F>(
    mut body: F,
    initial_state: Array2<S>,
    record_at: &[usize],
) -> SdeResult<Vec<Array2<S>>>
where
    S: Scalar,
    F: FnMut(usize, &Array2<S>) -> SdeResult<Array2<S>>,
{
    if record_at.windows(2).any(|w| w[1] < w[0]) {
        return Err(SdeError::InvalidConfiguration {
            field: "record_at".to_string(),
            reason: "iteration indices must be ascending".to_string(),
        });
    }
    let num_iterations = record_at.last().copied().unwrap_or(0);

    let mut recorded = Vec::with_capacity(record_at.len());
    let mut cursor = 0;
    let mut state = initial_state;
    for i in 0..=num_iterations {
        while cursor < record_at.len() && record_at[cursor] == i {
            recorded.push(state.clone());
            cursor += 1;
        }
        if i == num_iterations {
            break;
        }
        state = body(i, &state)?;
    }
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn for_loop_records_requested_iterations() {
        let states = for_loop(
            |_, s: &Array2<f64>| Ok(s.mapv(|x| x + 1.0)),
            array![[0.0, 10.0]],
            &[0, 2, 5],
        )
        .unwrap();

        assert_eq!(states.len(), 3);
        assert_eq!(states[0], array![[0.0, 10.0]]);
        assert_eq!(states[1], array![[2.0, 12.0]]);
        assert_eq!(states[2], array![[5.0, 15.0]]);
    }

    #[test]
    fn for_loop_runs_exactly_to_last_index() {
        let mut calls = 0;
        let _ = for_loop(
            |_, s: &Array2<f64>| {
                calls += 1;
                Ok(s.clone())
            },
            array![[1.0]],
            &[3],
        )
        .unwrap();
        assert_eq!(calls, 3);
    }

    #[test]
    fn for_loop_propagates_body_errors() {
        let result = for_loop(
            |i, s: &Array2<f64>| {
                if i == 1 {
                    Err(SdeError::NumericalInstability {
                        method: "test".to_string(),
                        reason: "boom".to_string(),
                    })
                } else {
                    Ok(s.clone())
                }
            },
            array![[1.0]],
            &[4],
        );
        assert!(result.is_err());
    }

    #[test]
    fn for_loop_rejects_unsorted_indices() {
        let result = for_loop(|_, s: &Array2<f64>| Ok(s.clone()), array![[1.0]], &[2, 1]);
        assert!(matches!(result, Err(SdeError::InvalidConfiguration { .. })));
    }
}
