// src/mc/mc_engine.rs
use crate::error::{validation::*, SdeError, SdeResult};
use crate::mc::driver::{BulkDriver, PathDriver, PathSensitivities, SensitivityDriver};
use crate::mc::grid::TimeGrid;
use crate::mc::increments::IncrementSource;
use crate::models::model::ItoProcess;
use crate::rng::{self, RandomType};
use crate::solvers::EulerMaruyama;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sampling configuration shared by [`sample`] and
/// [`sample_with_sensitivities`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub time_step: f64,
    pub num_samples: usize,
    /// Starting point of every path; zeros when absent.
    pub initial_state: Option<Vec<f64>>,
    pub random_type: RandomType,
    pub seed: Option<u64>,
    /// Leading low-discrepancy points to discard.
    pub skip: u64,
    pub precompute_normal_draws: bool,
    /// Indices into [`ItoProcess::parameters`]; `Some` selects the
    /// sensitivity driver.
    pub watch_params: Option<Vec<usize>>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            time_step: 0.01,
            num_samples: 1,
            initial_state: None,
            random_type: RandomType::Pseudo,
            seed: None,
            skip: 0,
            precompute_normal_draws: true,
            watch_params: None,
        }
    }
}

impl SampleConfig {
    /// Validate the configuration against a process of dimension `dim`
    /// exposing `num_params` parameters.
    pub fn validate(&self, dim: usize, num_params: usize) -> SdeResult<()> {
        validate_time_step(self.time_step)?;
        validate_samples(self.num_samples)?;
        validate_dim(dim)?;

        if let Some(x0) = &self.initial_state {
            if x0.len() != dim {
                return Err(SdeError::InvalidConfiguration {
                    field: "initial_state".to_string(),
                    reason: format!("expected {} components, got {}", dim, x0.len()),
                });
            }
            for (c, &value) in x0.iter().enumerate() {
                validate_finite(&format!("initial_state[{}]", c), value)?;
            }
        }

        if let Some(watched) = &self.watch_params {
            if let Some(&bad) = watched.iter().find(|&&j| j >= num_params) {
                return Err(SdeError::InvalidConfiguration {
                    field: "watch_params".to_string(),
                    reason: format!(
                        "index {} out of range for {} process parameters",
                        bad, num_params
                    ),
                });
            }
        }

        if self.random_type.requires_seed() && self.seed.is_none() {
            return Err(SdeError::RandomGeneration {
                reason: format!("{:?} sampling requires a seed", self.random_type),
            });
        }
        if self.random_type.is_antithetic() && self.num_samples % 2 != 0 {
            return Err(SdeError::RandomGeneration {
                reason: format!(
                    "{:?} requires an even number of samples, got {}",
                    self.random_type, self.num_samples
                ),
            });
        }

        Ok(())
    }

    /// Parse a configuration from TOML; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> SdeResult<Self> {
        toml::from_str(source).map_err(|e| SdeError::InvalidConfiguration {
            field: "toml".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Euler-Maruyama sampling of an Itô process
///
/// # Math Framework
///
/// Simulates
/// ```text
/// dX_t = a(t, X_t) dt + b(t, X_t) dW_t,   X_0 = x_0
/// ```
/// on the merged grid of `times` and the uniform step grid, returning the
/// states at exactly the requested `times`.
///
/// # Returns
///
/// Array of shape `[num_samples, times.len(), dim]`.
///
/// # Errors
///
/// Returns `SdeError` for:
/// - Empty or non-increasing `times`, or a non-positive `time_step`
/// - Inconsistent configuration (dimension, initial state, watched parameters)
/// - Random types missing a seed or needing an even sample count
/// - Drift/volatility returning unexpected shapes
pub fn sample<P: ItoProcess>(
    process: &P,
    times: &[f64],
    config: &SampleConfig,
) -> SdeResult<Array3<f64>> {
    let run = SamplingRun::prepare(process, times, config)?;
    let stepper = EulerMaruyama::new(process, &run.grid);

    match &config.watch_params {
        Some(watched) => {
            debug!(watched = watched.len(), "using sensitivity driver");
            SensitivityDriver::new(watched.clone()).drive(
                &stepper,
                &run.initial_state,
                run.increments,
                &run.params,
            )
        }
        None => {
            debug!("using bulk driver");
            BulkDriver.drive(&stepper, &run.initial_state, run.increments, &run.params)
        }
    }
}

/// Like [`sample`], and also returns the forward-mode derivatives of the
/// paths with respect to the watched parameters and the initial state.
/// With `watch_params = None` no parameter is watched.
pub fn sample_with_sensitivities<P: ItoProcess>(
    process: &P,
    times: &[f64],
    config: &SampleConfig,
) -> SdeResult<PathSensitivities> {
    let run = SamplingRun::prepare(process, times, config)?;
    let stepper = EulerMaruyama::new(process, &run.grid);
    let watched = config.watch_params.clone().unwrap_or_default();

    SensitivityDriver::new(watched).drive_with_tangents(
        &stepper,
        &run.initial_state,
        run.increments,
        &run.params,
    )
}

/// Everything a driver needs, built once per call.
struct SamplingRun {
    grid: TimeGrid,
    initial_state: Array2<f64>,
    increments: IncrementSource,
    params: Vec<f64>,
}

impl SamplingRun {
    fn prepare<P: ItoProcess>(process: &P, times: &[f64], config: &SampleConfig) -> SdeResult<Self> {
        let dim = process.dim();
        let params = process.parameters();
        validate_times(times)?;
        config.validate(dim, params.len())?;

        let grid = TimeGrid::new(times, config.time_step)?;

        let initial_state = match &config.initial_state {
            Some(x0) => Array2::from_shape_fn((config.num_samples, dim), |(_, c)| x0[c]),
            None => Array2::zeros((config.num_samples, dim)),
        };

        if config.skip > 0 && !config.random_type.is_low_discrepancy() {
            warn!(
                skip = config.skip,
                random_type = ?config.random_type,
                "skip only affects low-discrepancy sequences; ignoring"
            );
        }

        let seed = rng::resolve_seed(config.seed);
        let increments = IncrementSource::new(
            config.random_type,
            dim,
            grid.num_steps(),
            config.num_samples,
            seed,
            config.skip,
            config.precompute_normal_draws,
        )?;

        Ok(SamplingRun {
            grid,
            initial_state,
            increments,
            params,
        })
    }
}
