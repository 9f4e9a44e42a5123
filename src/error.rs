// src/error.rs
use thiserror::Error;

/// Custom error types for the euler-sde library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdeError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid sampler configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Time grid cannot be built from the requested times and step
    #[error("Degenerate time grid: {reason}")]
    DegenerateGrid { reason: String },

    /// Drift, volatility or increments disagree with the declared shape
    #[error("Shape mismatch in {operation}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// RNG or random number generation error
    #[error("Random number generation error: {reason}")]
    RandomGeneration { reason: String },

    /// Numerical instability or an incomplete simulation
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

/// Result type alias for euler-sde operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        if value.is_nan() || value < 0.0 {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate the Euler step size. A non-positive step cannot produce a grid.
    pub fn validate_time_step(time_step: f64) -> SdeResult<()> {
        if !time_step.is_finite() || time_step <= 0.0 {
            Err(SdeError::DegenerateGrid {
                reason: format!("time_step must be finite and positive, got {}", time_step),
            })
        } else {
            Ok(())
        }
    }

    /// Validate requested observation times: non-empty, finite, non-negative
    /// and strictly increasing.
    pub fn validate_times(times: &[f64]) -> SdeResult<()> {
        if times.is_empty() {
            return Err(SdeError::DegenerateGrid {
                reason: "requested times must not be empty".to_string(),
            });
        }
        for (k, &t) in times.iter().enumerate() {
            validate_finite(&format!("times[{}]", k), t)?;
            validate_non_negative(&format!("times[{}]", k), t)?;
        }
        if let Some(k) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SdeError::InvalidParameters {
                parameter: format!("times[{}]", k + 1),
                value: times[k + 1],
                constraint: format!("must be strictly greater than times[{}] = {}", k, times[k]),
            });
        }
        Ok(())
    }

    /// Validate sample path count
    pub fn validate_samples(num_samples: usize) -> SdeResult<()> {
        if num_samples == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "num_samples".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate process dimension
    pub fn validate_dim(dim: usize) -> SdeResult<()> {
        if dim == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "dim".to_string(),
                reason: "process dimension must be at least 1".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
