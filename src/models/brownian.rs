// src/models/brownian.rs
use super::model::{ItoProcess, Scalar};
use crate::error::{SdeError, SdeResult};
use ndarray::{Array2, Array3, ArrayView2};

/// Driftless Brownian motion with a constant volatility matrix,
/// `dX = B dW`. The covariance of `X_t` is `B Bᵀ t`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrownianMotion {
    volatility: Array2<f64>,
}

impl BrownianMotion {
    pub fn new(volatility: Array2<f64>) -> SdeResult<Self> {
        let (rows, cols) = volatility.dim();
        if rows == 0 || rows != cols {
            return Err(SdeError::ShapeMismatch {
                operation: "BrownianMotion volatility".to_string(),
                expected: vec![rows.max(1), rows.max(1)],
                actual: vec![rows, cols],
            });
        }
        Ok(Self { volatility })
    }

    /// Independent standard Brownian motions in `dim` dimensions.
    pub fn standard(dim: usize) -> SdeResult<Self> {
        Self::new(Array2::eye(dim))
    }

    pub fn covariance(&self, t: f64) -> Array2<f64> {
        self.volatility.dot(&self.volatility.t()) * t
    }
}

impl ItoProcess for BrownianMotion {
    fn dim(&self) -> usize {
        self.volatility.nrows()
    }

    fn drift<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, _params: &[S]) -> Array2<S> {
        Array2::from_elem(state.dim(), S::zero())
    }

    fn volatility<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, _params: &[S]) -> Array3<S> {
        let num_samples = state.nrows();
        let dim = self.dim();
        Array3::from_shape_fn((num_samples, dim, dim), |(_, j, k)| {
            S::from_f64(self.volatility[[j, k]])
        })
    }
}
