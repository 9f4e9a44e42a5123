// src/models/gbm.rs
use super::model::{param_or, ItoProcess, Scalar};
use ndarray::{Array2, Array3, ArrayView2};

/// Component-wise geometric Brownian motion `dX_i = μ X_i dt + σ X_i dW_i`.
///
/// Parameters, in [`ItoProcess::parameters`] order: `[mu, sigma]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gbm {
    pub dim: usize,
    pub mu: f64,
    pub sigma: f64,
}

impl Gbm {
    pub const MU: usize = 0;
    pub const SIGMA: usize = 1;

    pub fn new(dim: usize, mu: f64, sigma: f64) -> Self {
        Gbm { dim, mu, sigma }
    }

    /// Exact log-normal mean `E[X_t] = x0 e^{μt}`.
    pub fn expected_value(&self, x0: f64, t: f64) -> f64 {
        x0 * (self.mu * t).exp()
    }
}

impl ItoProcess for Gbm {
    fn dim(&self) -> usize {
        self.dim
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.mu, self.sigma]
    }

    fn drift<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array2<S> {
        let mu = param_or(params, Self::MU, self.mu);
        state.mapv(|x| x * mu)
    }

    fn volatility<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array3<S> {
        let sigma = param_or(params, Self::SIGMA, self.sigma);
        let (num_samples, dim) = state.dim();
        let mut vol = Array3::from_elem((num_samples, dim, dim), S::zero());
        for ((i, j), &x) in state.indexed_iter() {
            vol[[i, j, j]] = x * sigma;
        }
        vol
    }
}
