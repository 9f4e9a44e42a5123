// src/models/ou_process.rs
use super::model::{param_or, ItoProcess, Scalar};
use ndarray::{Array2, Array3, ArrayView2};

/// Ornstein-Uhlenbeck process `dX_i = θ (μ - X_i) dt + σ dW_i`, applied
/// independently to every component.
///
/// Parameters, in [`ItoProcess::parameters`] order: `[theta, mu, sigma]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuProcess {
    pub dim: usize,
    pub theta: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl OuProcess {
    pub const THETA: usize = 0;
    pub const MU: usize = 1;
    pub const SIGMA: usize = 2;

    pub fn new(dim: usize, theta: f64, mu: f64, sigma: f64) -> Self {
        OuProcess {
            dim,
            theta,
            mu,
            sigma,
        }
    }

    pub fn exact_mean(&self, x0: f64, t: f64) -> f64 {
        self.mu + (x0 - self.mu) * (-self.theta * t).exp()
    }

    pub fn exact_variance(&self, t: f64) -> f64 {
        if self.theta == 0.0 {
            return self.sigma * self.sigma * t;
        }
        self.sigma * self.sigma / (2.0 * self.theta) * (1.0 - (-2.0 * self.theta * t).exp())
    }
}

impl ItoProcess for OuProcess {
    fn dim(&self) -> usize {
        self.dim
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.theta, self.mu, self.sigma]
    }

    fn drift<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array2<S> {
        let theta = param_or(params, Self::THETA, self.theta);
        let mu = param_or(params, Self::MU, self.mu);
        state.mapv(|x| theta * (mu - x))
    }

    fn volatility<S: Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array3<S> {
        let sigma = param_or(params, Self::SIGMA, self.sigma);
        let (num_samples, dim) = state.dim();
        let mut vol = Array3::from_elem((num_samples, dim, dim), S::zero());
        for i in 0..num_samples {
            for j in 0..dim {
                vol[[i, j, j]] = sigma;
            }
        }
        vol
    }
}
