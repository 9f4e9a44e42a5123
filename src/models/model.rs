// src/models/model.rs
use ndarray::{Array2, Array3, ArrayView2};
use num_dual::Dual64;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Arithmetic the Euler step needs from a state value.
///
/// Implemented for `f64` (bulk sampling) and for forward-mode dual numbers
/// (sensitivity sampling), so a process written once against `Scalar`
/// serves both drivers.
pub trait Scalar:
    Copy
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
{
    fn from_f64(value: f64) -> Self;

    /// Real part, dropping any derivative information.
    fn value(&self) -> f64;

    fn zero() -> Self {
        Self::from_f64(0.0)
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }
}

impl Scalar for Dual64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Dual64::new(value, 0.0)
    }

    #[inline]
    fn value(&self) -> f64 {
        self.re
    }
}

/// A multi-dimensional Itô process `dX = a(t, X) dt + b(t, X) dW`.
///
/// States arrive batched as `[num_samples, dim]`. `params` holds the
/// process's own scalar parameters (same order as [`ItoProcess::parameters`])
/// lifted into `S`; reading them from `params` instead of `self` is what makes
/// them differentiable in sensitivity mode.
pub trait ItoProcess: Sync {
    fn dim(&self) -> usize;

    fn parameters(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Drift `a(t, X)`, shape `[num_samples, dim]`.
    fn drift<S: Scalar>(&self, t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array2<S>;

    /// Volatility `b(t, X)`, shape `[num_samples, dim, dim]`.
    fn volatility<S: Scalar>(&self, t: f64, state: ArrayView2<'_, S>, params: &[S]) -> Array3<S>;
}

/// Looks up a lifted parameter, falling back to the plain value.
pub(crate) fn param_or<S: Scalar>(params: &[S], index: usize, fallback: f64) -> S {
    params
        .get(index)
        .copied()
        .unwrap_or_else(|| S::from_f64(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_scalar_keeps_real_part() {
        let x = Dual64::new(2.0, 1.0);
        let y = <Dual64 as Scalar>::from_f64(3.0);
        let z = x * y + x * 0.5_f64;
        assert_eq!(z.value(), 7.0);
        assert_eq!(z.eps, 3.5);
    }

    #[test]
    fn param_or_falls_back() {
        let params = [1.5_f64];
        assert_eq!(param_or(&params, 0, 9.0), 1.5);
        assert_eq!(param_or(&params, 1, 9.0), 9.0);
    }
}
