// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::SQRT_2;

/// Smallest distance from 0 and 1 that uniforms are clamped to before the
/// inverse CDF, so low-discrepancy points never map to ±∞.
const UNIFORM_CLAMP: f64 = 1e-12;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Standard normal quantile function Φ⁻¹(u) = -√2 · erfc⁻¹(2u).
pub fn norm_inv(u: f64) -> f64 {
    let u = u.clamp(UNIFORM_CLAMP, 1.0 - UNIFORM_CLAMP);
    -SQRT_2 * erf::erfc_inv(2.0 * u)
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_norm_inv_known_quantiles() {
        assert_abs_diff_eq!(norm_inv(0.5), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_inv(0.975), 1.959963984540054, epsilon = 1e-9);
        assert_abs_diff_eq!(norm_inv(0.025), -1.959963984540054, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_inv_inverts_cdf() {
        for &x in &[-2.5, -0.3, 0.0, 1.1, 3.0] {
            assert_abs_diff_eq!(norm_inv(norm_cdf(x)), x, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_norm_inv_is_finite_at_bounds() {
        assert!(norm_inv(0.0).is_finite());
        assert!(norm_inv(1.0).is_finite());
        assert!(norm_inv(0.0) < -6.0);
    }
}
