//! # euler-sde: Euler-Maruyama Sampling of Itô Processes
//!
//! A Rust library for simulating sample paths of multi-dimensional Itô
//! processes on arbitrary observation times, with forward-mode
//! sensitivities of the paths.
//!
//! ## Key Features
//!
//! - **Exact observation times**: requested times are merged into the
//!   uniform step grid, so outputs land exactly on them
//! - **Random sources**: pseudo-random, stateless, antithetic, Sobol and
//!   (randomized) Halton increments
//! - **Two drivers**: a bulk loop and a dual-number driver returning
//!   derivatives with respect to process parameters and the initial state
//! - **Parallel**: samples advance together, per-sample updates run on Rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use euler_sde::models::OuProcess;
//! use euler_sde::{sample, RandomType, SampleConfig};
//!
//! let process = OuProcess::new(1, 1.0, 0.0, 0.3);
//! let config = SampleConfig {
//!     time_step: 0.01,
//!     num_samples: 1_000,
//!     initial_state: Some(vec![1.0]),
//!     random_type: RandomType::Sobol,
//!     ..Default::default()
//! };
//!
//! let paths = sample(&process, &[0.5, 1.0], &config).expect("valid configuration");
//! assert_eq!(paths.dim(), (1_000, 2, 1));
//! ```
//!
//! ## Mathematical Foundation
//!
//! For `dX = a(t, X) dt + b(t, X) dW` the scheme advances every sample by
//! `X' = X + a Δt + b √Δt Z` with `Z ~ N(0, I)`, evaluating the
//! coefficients at the end of each step.

// Module declarations
pub mod error;
pub mod rng;
pub mod math_utils;
pub mod models;
pub mod solvers;
pub mod mc;
pub mod output;

// Re-export commonly used types for convenience
pub use error::{SdeError, SdeResult};
pub use mc::{sample, sample_with_sensitivities, PathSensitivities, SampleConfig, TimeGrid};
pub use models::{ItoProcess, Scalar};
pub use rng::RandomType;
