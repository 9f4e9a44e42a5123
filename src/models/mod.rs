// src/models/mod.rs
//! Itô process interface and the reference processes used by tests,
//! benchmarks and demos.

pub mod brownian;
pub mod gbm;
pub mod model;
pub mod ou_process;

pub use brownian::BrownianMotion;
pub use gbm::Gbm;
pub use model::{ItoProcess, Scalar};
pub use ou_process::OuProcess;
