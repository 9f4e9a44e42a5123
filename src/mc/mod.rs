// src/mc/mod.rs
pub mod driver;
pub mod grid;
pub mod increments;
pub mod mc_engine;

pub use driver::{for_loop, BulkDriver, PathDriver, PathSensitivities, SensitivityDriver};
pub use grid::TimeGrid;
pub use increments::IncrementSource;
pub use mc_engine::{sample, sample_with_sensitivities, SampleConfig};
