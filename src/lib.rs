//! Synthetic load-testing harness.
//!
//! - [`work`]: the CPU/memory churn routine behind `GET /work`
//! - [`aggregator`]: completion counting and throughput samples
//! - [`driver`]: concurrent request rounds against the target

pub mod aggregator;
pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod memory;
pub mod profile;
pub mod telemetry;
pub mod work;

pub use error::{FollyError, Result};
