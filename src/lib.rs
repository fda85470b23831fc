//! Benchmark harness that streams a configurable number of multipart/mixed
//! file entities to an HTTP endpoint in one POST and records the elapsed
//! time in a timer registry.

pub mod cli;
pub mod error;
pub mod metrics;
pub mod multipart;
pub mod protocol;
pub mod sink;
pub mod stream;

pub use error::{BenchError, Result};
