//! Concurrent execution engine for simulated NPU workloads.
//!
//! Tasks are submitted to an explicitly constructed [`ExecutionEngine`],
//! run as independent units of simulated work on the tokio runtime, and
//! tracked by identity while in flight.

#![warn(missing_docs)]

pub mod engine;
pub mod handle;

pub use engine::{EngineConfig, ExecutionEngine};
pub use handle::TaskHandle;
