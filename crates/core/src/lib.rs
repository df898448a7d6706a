//! npusim core data model.
//!
//! This crate defines the simulated NPU workload entities: the task core
//! shared by every variant, the specialized variants themselves, and the
//! derivation rules that keep execution time, efficiency, and power
//! consistent with the current parameters.

#![warn(missing_docs)]

// Identity and tags
mod id;
mod status;

// Shared task core
mod task;

// Compute lineage
mod compute;
mod tensor;
mod vector;

// Specialized leaves
mod memory;
mod sync;

// Re-exports
pub use id::TaskId;
pub use status::{MemoryTier, Quantization, Status, SyncMode, UnknownName, VectorOp};

pub use task::{NpuTask, TaskCore, Workload, PRIORITY_MAX, PRIORITY_MIN};

pub use compute::{ComputeParams, ComputeTask, ComputeWorkload};
pub use tensor::{TensorTask, MAX_SPARSITY};
pub use vector::VectorTask;

pub use memory::MemoryTask;
pub use sync::SyncTask;
