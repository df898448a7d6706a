//! Vector workloads: wide element-wise operations.

use serde::{Deserialize, Serialize};

use crate::compute::{compute_execution_ms, ComputeParams, ComputeWorkload};
use crate::id::TaskId;
use crate::status::VectorOp;
use crate::task::{truncate_ms, TaskCore, Workload};

/// Speedup applied once the task has been optimized.
const OPTIMIZED_FACTOR: f64 = 0.7;

/// A compute workload applying one operation across a wide vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorTask {
    core: TaskCore,
    compute: ComputeParams,
    vector_size: u32,
    operation: Option<VectorOp>,
    optimized: bool,
}

impl VectorTask {
    /// Build a vector task. All inputs are normalized immediately.
    pub fn new(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        compute_units: i32,
        batch_size: i32,
        vector_size: i32,
        operation: Option<VectorOp>,
    ) -> Self {
        let mut task = Self {
            core: TaskCore::new(id, priority, memory_size),
            compute: ComputeParams::new(compute_units, batch_size),
            vector_size: vector_size.max(1) as u32,
            operation,
            optimized: false,
        };
        task.recalculate();
        task
    }

    /// Number of vector lanes, at least 1.
    pub fn vector_size(&self) -> u32 {
        self.vector_size
    }

    /// Set the lane count; values below 1 clamp to 1.
    pub fn set_vector_size(&mut self, size: i32) {
        self.vector_size = size.max(1) as u32;
        self.recalculate();
    }

    /// The element-wise operation, if any.
    pub fn operation(&self) -> Option<VectorOp> {
        self.operation
    }

    /// Change the element-wise operation.
    pub fn set_operation(&mut self, operation: Option<VectorOp>) {
        self.operation = operation;
        self.recalculate();
    }

    /// Whether the one-way optimization has been applied.
    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Apply the one-way optimization. Idempotent: the first call scales
    /// the derived time, later calls change nothing.
    pub fn optimize(&mut self) {
        if !self.optimized {
            self.optimized = true;
            self.recalculate();
        }
    }
}

impl Workload for VectorTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let compute_ms = compute_execution_ms(&self.core, &self.compute);
        let ms = match self.operation {
            // Without an operation the vector adjustment is skipped.
            None => compute_ms,
            Some(operation) => {
                let optimization = if self.optimized { OPTIMIZED_FACTOR } else { 1.0 };
                truncate_ms(
                    compute_ms as f64
                        * size_factor(self.vector_size)
                        * operation_factor(operation)
                        * optimization,
                )
            }
        };
        self.core.set_execution_ms(ms);
    }
}

impl ComputeWorkload for VectorTask {
    fn compute(&self) -> &ComputeParams {
        &self.compute
    }

    fn compute_mut(&mut self) -> &mut ComputeParams {
        &mut self.compute
    }
}

/// Lane contribution: log base 2 of the lane count, floored at 1.
fn size_factor(vector_size: u32) -> f64 {
    f64::from(vector_size.max(2)).log10() / 2f64.log10()
}

fn operation_factor(operation: VectorOp) -> f64 {
    match operation {
        VectorOp::Add => 1.0,
        VectorOp::Mul => 1.2,
        VectorOp::Reduce => 1.5,
    }
}
