//! Compute-capable workloads: parallel units working through even batches.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;
use crate::task::{truncate_ms, TaskCore, Workload};

/// Parameters shared by every compute-capable variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeParams {
    compute_units: u32,
    batch_size: u32,
    efficiency: f64,
}

impl ComputeParams {
    pub(crate) fn new(compute_units: i32, batch_size: i32) -> Self {
        let mut params = Self {
            compute_units: 1,
            batch_size: 2,
            efficiency: 0.0,
        };
        params.set_units(compute_units);
        params.set_batch(batch_size);
        params
    }

    pub(crate) fn set_units(&mut self, units: i32) {
        self.compute_units = units.max(1) as u32;
        self.refresh_efficiency();
    }

    /// Batch sizes are floored to the nearest even value, never below 2.
    pub(crate) fn set_batch(&mut self, batch: i32) {
        self.batch_size = ((batch / 2) * 2).max(2) as u32;
        self.refresh_efficiency();
    }

    fn refresh_efficiency(&mut self) {
        self.efficiency = self.compute_units as f64 * self.batch_size as f64 / 100.0;
    }

    /// Multiplicative adjustment this parameter set contributes on top
    /// of the base derivation: more units shrink the time, larger
    /// batches stretch it.
    pub(crate) fn time_factor(&self) -> f64 {
        (1.0 / self.compute_units as f64) * (self.batch_size as f64 / 16.0)
    }
}

/// Execution time after the compute adjustment, truncated like every
/// derivation level.
pub(crate) fn compute_execution_ms(core: &TaskCore, params: &ComputeParams) -> u64 {
    truncate_ms(core.base_execution_ms() as f64 * params.time_factor())
}

/// Parameter surface shared by compute-capable workloads.
pub trait ComputeWorkload: Workload {
    /// Compute parameters of this task.
    fn compute(&self) -> &ComputeParams;

    /// Mutable access to the compute parameters.
    fn compute_mut(&mut self) -> &mut ComputeParams;

    /// Number of compute units, at least 1.
    fn compute_units(&self) -> u32 {
        self.compute().compute_units
    }

    /// Set the unit count; values below 1 clamp to 1.
    fn set_compute_units(&mut self, units: i32) {
        self.compute_mut().set_units(units);
        self.recalculate();
    }

    /// Batch size: an even value of at least 2.
    fn batch_size(&self) -> u32 {
        self.compute().batch_size
    }

    /// Set the batch size, floored to the nearest even value >= 2.
    fn set_batch_size(&mut self, batch: i32) {
        self.compute_mut().set_batch(batch);
        self.recalculate();
    }

    /// Derived throughput efficiency: `units * batch / 100`.
    fn efficiency(&self) -> f64 {
        self.compute().efficiency
    }
}

/// A workload dominated by raw computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeTask {
    core: TaskCore,
    compute: ComputeParams,
}

impl ComputeTask {
    /// Build a compute task. All inputs are normalized immediately.
    pub fn new(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        compute_units: i32,
        batch_size: i32,
    ) -> Self {
        let mut task = Self {
            core: TaskCore::new(id, priority, memory_size),
            compute: ComputeParams::new(compute_units, batch_size),
        };
        task.recalculate();
        task
    }
}

impl Workload for ComputeTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let ms = compute_execution_ms(&self.core, &self.compute);
        self.core.set_execution_ms(ms);
    }
}

impl ComputeWorkload for ComputeTask {
    fn compute(&self) -> &ComputeParams {
        &self.compute
    }

    fn compute_mut(&mut self) -> &mut ComputeParams {
        &mut self.compute
    }
}
