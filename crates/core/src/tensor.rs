//! Tensor workloads: shaped compute with quantized arithmetic.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compute::{compute_execution_ms, ComputeParams, ComputeWorkload};
use crate::id::TaskId;
use crate::status::Quantization;
use crate::task::{truncate_ms, TaskCore, Workload};

/// Upper bound on the randomly drawn sparsity.
pub const MAX_SPARSITY: f64 = 0.95;

/// A compute workload over a shaped tensor.
///
/// Sparsity is drawn once at construction and fixed for the task's
/// lifetime; the shape and quantization stay mutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorTask {
    core: TaskCore,
    compute: ComputeParams,
    dimensions: Vec<u32>,
    quantization: Option<Quantization>,
    sparsity: f64,
}

impl TensorTask {
    /// Build a tensor task, drawing sparsity from the thread-local RNG.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        compute_units: i32,
        batch_size: i32,
        dimensions: &[u32],
        quantization: Option<Quantization>,
    ) -> Self {
        Self::with_rng(
            id,
            priority,
            memory_size,
            compute_units,
            batch_size,
            dimensions,
            quantization,
            &mut rand::rng(),
        )
    }

    /// Build a tensor task drawing sparsity from the given RNG: one
    /// uniform draw clamped to `[0, MAX_SPARSITY]`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_rng<R: Rng + ?Sized>(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        compute_units: i32,
        batch_size: i32,
        dimensions: &[u32],
        quantization: Option<Quantization>,
        rng: &mut R,
    ) -> Self {
        let mut task = Self {
            core: TaskCore::new(id, priority, memory_size),
            compute: ComputeParams::new(compute_units, batch_size),
            dimensions: dimensions.to_vec(),
            quantization,
            sparsity: rng.random::<f64>().min(MAX_SPARSITY),
        };
        task.recalculate();
        task
    }

    /// The tensor shape. Returns a copy; mutating the returned vector
    /// does not touch the task.
    pub fn dimensions(&self) -> Vec<u32> {
        self.dimensions.clone()
    }

    /// Replace the tensor shape. The slice is copied in.
    pub fn set_dimensions(&mut self, dimensions: &[u32]) {
        self.dimensions = dimensions.to_vec();
        self.recalculate();
    }

    /// Arithmetic quantization, if any.
    pub fn quantization(&self) -> Option<Quantization> {
        self.quantization
    }

    /// Change the arithmetic quantization.
    pub fn set_quantization(&mut self, quantization: Option<Quantization>) {
        self.quantization = quantization;
        self.recalculate();
    }

    /// The sparsity drawn at construction, in `[0, MAX_SPARSITY]`.
    pub fn sparsity(&self) -> f64 {
        self.sparsity
    }
}

impl Workload for TensorTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let compute_ms = compute_execution_ms(&self.core, &self.compute);
        let ms = match self.quantization {
            // Without a quantization the tensor adjustment is skipped.
            None => compute_ms,
            Some(quantization) => truncate_ms(
                compute_ms as f64
                    * dimension_factor(&self.dimensions)
                    * quantization_factor(quantization)
                    * sparsity_factor(self.sparsity),
            ),
        };
        self.core.set_execution_ms(ms);
    }
}

impl ComputeWorkload for TensorTask {
    fn compute(&self) -> &ComputeParams {
        &self.compute
    }

    fn compute_mut(&mut self) -> &mut ComputeParams {
        &mut self.compute
    }
}

/// Shape contribution: grows with the log of the element count, with a
/// smoothing term that keeps degenerate shapes at exactly 1.
fn dimension_factor(dimensions: &[u32]) -> f64 {
    if dimensions.is_empty() {
        return 1.0;
    }
    let log_sum: f64 = dimensions
        .iter()
        .filter(|dim| **dim > 1)
        .map(|dim| f64::from(*dim).log10())
        .sum();
    (log_sum + (1.0 + 10f64.powf(log_sum)).log10()) / 2f64.log10()
}

fn quantization_factor(quantization: Quantization) -> f64 {
    match quantization {
        Quantization::Float32 => 1.8,
        Quantization::Int8 => 0.4,
        Quantization::Bfloat16 => 1.0,
    }
}

fn sparsity_factor(sparsity: f64) -> f64 {
    (1.0 - sparsity * 0.5).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(quantization: Option<Quantization>, seed: u64) -> TensorTask {
        TensorTask::with_rng(
            TaskId::new(1),
            120,
            4096,
            8,
            32,
            &[256, 256, 3],
            quantization,
            &mut StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_sparsity_is_bounded_and_immutable() {
        for seed in 0..64 {
            let task = seeded(Some(Quantization::Float32), seed);
            assert!((0.0..=MAX_SPARSITY).contains(&task.sparsity()));
        }
        let mut task = seeded(Some(Quantization::Float32), 7);
        let drawn = task.sparsity();
        task.set_dimensions(&[16, 16]);
        task.set_priority(139);
        assert_eq!(task.sparsity(), drawn);
    }

    #[test]
    fn test_quantization_ordering_matches_factors() {
        // Same seed, so all three share one sparsity and the times
        // differ only by the quantization factor.
        let int8 = seeded(Some(Quantization::Int8), 11).execution_time() as f64;
        let bf16 = seeded(Some(Quantization::Bfloat16), 11).execution_time() as f64;
        let f32t = seeded(Some(Quantization::Float32), 11).execution_time() as f64;
        assert!(int8 < bf16 && bf16 < f32t);
        assert!((int8 / bf16 - 0.4).abs() < 0.004);
        assert!((f32t / bf16 - 1.8).abs() < 0.018);
    }

    #[test]
    fn test_no_quantization_skips_tensor_adjustment() {
        let task = seeded(None, 3);
        let compute_only = compute_execution_ms(&task.core, &task.compute);
        assert_eq!(task.execution_time(), compute_only);
    }

    #[test]
    fn test_dimension_factor_degenerate_shapes() {
        assert!((dimension_factor(&[]) - 1.0).abs() < 1e-12);
        assert!((dimension_factor(&[1, 1, 1]) - 1.0).abs() < 1e-12);
        assert!(dimension_factor(&[16]) < dimension_factor(&[16, 16]));
        assert!(dimension_factor(&[16, 16]) < dimension_factor(&[256, 256, 3]));
    }

    #[test]
    fn test_dimensions_are_copied_both_ways() {
        let mut task = seeded(Some(Quantization::Bfloat16), 5);
        let mut returned = task.dimensions();
        returned.push(1024);
        assert_eq!(task.dimensions(), vec![256, 256, 3]);

        let mut input = vec![8, 8];
        task.set_dimensions(&input);
        input.push(512);
        assert_eq!(task.dimensions(), vec![8, 8]);
    }

    #[test]
    fn test_shape_and_quantization_setters_refresh_time() {
        let mut task = seeded(Some(Quantization::Float32), 9);
        let before = task.execution_time();
        task.set_dimensions(&[4, 4]);
        assert_ne!(task.execution_time(), before);
        let shaped = task.execution_time();
        task.set_quantization(Some(Quantization::Int8));
        assert!(task.execution_time() < shaped);
    }

    #[test]
    fn test_sparsity_factor_floor() {
        assert!((sparsity_factor(0.0) - 1.0).abs() < 1e-12);
        assert!((sparsity_factor(MAX_SPARSITY) - 0.525).abs() < 1e-12);
        assert!((sparsity_factor(2.0) - 0.1).abs() < 1e-12);
    }
}
