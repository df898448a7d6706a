//! Memory-bound workloads: transfers across the memory hierarchy.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;
use crate::status::MemoryTier;
use crate::task::{truncate_ms, TaskCore, Workload};

/// A workload dominated by data movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTask {
    core: TaskCore,
    bandwidth: u32,
    tier: Option<MemoryTier>,
}

impl MemoryTask {
    /// Build a memory task. All inputs are normalized immediately; the
    /// tier is fixed for the task's lifetime.
    pub fn new(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        bandwidth: i32,
        tier: Option<MemoryTier>,
    ) -> Self {
        let mut task = Self {
            core: TaskCore::new(id, priority, memory_size),
            bandwidth: bandwidth.max(1) as u32,
            tier,
        };
        task.recalculate();
        task
    }

    /// Transfer bandwidth, at least 1.
    pub fn bandwidth(&self) -> u32 {
        self.bandwidth
    }

    /// Set the bandwidth; values below 1 clamp to 1.
    pub fn set_bandwidth(&mut self, bandwidth: i32) {
        self.bandwidth = bandwidth.max(1) as u32;
        self.recalculate();
    }

    /// The target tier, fixed at construction.
    pub fn tier(&self) -> Option<MemoryTier> {
        self.tier
    }
}

impl Workload for MemoryTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let base = self.core.base_execution_ms();
        let ms = match self.tier {
            // Without a tier the memory adjustment is skipped.
            None => base,
            Some(tier) => truncate_ms(
                base as f64 * (1000.0 / self.bandwidth as f64) * tier_factor(tier),
            ),
        };
        self.core.set_execution_ms(ms);
    }
}

fn tier_factor(tier: MemoryTier) -> f64 {
    match tier {
        MemoryTier::Cache => 0.5,
        MemoryTier::Ram => 1.0,
        MemoryTier::Vram => 1.5,
        MemoryTier::Disk => 5.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(bandwidth: i32, tier: Option<MemoryTier>) -> MemoryTask {
        MemoryTask::new(TaskId::new(1), 120, 2048, bandwidth, tier)
    }

    #[test]
    fn test_execution_time_matches_derivation() {
        let task = task(1000, Some(MemoryTier::Ram));
        let base = (100.0 * (1.0 + 20.0 / 39.0) * (1.0 + 2048.0 / 1024.0)) as u64;
        let expected = (base as f64 * (1000.0 / 1000.0) * 1.0) as u64;
        assert_eq!(task.execution_time(), expected.max(1));
    }

    #[test]
    fn test_doubling_bandwidth_halves_time() {
        let slow = task(1000, Some(MemoryTier::Ram)).execution_time() as f64;
        let fast = task(2000, Some(MemoryTier::Ram)).execution_time() as f64;
        assert!(fast < slow);
        assert!((slow / fast - 2.0).abs() < 0.02);
    }

    #[test]
    fn test_tier_ordering_at_fixed_bandwidth() {
        let times: Vec<u64> = MemoryTier::ALL
            .iter()
            .map(|tier| task(1000, Some(*tier)).execution_time())
            .collect();
        // cache < ram < vram < disk
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_bandwidth_clamps_to_one() {
        let mut task = task(0, Some(MemoryTier::Cache));
        assert_eq!(task.bandwidth(), 1);
        task.set_bandwidth(-500);
        assert_eq!(task.bandwidth(), 1);
        task.set_bandwidth(2000);
        assert_eq!(task.bandwidth(), 2000);
    }

    #[test]
    fn test_no_tier_skips_memory_adjustment() {
        let task = task(1000, None);
        assert_eq!(task.execution_time(), task.core.base_execution_ms());
    }

    #[test]
    fn test_bandwidth_setter_refreshes_time() {
        let mut task = task(1000, Some(MemoryTier::Disk));
        let before = task.execution_time();
        task.set_bandwidth(4000);
        assert!(task.execution_time() < before);
    }
}
