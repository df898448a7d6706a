//! The task core shared by every workload variant.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;
use crate::status::Status;

/// Lowest schedulable priority.
pub const PRIORITY_MIN: i32 = 100;

/// Highest schedulable priority.
pub const PRIORITY_MAX: i32 = 139;

/// Base simulated duration in milliseconds, before any factor applies.
const BASE_TIME_MS: f64 = 100.0;

/// Truncate a derived duration to whole milliseconds.
///
/// Timing is integral: fractions are dropped at every derivation level,
/// and the result never reaches zero so a task always occupies the
/// engine for at least one tick.
pub(crate) fn truncate_ms(value: f64) -> u64 {
    (value as u64).max(1)
}

/// Universal fields carried by every task variant.
///
/// Variants embed a `TaskCore` and layer their own parameters and
/// derivation factors on top of it; the [`Workload`] trait provides the
/// shared accessor surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCore {
    id: TaskId,
    priority: i32,
    memory_size: u64,
    status: Status,
    power_draw: f64,
    execution_time: u64,
}

impl TaskCore {
    /// Build a core with normalized inputs and the base execution time.
    pub(crate) fn new(id: TaskId, priority: i32, memory_size: i64) -> Self {
        let mut core = Self {
            id,
            priority: priority.clamp(PRIORITY_MIN, PRIORITY_MAX),
            memory_size: memory_size.max(0) as u64,
            status: Status::Pending,
            power_draw: 0.0,
            execution_time: 0,
        };
        core.execution_time = core.base_execution_ms();
        core
    }

    /// The base derivation: 100 ms scaled by the priority and memory
    /// factors, truncated to whole milliseconds.
    pub(crate) fn base_execution_ms(&self) -> u64 {
        let priority_factor = 1.0
            + (self.priority - PRIORITY_MIN) as f64 / (PRIORITY_MAX - PRIORITY_MIN) as f64;
        let memory_factor = 1.0 + self.memory_size as f64 / 1024.0;
        truncate_ms(BASE_TIME_MS * priority_factor * memory_factor)
    }

    pub(crate) fn set_execution_ms(&mut self, ms: u64) {
        self.execution_time = ms;
    }
}

/// Behavior shared by every simulated workload.
///
/// Implementors supply access to their [`TaskCore`] and a full
/// recomputation of the derived execution time; the provided methods
/// give every variant the same parameter surface. Setters never fail:
/// out-of-range input is silently pulled to the nearest bound, and the
/// derived time is refreshed before the setter returns, so it is never
/// observably stale.
pub trait Workload {
    /// Shared fields of this task.
    fn core(&self) -> &TaskCore;

    /// Mutable access to the shared fields.
    fn core_mut(&mut self) -> &mut TaskCore;

    /// Recompute the derived execution time from the current parameters.
    fn recalculate(&mut self);

    /// Caller-assigned identity.
    fn id(&self) -> TaskId {
        self.core().id
    }

    /// Scheduling priority, within `[PRIORITY_MIN, PRIORITY_MAX]`.
    fn priority(&self) -> i32 {
        self.core().priority
    }

    /// Set the priority, clamped to the schedulable range.
    fn set_priority(&mut self, priority: i32) {
        self.core_mut().priority = priority.clamp(PRIORITY_MIN, PRIORITY_MAX);
        self.recalculate();
    }

    /// Memory footprint in bytes.
    fn memory_size(&self) -> u64 {
        self.core().memory_size
    }

    /// Set the memory footprint; negative input clamps to zero.
    fn set_memory_size(&mut self, bytes: i64) {
        self.core_mut().memory_size = bytes.max(0) as u64;
        self.recalculate();
    }

    /// Current lifecycle status.
    fn status(&self) -> Status {
        self.core().status
    }

    /// Overwrite the lifecycle status.
    fn set_status(&mut self, status: Status) {
        self.core_mut().status = status;
    }

    /// Simulated power draw.
    fn power_draw(&self) -> f64 {
        self.core().power_draw
    }

    /// Set the power draw, clamped to be non-negative.
    fn set_power_draw(&mut self, power: f64) {
        self.core_mut().power_draw = power.max(0.0);
    }

    /// Derived execution time in milliseconds.
    fn execution_time(&self) -> u64 {
        self.core().execution_time
    }

    /// Derive the power draw from the current footprint and priority.
    ///
    /// Invoked once at dispatch, never from setters.
    fn refresh_power_draw(&mut self) {
        let power = self.core().memory_size as f64 * 0.01 * self.core().priority as f64;
        self.core_mut().power_draw = power;
    }
}

/// A workload with no specialization: the base derivation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpuTask {
    core: TaskCore,
}

impl NpuTask {
    /// Build a base task. All inputs are normalized immediately.
    pub fn new(id: TaskId, priority: i32, memory_size: i64) -> Self {
        Self {
            core: TaskCore::new(id, priority, memory_size),
        }
    }
}

impl Workload for NpuTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let ms = self.core.base_execution_ms();
        self.core.set_execution_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// The base rule, written out the way the derivation states it.
    fn expected_base_ms(priority: i32, memory_size: u64) -> u64 {
        let value = 100.0
            * (1.0 + (priority - 100) as f64 / 39.0)
            * (1.0 + memory_size as f64 / 1024.0);
        (value as u64).max(1)
    }

    #[test]
    fn test_constructor_normalizes_and_derives() {
        let task = NpuTask::new(TaskId::new(1), 120, 2048);
        assert_eq!(task.id(), TaskId::new(1));
        assert_eq!(task.priority(), 120);
        assert_eq!(task.memory_size(), 2048);
        assert_eq!(task.status(), Status::Pending);
        assert_eq!(task.power_draw(), 0.0);
        assert_eq!(task.execution_time(), expected_base_ms(120, 2048));
    }

    #[test]
    fn test_priority_clamps_to_band() {
        let mut task = NpuTask::new(TaskId::new(2), 120, 0);
        task.set_priority(99);
        assert_eq!(task.priority(), 100);
        task.set_priority(140);
        assert_eq!(task.priority(), 139);
        task.set_priority(i32::MIN);
        assert_eq!(task.priority(), 100);
        let clamped = NpuTask::new(TaskId::new(3), 500, 0);
        assert_eq!(clamped.priority(), 139);
    }

    #[test]
    fn test_memory_clamps_to_zero() {
        let mut task = NpuTask::new(TaskId::new(4), 110, -512);
        assert_eq!(task.memory_size(), 0);
        task.set_memory_size(-1);
        assert_eq!(task.memory_size(), 0);
        task.set_memory_size(4096);
        assert_eq!(task.memory_size(), 4096);
    }

    #[test]
    fn test_setters_refresh_execution_time() {
        let mut task = NpuTask::new(TaskId::new(5), 100, 0);
        assert_eq!(task.execution_time(), 100);
        task.set_priority(139);
        assert_eq!(task.execution_time(), expected_base_ms(139, 0));
        task.set_memory_size(1024);
        assert_eq!(task.execution_time(), expected_base_ms(139, 1024));
    }

    #[test]
    fn test_power_draw_is_clamped_non_negative() {
        let mut task = NpuTask::new(TaskId::new(6), 120, 100);
        task.set_power_draw(-3.5);
        assert_eq!(task.power_draw(), 0.0);
        task.set_power_draw(12.25);
        assert_eq!(task.power_draw(), 12.25);
    }

    #[test]
    fn test_refresh_power_draw_uses_footprint_and_priority() {
        let mut task = NpuTask::new(TaskId::new(7), 120, 2048);
        task.refresh_power_draw();
        assert!((task.power_draw() - 2048.0 * 0.01 * 120.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_priority_clamp_is_total_and_idempotent(priority in any::<i32>()) {
            let mut task = NpuTask::new(TaskId::new(8), priority, 0);
            let once = task.priority();
            prop_assert!((PRIORITY_MIN..=PRIORITY_MAX).contains(&once));
            task.set_priority(once);
            prop_assert_eq!(task.priority(), once);
        }

        #[test]
        fn prop_execution_time_stays_positive(
            priority in any::<i32>(),
            memory in any::<i64>(),
        ) {
            let mut task = NpuTask::new(TaskId::new(9), priority, memory);
            prop_assert!(task.execution_time() > 0);
            task.set_memory_size(memory ^ 0x55);
            prop_assert!(task.execution_time() > 0);
        }
    }
}
