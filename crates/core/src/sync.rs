//! Synchronization-bound workloads: rendezvous overhead dominates.

use serde::{Deserialize, Serialize};

use crate::id::TaskId;
use crate::status::SyncMode;
use crate::task::{truncate_ms, TaskCore, Workload};

const MAX_BUFFER_SIZE: i32 = 256;
const MAX_LATENCY: i32 = 10_000;

/// A workload dominated by synchronization between lanes.
///
/// `latency` and `voltage_scale` are carried and clamped but do not
/// contribute to the derived execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTask {
    core: TaskCore,
    frequency: f64,
    buffer_size: u32,
    mode: Option<SyncMode>,
    latency: u32,
    voltage_scale: f64,
}

impl SyncTask {
    /// Build a sync task. All inputs are normalized immediately; the
    /// mode is fixed for the task's lifetime.
    pub fn new(
        id: TaskId,
        priority: i32,
        memory_size: i64,
        frequency: f64,
        buffer_size: i32,
        mode: Option<SyncMode>,
    ) -> Self {
        let mut task = Self {
            core: TaskCore::new(id, priority, memory_size),
            frequency: frequency.max(1.0),
            buffer_size: buffer_size.clamp(1, MAX_BUFFER_SIZE) as u32,
            mode,
            latency: 1,
            voltage_scale: 1.0,
        };
        task.recalculate();
        task
    }

    /// Synchronization frequency, at least 1.0.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Set the frequency; values below 1.0 clamp to 1.0.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency.max(1.0);
        self.recalculate();
    }

    /// Staging buffer size, within `[1, 256]`.
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Set the buffer size, clamped to `[1, 256]`.
    pub fn set_buffer_size(&mut self, size: i32) {
        self.buffer_size = size.clamp(1, MAX_BUFFER_SIZE) as u32;
        self.recalculate();
    }

    /// The synchronization mode, fixed at construction.
    pub fn mode(&self) -> Option<SyncMode> {
        self.mode
    }

    /// Interconnect latency, within `[1, 10000]`. Does not feed the
    /// derived execution time.
    pub fn latency(&self) -> u32 {
        self.latency
    }

    /// Set the latency, clamped to `[1, 10000]`.
    pub fn set_latency(&mut self, latency: i32) {
        self.latency = latency.clamp(1, MAX_LATENCY) as u32;
        self.recalculate();
    }

    /// Voltage scaling factor, within `[0.1, 2.0]`. Does not feed the
    /// derived execution time.
    pub fn voltage_scale(&self) -> f64 {
        self.voltage_scale
    }

    /// Set the voltage scale, clamped to `[0.1, 2.0]`.
    pub fn set_voltage_scale(&mut self, scale: f64) {
        self.voltage_scale = scale.min(2.0).max(0.1);
        self.recalculate();
    }
}

impl Workload for SyncTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn recalculate(&mut self) {
        let base = self.core.base_execution_ms();
        let ms = match self.mode {
            // Without a mode the sync adjustment is skipped.
            None => base,
            Some(mode) => truncate_ms(
                base as f64
                    * frequency_factor(self.frequency)
                    * buffer_factor(self.buffer_size)
                    * mode_factor(mode),
            ),
        };
        self.core.set_execution_ms(ms);
    }
}

/// Slower synchronization stretches the time, capped at 10x.
fn frequency_factor(frequency: f64) -> f64 {
    (1000.0 / frequency).min(10.0)
}

/// Larger buffers stretch the time, capped at 4x.
fn buffer_factor(buffer_size: u32) -> f64 {
    (buffer_size as f64 / 64.0).min(4.0)
}

fn mode_factor(mode: SyncMode) -> f64 {
    match mode {
        SyncMode::Barrier => 2.0,
        SyncMode::Pipeline => 1.2,
        SyncMode::Wavefront => 1.5,
        SyncMode::Async => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(mode: Option<SyncMode>) -> SyncTask {
        SyncTask::new(TaskId::new(1), 120, 2048, 1000.0, 64, mode)
    }

    #[test]
    fn test_constructor_defaults() {
        let task = task(Some(SyncMode::Barrier));
        assert_eq!(task.frequency(), 1000.0);
        assert_eq!(task.buffer_size(), 64);
        assert_eq!(task.mode(), Some(SyncMode::Barrier));
        assert_eq!(task.latency(), 1);
        assert_eq!(task.voltage_scale(), 1.0);
        assert!(task.execution_time() > 0);
    }

    #[test]
    fn test_frequency_clamps_to_one() {
        let mut task = task(Some(SyncMode::Async));
        for invalid in [0.0, -1.0, -100.0] {
            task.set_frequency(invalid);
            assert_eq!(task.frequency(), 1.0);
        }
        task.set_frequency(2000.0);
        assert_eq!(task.frequency(), 2000.0);
    }

    #[test]
    fn test_buffer_size_clamps_to_range() {
        let mut task = task(Some(SyncMode::Async));
        task.set_buffer_size(0);
        assert_eq!(task.buffer_size(), 1);
        task.set_buffer_size(1000);
        assert_eq!(task.buffer_size(), 256);
    }

    #[test]
    fn test_inert_fields_clamp_without_changing_time() {
        let mut task = task(Some(SyncMode::Pipeline));
        let before = task.execution_time();

        task.set_latency(0);
        assert_eq!(task.latency(), 1);
        task.set_latency(50_000);
        assert_eq!(task.latency(), 10_000);
        task.set_voltage_scale(0.0);
        assert_eq!(task.voltage_scale(), 0.1);
        task.set_voltage_scale(9.0);
        assert_eq!(task.voltage_scale(), 2.0);

        assert_eq!(task.execution_time(), before);
    }

    #[test]
    fn test_mode_ordering_matches_factors() {
        let barrier = task(Some(SyncMode::Barrier)).execution_time();
        let wavefront = task(Some(SyncMode::Wavefront)).execution_time();
        let pipeline = task(Some(SyncMode::Pipeline)).execution_time();
        let async_mode = task(Some(SyncMode::Async)).execution_time();
        assert!(async_mode < pipeline && pipeline < wavefront && wavefront < barrier);
    }

    #[test]
    fn test_no_mode_skips_sync_adjustment() {
        let task = task(None);
        assert_eq!(task.execution_time(), task.core.base_execution_ms());
    }

    #[test]
    fn test_factor_caps() {
        assert_eq!(frequency_factor(50.0), 10.0);
        assert_eq!(frequency_factor(1000.0), 1.0);
        assert_eq!(buffer_factor(256), 4.0);
        assert_eq!(buffer_factor(64), 1.0);
    }

    #[test]
    fn test_execution_time_matches_derivation() {
        let task = task(Some(SyncMode::Barrier));
        let base = (100.0 * (1.0 + 20.0 / 39.0) * (1.0 + 2048.0 / 1024.0)) as u64;
        let expected = (base as f64 * 1.0 * 1.0 * 2.0) as u64;
        assert_eq!(task.execution_time(), expected.max(1));
    }
}
