//! Shared handles for tasks in flight.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use npusim_core::{Status, TaskId, Workload};

use crate::engine::ExecutionEngine;

/// Shared, lockable access to one task.
///
/// The submitter keeps a handle to read status and results while the
/// engine drives the task through its lifecycle; clones are cheap and
/// refer to the same task. The lock is only held for short synchronous
/// sections, never across a suspension point.
pub struct TaskHandle<W> {
    pub(crate) inner: Arc<Mutex<W>>,
}

impl<W> Clone for TaskHandle<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Workload + Send + 'static> TaskHandle<W> {
    /// Wrap a task for shared access.
    pub fn new(task: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(task)),
        }
    }

    /// Caller-assigned identity.
    pub fn id(&self) -> TaskId {
        self.inner.lock().id()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.inner.lock().status()
    }

    /// Derived execution time in milliseconds.
    pub fn execution_time(&self) -> u64 {
        self.inner.lock().execution_time()
    }

    /// Simulated power draw.
    pub fn power_draw(&self) -> f64 {
        self.inner.lock().power_draw()
    }

    /// Run a closure against the task under the handle lock.
    ///
    /// Variant-specific getters and setters stay reachable this way
    /// after submission.
    pub fn with<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Dispatch this task to the engine.
    ///
    /// Only a Pending task is dispatched: its status moves to Running,
    /// its power draw is derived from the current parameters, and its
    /// simulated work is scheduled. For any other status this is a
    /// silent no-op that leaves status and power untouched; when the
    /// engine has stopped accepting work the task stays Pending.
    pub fn execute(&self, engine: &ExecutionEngine) {
        {
            let mut task = self.inner.lock();
            if task.status() != Status::Pending {
                return;
            }
            if !engine.is_accepting() {
                warn!(id = %task.id(), "engine is shut down; task not dispatched");
                return;
            }
            task.set_status(Status::Running);
            task.refresh_power_draw();
        }
        engine.schedule(self.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npusim_core::NpuTask;

    #[test]
    fn test_clones_share_one_task() {
        let handle = TaskHandle::new(NpuTask::new(TaskId::new(1), 120, 64));
        let clone = handle.clone();
        clone.with(|task| task.set_priority(139));
        assert_eq!(handle.with(|task| task.priority()), 139);
        assert_eq!(handle.execution_time(), clone.execution_time());
    }

    #[test]
    fn test_handle_reads_match_task_state() {
        let handle = TaskHandle::new(NpuTask::new(TaskId::new(2), 110, 1024));
        assert_eq!(handle.id(), TaskId::new(2));
        assert_eq!(handle.status(), Status::Pending);
        assert_eq!(handle.power_draw(), 0.0);
        assert!(handle.execution_time() > 0);
    }
}
