//! The execution engine: concurrent dispatch of simulated workloads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use npusim_core::{Status, TaskId, Workload};

use crate::handle::TaskHandle;

/// Tuning knobs for engine shutdown behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long `shutdown` waits for in-flight work before escalating.
    pub shutdown_grace: Duration,
    /// Poll interval while waiting for the tracking table to drain.
    pub drain_poll: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shutdown_grace: Duration::from_secs(60),
            drain_poll: Duration::from_millis(50),
        }
    }
}

/// One tracked unit of in-flight work.
struct Inflight {
    /// Distinguishes this submission from others sharing the same id.
    serial: u64,
    join: JoinHandle<()>,
    cancel: Arc<Notify>,
    task: Arc<Mutex<dyn Workload + Send>>,
}

struct EngineShared {
    inflight: Mutex<HashMap<TaskId, Inflight>>,
    accepting: AtomicBool,
    next_serial: AtomicU64,
    config: EngineConfig,
}

/// Concurrent dispatcher for simulated workloads.
///
/// The engine is constructed explicitly and passed to whatever submits
/// tasks; clones share one tracking table. Simulated work runs on the
/// ambient tokio runtime — its worker pool defaults to one thread per
/// available execution unit — so submission requires a runtime context
/// and never blocks the submitter.
///
/// Task ids are not required to be unique. When two in-flight tasks
/// share an id the table keeps the most recent submission; an older
/// task finishing does not evict the newer entry.
#[derive(Clone)]
pub struct ExecutionEngine {
    shared: Arc<EngineShared>,
}

impl ExecutionEngine {
    /// Engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with explicit shutdown tuning.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                inflight: Mutex::new(HashMap::new()),
                accepting: AtomicBool::new(true),
                next_serial: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Whether new work is still accepted.
    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }

    /// Submit a task for simulated execution.
    ///
    /// Wraps the task in a shared handle and dispatches it (see
    /// [`TaskHandle::execute`]), returning immediately. The returned
    /// handle is the caller's view of the task from here on.
    pub fn submit<W: Workload + Send + 'static>(&self, task: W) -> TaskHandle<W> {
        let handle = TaskHandle::new(task);
        handle.execute(self);
        handle
    }

    /// True while `id` maps to a unit of work that has not finished.
    pub fn is_running(&self, id: TaskId) -> bool {
        self.shared
            .inflight
            .lock()
            .get(&id)
            .is_some_and(|entry| !entry.join.is_finished())
    }

    /// Number of tasks currently tracked as in flight.
    pub fn running_count(&self) -> usize {
        self.shared.inflight.lock().len()
    }

    /// Request cooperative cancellation of the in-flight work for `id`.
    ///
    /// The worker observes the signal, marks the task Failed, and drops
    /// its tracking entry. Returns whether a tracked worker was
    /// signalled; an untracked id is a no-op.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.shared.inflight.lock().get(&id) {
            Some(entry) => {
                entry.cancel.notify_one();
                debug!(%id, "cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Schedule the simulated work for a task already marked Running.
    pub(crate) fn schedule<W: Workload + Send + 'static>(&self, handle: TaskHandle<W>) {
        let (id, duration) = {
            let task = handle.inner.lock();
            (task.id(), Duration::from_millis(task.execution_time()))
        };
        let serial = self.shared.next_serial.fetch_add(1, Ordering::Relaxed);
        let cancel = Arc::new(Notify::new());
        let erased: Arc<Mutex<dyn Workload + Send>> = handle.inner.clone();

        let shared = Arc::clone(&self.shared);
        let worker_cancel = Arc::clone(&cancel);
        let worker_task = handle.inner.clone();

        // Insert under the table lock so the worker cannot observe a
        // missing entry no matter how quickly it finishes.
        let mut inflight = self.shared.inflight.lock();
        let join = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = tokio::time::sleep(duration) => Status::Completed,
                _ = worker_cancel.notified() => Status::Failed,
            };
            worker_task.lock().set_status(outcome);

            let mut inflight = shared.inflight.lock();
            if inflight.get(&id).is_some_and(|entry| entry.serial == serial) {
                inflight.remove(&id);
            }
            drop(inflight);
            debug!(%id, ?outcome, "task finished");
        });

        let replaced = inflight.insert(
            id,
            Inflight {
                serial,
                join,
                cancel,
                task: erased,
            },
        );
        drop(inflight);

        if replaced.is_some() {
            debug!(%id, "tracking entry replaced by newer submission");
        }
        debug!(%id, ms = duration.as_millis() as u64, "task scheduled");
    }

    /// Stop accepting work and wind the engine down.
    ///
    /// Waits until in-flight work has drained or the configured grace
    /// has elapsed; work still running past the grace is cancelled,
    /// aborted, and marked Failed. After return the tracking table is
    /// empty and [`is_running`](Self::is_running) is false for every id.
    pub async fn shutdown(&self) {
        self.shared.accepting.store(false, Ordering::SeqCst);
        info!("engine shutting down; draining in-flight tasks");

        let grace = self.shared.config.shutdown_grace;
        if tokio::time::timeout(grace, self.drained()).await.is_ok() {
            info!("engine drained cleanly");
            return;
        }

        let stragglers: Vec<(TaskId, Inflight)> =
            self.shared.inflight.lock().drain().collect();
        warn!(
            count = stragglers.len(),
            "shutdown grace elapsed; terminating remaining tasks"
        );
        for (id, entry) in stragglers {
            entry.cancel.notify_one();
            entry.join.abort();
            let mut task = entry.task.lock();
            if task.status() == Status::Running {
                task.set_status(Status::Failed);
            }
            warn!(%id, "task terminated");
        }
    }

    async fn drained(&self) {
        loop {
            if self.shared.inflight.lock().is_empty() {
                return;
            }
            tokio::time::sleep(self.shared.config.drain_poll).await;
        }
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}
