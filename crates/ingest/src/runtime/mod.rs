//! Bounded background execution for fire-and-forget work.
//!
//! A fixed set of workers drains one bounded queue. Submission never waits: a full queue
//! rejects the task immediately so request paths stay latency-bounded.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::traits::RuntimeMetrics;
use crate::types::{RuntimeConfig, RuntimeStats, TaskId, TaskOutcome, TaskResult, TaskStatus};

pub mod flow_control;

pub use flow_control::FlowControlConfig;

pub type DynRuntimeMetrics = Arc<dyn RuntimeMetrics + Send + Sync>;

type BoxedTask = Pin<Box<dyn Future<Output = TaskResult> + Send + 'static>>;

struct QueuedTask {
    id: TaskId,
    label: String,
    task: BoxedTask,
    reply: oneshot::Sender<TaskOutcome>,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Handle to one accepted task. Dropping it does not cancel the task.
pub struct TaskHandle {
    id: TaskId,
    label: String,
    rx: oneshot::Receiver<TaskOutcome>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn join(self) -> Result<TaskOutcome, IngestError> {
        self.rx.await.map_err(|_| IngestError::Abandoned(self.label))
    }
}

pub struct BackgroundRuntime {
    pub flow_control: FlowControlConfig,
    sender: std::sync::Mutex<Option<mpsc::Sender<QueuedTask>>>,
    tracker: TaskTracker,
    metrics: DynRuntimeMetrics,
    next_id: AtomicU64,
    counters: Arc<Counters>,
}

impl BackgroundRuntime {
    /// Spawns the worker pool. Must be called from within a tokio runtime.
    pub fn start(config: &RuntimeConfig, metrics: DynRuntimeMetrics) -> Self {
        let flow_control = FlowControlConfig::from(config);
        let (tx, rx) = mpsc::channel::<QueuedTask>(flow_control.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let tracker = TaskTracker::new();
        let counters = Arc::new(Counters::default());

        for worker in 0..flow_control.workers {
            let rx = Arc::clone(&rx);
            let metrics = Arc::clone(&metrics);
            let counters = Arc::clone(&counters);
            tracker.spawn(async move {
                run_worker(worker, rx, metrics, counters).await;
            });
        }

        debug!(
            workers = flow_control.workers,
            queue_capacity = flow_control.queue_capacity,
            "background runtime started"
        );

        Self {
            flow_control,
            sender: std::sync::Mutex::new(Some(tx)),
            tracker,
            metrics,
            next_id: AtomicU64::new(1),
            counters,
        }
    }

    /// Queues a task without waiting. Fails when the queue is full or the runtime is closed.
    pub fn submit<F>(&self, label: impl Into<String>, task: F) -> Result<TaskHandle, IngestError>
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let label = label.into();
        let Some(sender) = self.current_sender() else {
            self.reject(&label);
            return Err(IngestError::Closed(label));
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        let queued = QueuedTask {
            id,
            label: label.clone(),
            task: Box::pin(task),
            reply,
        };

        match sender.try_send(queued) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                self.metrics.observe_queue_depth(
                    "background_pending",
                    sender.max_capacity() - sender.capacity(),
                );
                Ok(TaskHandle { id, label, rx })
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.reject(&label);
                Err(IngestError::Saturated(label))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.reject(&label);
                Err(IngestError::Closed(label))
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.current_sender().is_none()
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stops intake, then waits for queued and in-flight tasks up to the drain timeout.
    pub async fn shutdown(&self) -> Result<(), IngestError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(sender);
        self.tracker.close();

        let timeout = self.flow_control.drain_timeout;
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => {
                debug!(stats = ?self.stats(), "background runtime drained");
                Ok(())
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "background runtime drain timed out"
                );
                Err(IngestError::DrainTimeout(timeout.as_millis() as u64))
            }
        }
    }

    fn current_sender(&self) -> Option<mpsc::Sender<QueuedTask>> {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn reject(&self, label: &str) {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        self.metrics.observe_rejected(label);
        warn!(task = label, "background task rejected");
    }
}

async fn run_worker(
    worker: usize,
    rx: Arc<Mutex<mpsc::Receiver<QueuedTask>>>,
    metrics: DynRuntimeMetrics,
    counters: Arc<Counters>,
) {
    loop {
        let next = { rx.lock().await.recv().await };
        let Some(queued) = next else {
            break;
        };

        let QueuedTask {
            id,
            label,
            task,
            reply,
        } = queued;

        // Run on its own task so a panic surfaces as a join error instead of killing the worker.
        let status = match tokio::spawn(task).await {
            Ok(Ok(())) => TaskStatus::Done,
            Ok(Err(e)) => TaskStatus::Failed(e),
            Err(e) => TaskStatus::Failed(format!("task join failure: {e}")),
        };

        match &status {
            TaskStatus::Done => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            }
            TaskStatus::Failed(error) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(worker, task = %label, %error, "background task failed");
            }
        }

        let outcome = TaskOutcome {
            task_id: id,
            label,
            status,
        };
        metrics.observe_outcome(&outcome);
        let _ = reply.send(outcome);
    }
    debug!(worker, "background worker stopped");
}
