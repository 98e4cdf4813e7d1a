pub type TaskId = u64;
pub type TaskLabel = String;

/// What a background task reports back. Errors are flattened to text since nobody waits on them.
pub type TaskResult = Result<(), String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Done,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub label: TaskLabel,
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub drain_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
            drain_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeStats {
    pub submitted: u64,
    pub rejected: u64,
    pub completed: u64,
    pub failed: u64,
}
