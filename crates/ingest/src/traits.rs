use crate::types::TaskOutcome;

pub trait RuntimeMetrics: Send + Sync {
    fn observe_queue_depth(&self, queue: &'static str, depth: usize);
    fn observe_outcome(&self, outcome: &TaskOutcome);
    fn observe_rejected(&self, label: &str);
}

#[derive(Debug, Default)]
pub struct NoopMetrics;

impl RuntimeMetrics for NoopMetrics {
    fn observe_queue_depth(&self, _queue: &'static str, _depth: usize) {}
    fn observe_outcome(&self, _outcome: &TaskOutcome) {}
    fn observe_rejected(&self, _label: &str) {}
}
