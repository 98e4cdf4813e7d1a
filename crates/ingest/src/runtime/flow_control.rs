use std::time::Duration;

use crate::types::RuntimeConfig;

#[derive(Clone, Debug)]
pub struct FlowControlConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub drain_timeout: Duration,
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        FlowControlConfig::from(&RuntimeConfig::default())
    }
}

impl From<&RuntimeConfig> for FlowControlConfig {
    fn from(value: &RuntimeConfig) -> Self {
        Self {
            workers: value.workers.max(1),
            queue_capacity: value.queue_capacity.max(1),
            drain_timeout: Duration::from_millis(value.drain_timeout_ms.max(1)),
        }
    }
}
