use crate::error::{CacheError, PublishError};

/// Non-fatal outcomes of work the caller never waits on.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    CacheReadFailed { key: String, error: CacheError },
    CacheWriteFailed { key: String, error: CacheError },
    CacheEntryCorrupt { key: String, error: String },
    Revalidated { key: String, stored: bool },
    RevalidationFailed { key: String, error: String },
    Published { routing_key: String, entities: usize },
    PublishFailed { routing_key: String, error: PublishError },
    TaskRejected { label: String, error: String },
}

/// Receives background outcomes; implementations must not block.
pub trait SyncObserver: Send + Sync {
    fn record(&self, outcome: SyncOutcome);
}
