use cloudscope_api::{SyncObserver, SyncOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

pub type DynObserver = Arc<dyn SyncObserver>;

/// Default observer: every background outcome becomes a log event.
#[derive(Debug, Default, Clone)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn record(&self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::CacheReadFailed { key, error } => {
                warn!(%key, %error, "cache read failed, treating as miss");
            }
            SyncOutcome::CacheWriteFailed { key, error } => {
                warn!(%key, %error, "cache write failed");
            }
            SyncOutcome::CacheEntryCorrupt { key, error } => {
                warn!(%key, %error, "cached entry could not be decoded");
            }
            SyncOutcome::Revalidated { key, stored } => {
                debug!(%key, stored, "cache entry revalidated");
            }
            SyncOutcome::RevalidationFailed { key, error } => {
                warn!(%key, %error, "cache revalidation failed");
            }
            SyncOutcome::Published {
                routing_key,
                entities,
            } => {
                debug!(%routing_key, entities, "catalog published");
            }
            SyncOutcome::PublishFailed { routing_key, error } => {
                warn!(%routing_key, %error, "catalog publish failed");
            }
            SyncOutcome::TaskRejected { label, error } => {
                warn!(task = %label, %error, "background task rejected");
            }
        }
    }
}

/// Keeps every outcome in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    outcomes: std::sync::Mutex<Vec<SyncOutcome>>,
}

impl RecordingObserver {
    pub fn outcomes(&self) -> Vec<SyncOutcome> {
        self.outcomes
            .lock()
            .map(|g| g.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl SyncObserver for RecordingObserver {
    fn record(&self, outcome: SyncOutcome) {
        match self.outcomes.lock() {
            Ok(mut guard) => guard.push(outcome),
            Err(poisoned) => poisoned.into_inner().push(outcome),
        }
    }
}
