//! Cache-aside reads with stale-while-revalidate refresh.
//!
//! A hit is served from the store and refreshed in the background; a miss blocks on the
//! loader. Store failures degrade to a miss or a lost write and are only reported.

use crate::observe::DynObserver;
use cloudscope_api::{CacheStore, CatalogResult, SyncOutcome};
use cloudscope_ingest::BackgroundRuntime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

pub type DynCacheStore = Arc<dyn CacheStore>;

/// Values whose empty form must never reach the store.
pub trait CachePayload {
    fn is_empty_payload(&self) -> bool;
}

impl<T> CachePayload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<T> CachePayload for Option<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_none()
    }
}

#[derive(Clone)]
pub struct CacheAsideFetcher {
    store: DynCacheStore,
    runtime: Arc<BackgroundRuntime>,
    observer: DynObserver,
    base_ttl: Duration,
}

impl CacheAsideFetcher {
    pub fn new(
        store: DynCacheStore,
        runtime: Arc<BackgroundRuntime>,
        observer: DynObserver,
        base_ttl: Duration,
    ) -> Self {
        Self {
            store,
            runtime,
            observer,
            base_ttl,
        }
    }

    /// `units` base ttls. Zero, and anything too large to represent, means no expiry.
    pub fn ttl(&self, units: u32) -> Duration {
        self.base_ttl.checked_mul(units).unwrap_or(Duration::ZERO)
    }

    pub fn store(&self) -> &DynCacheStore {
        &self.store
    }

    /// Returns the cached value for `key`, or the result of `load` on a miss.
    ///
    /// On a hit `load` runs once more in the background and overwrites the entry. Errors
    /// from `load` propagate only on a miss.
    pub async fn resolve<T, F, Fut>(&self, key: &str, ttl_units: u32, load: F) -> CatalogResult<T>
    where
        T: Serialize + DeserializeOwned + CachePayload + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CatalogResult<T>> + Send + 'static,
    {
        let ttl = self.ttl(ttl_units);

        if let Some(cached) = self.read::<T>(key).await {
            trace!(%key, "cache hit");
            self.schedule_revalidation(key, ttl, load);
            return Ok(cached);
        }

        debug!(%key, "cache miss, loading");
        let value = load().await?;
        write_through(&self.store, &self.observer, key, &value, ttl).await;
        Ok(value)
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                self.observer.record(SyncOutcome::CacheReadFailed {
                    key: key.to_string(),
                    error,
                });
                return None;
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                self.observer.record(SyncOutcome::CacheEntryCorrupt {
                    key: key.to_string(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    fn schedule_revalidation<T, F, Fut>(&self, key: &str, ttl: Duration, load: F)
    where
        T: Serialize + CachePayload + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CatalogResult<T>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let observer = Arc::clone(&self.observer);
        let owned_key = key.to_string();

        let submitted = self.runtime.submit(format!("revalidate:{key}"), async move {
            match load().await {
                Ok(value) => {
                    let stored = write_through(&store, &observer, &owned_key, &value, ttl).await;
                    observer.record(SyncOutcome::Revalidated {
                        key: owned_key,
                        stored,
                    });
                    Ok(())
                }
                Err(e) => {
                    let error = e.to_string();
                    observer.record(SyncOutcome::RevalidationFailed {
                        key: owned_key,
                        error: error.clone(),
                    });
                    Err(error)
                }
            }
        });

        if let Err(e) = submitted {
            self.observer.record(SyncOutcome::TaskRejected {
                label: format!("revalidate:{key}"),
                error: e.to_string(),
            });
        }
    }
}

/// Serializes and stores a non-empty value. Returns whether the store accepted it.
async fn write_through<T: Serialize + CachePayload + Sync>(
    store: &DynCacheStore,
    observer: &DynObserver,
    key: &str,
    value: &T,
    ttl: Duration,
) -> bool {
    if value.is_empty_payload() {
        trace!(%key, "empty result, not cached");
        return false;
    }

    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            observer.record(SyncOutcome::CacheWriteFailed {
                key: key.to_string(),
                error: cloudscope_api::CacheError::Serialization(e.to_string()),
            });
            return false;
        }
    };

    match store.set(key, &bytes, ttl).await {
        Ok(()) => true,
        Err(error) => {
            observer.record(SyncOutcome::CacheWriteFailed {
                key: key.to_string(),
                error,
            });
            false
        }
    }
}
