use crate::error::CatalogResult;
use crate::models::{CatalogEntity, FilterKind, Trigger};
use async_trait::async_trait;

/// Catalog operations exposed to external consumers.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Runs one synchronization and returns the resulting entity set.
    async fn trigger_sync(&self, trigger: &Trigger) -> CatalogResult<Vec<CatalogEntity>>;

    /// Filtered view of the catalog, served through the cache.
    async fn get_all(&self, filter: &FilterKind) -> CatalogResult<Vec<CatalogEntity>>;

    /// Exact lookup; every part must be non-empty.
    async fn get_kind(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> CatalogResult<Vec<CatalogEntity>>;
}
