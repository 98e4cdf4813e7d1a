use crate::cache::CacheAsideFetcher;
use crate::sync::SyncOrchestrator;
use async_trait::async_trait;
use cloudscope_api::{
    CatalogEntity, CatalogError, CatalogResult, CatalogService, CloudProvider, FilterKind, Trigger,
};
use std::sync::Arc;
use tracing::instrument;

pub const QUERY_KEY_PREFIX: &str = "backstage_get_all_kinds";

/// Filtered catalog reads, served stale-while-revalidate.
pub struct CatalogQueryService {
    orchestrator: Arc<SyncOrchestrator>,
    fetcher: Arc<CacheAsideFetcher>,
    default_provider: CloudProvider,
    ttl_units: u32,
}

impl CatalogQueryService {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        fetcher: Arc<CacheAsideFetcher>,
        default_provider: CloudProvider,
        ttl_units: u32,
    ) -> Self {
        Self {
            orchestrator,
            fetcher,
            default_provider,
            ttl_units,
        }
    }

    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    pub fn query_key(filter: &FilterKind) -> String {
        format!("{QUERY_KEY_PREFIX}{}", filter.key_suffix())
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self, filter: &FilterKind) -> CatalogResult<Vec<CatalogEntity>> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let trigger = Trigger::for_provider(self.default_provider.as_str());
        let owned_filter = filter.clone();

        self.fetcher
            .resolve(
                &Self::query_key(filter),
                self.ttl_units,
                move || async move {
                    let entities = orchestrator.trigger_sync(&trigger).await?;
                    if owned_filter.is_empty() {
                        Ok(entities)
                    } else {
                        filter_kinds(&entities, &owned_filter)
                    }
                },
            )
            .await
    }

    pub async fn get_kind(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> CatalogResult<Vec<CatalogEntity>> {
        if namespace.is_empty() || kind.is_empty() || name.is_empty() {
            return Err(CatalogError::InvalidArgument(
                "namespace, kind and name are all required".to_string(),
            ));
        }
        self.get_all(&FilterKind {
            name: name.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
        })
        .await
    }
}

/// Case-insensitive match on every non-empty field. An all-empty filter is an error.
pub fn filter_kinds(
    entities: &[CatalogEntity],
    filter: &FilterKind,
) -> CatalogResult<Vec<CatalogEntity>> {
    if filter.is_empty() {
        return Err(CatalogError::Filter);
    }
    Ok(entities
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect())
}

#[async_trait]
impl CatalogService for CatalogQueryService {
    async fn trigger_sync(&self, trigger: &Trigger) -> CatalogResult<Vec<CatalogEntity>> {
        self.orchestrator.trigger_sync(trigger).await
    }

    async fn get_all(&self, filter: &FilterKind) -> CatalogResult<Vec<CatalogEntity>> {
        CatalogQueryService::get_all(self, filter).await
    }

    async fn get_kind(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> CatalogResult<Vec<CatalogEntity>> {
        CatalogQueryService::get_kind(self, namespace, kind, name).await
    }
}
