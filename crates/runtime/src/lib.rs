use async_trait::async_trait;
use cloudscope_api::{
    CacheStore, CatalogEntity, CatalogResult, CatalogService, FilterKind, ProviderClient,
    ProviderError, Publisher, SyncObserver, Trigger,
};
use cloudscope_core::bus::LogPublisher;
use cloudscope_core::provider::Inventory;
use cloudscope_core::{
    CacheAsideFetcher, CachedProvider, CatalogQueryService, CollectorConfig, ConfigError,
    InventoryProvider, MemoryCacheStore, ProviderBinding, SubscriptionContext, SyncOrchestrator,
    TracingObserver,
};
use cloudscope_ingest::{BackgroundRuntime, IngestError, NoopMetrics, RuntimeStats};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("background runtime: {0}")]
    Background(#[from] IngestError),
}

/// Collaborators a collector is assembled from.
pub struct CollectorParts {
    pub provider: Arc<dyn ProviderClient>,
    pub store: Arc<dyn CacheStore>,
    pub publisher: Arc<dyn Publisher>,
    pub observer: Arc<dyn SyncObserver>,
}

/// A wired catalog service plus the background runtime it owns.
pub struct Collector {
    config: CollectorConfig,
    runtime: Arc<BackgroundRuntime>,
    store: Arc<dyn CacheStore>,
    provider: CachedProvider,
    query: CatalogQueryService,
}

impl Collector {
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Cached reads against the configured provider.
    pub fn provider(&self) -> &CachedProvider {
        &self.provider
    }

    pub fn stats(&self) -> RuntimeStats {
        self.runtime.stats()
    }

    pub async fn ping(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    /// Closes intake and waits for queued revalidation and publish work.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.runtime.shutdown().await?;
        info!(stats = ?self.runtime.stats(), "collector stopped");
        Ok(())
    }
}

#[async_trait]
impl CatalogService for Collector {
    async fn trigger_sync(&self, trigger: &Trigger) -> CatalogResult<Vec<CatalogEntity>> {
        self.query.trigger_sync(trigger).await
    }

    async fn get_all(&self, filter: &FilterKind) -> CatalogResult<Vec<CatalogEntity>> {
        self.query.get_all(filter).await
    }

    async fn get_kind(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> CatalogResult<Vec<CatalogEntity>> {
        self.query.get_kind(namespace, kind, name).await
    }
}

/// Assembles a collector from explicit collaborators. Must run inside a tokio runtime.
pub fn build_collector(
    config: CollectorConfig,
    parts: CollectorParts,
) -> Result<Collector, RuntimeError> {
    config.validate()?;
    let default_provider = config.provider_kind()?;

    let runtime = Arc::new(BackgroundRuntime::start(
        &config.runtime_config(),
        Arc::new(NoopMetrics),
    ));
    let fetcher = Arc::new(CacheAsideFetcher::new(
        Arc::clone(&parts.store),
        Arc::clone(&runtime),
        Arc::clone(&parts.observer),
        config.base_ttl(),
    ));

    let provider = CachedProvider::new(
        parts.provider,
        Arc::clone(&fetcher),
        config.cache.provider_ttl_units,
    );
    let binding = ProviderBinding {
        provider: provider.clone(),
        context: SubscriptionContext::new(
            config.provider.subscription.name.clone(),
            config.provider.subscription.id.clone(),
        ),
    };
    let orchestrator = SyncOrchestrator::new(
        parts.publisher,
        Arc::clone(&runtime),
        parts.observer,
        config.bus.clone(),
    )
    .with_binding(binding);

    let query = CatalogQueryService::new(
        Arc::new(orchestrator),
        fetcher,
        default_provider,
        config.cache.query_ttl_units,
    );

    Ok(Collector {
        config,
        runtime,
        store: parts.store,
        provider,
        query,
    })
}

/// Bootstraps a collector over the local collaborators: the configured inventory file, an
/// in-memory cache, a logging publisher and a tracing observer.
pub async fn build_default_collector(
    mut config: CollectorConfig,
) -> Result<Collector, RuntimeError> {
    let provider_kind = config.provider_kind()?;
    let provider = match &config.provider.inventory_path {
        Some(path) => InventoryProvider::load(provider_kind, path).await?,
        None => {
            warn!("no inventory configured, serving an empty catalog");
            InventoryProvider::new(provider_kind, Inventory::default())
        }
    };
    adopt_sole_subscription(&mut config, provider.inventory());

    let parts = CollectorParts {
        provider: Arc::new(provider),
        store: Arc::new(MemoryCacheStore::new(config.cache.prefix.clone())),
        publisher: Arc::new(LogPublisher),
        observer: Arc::new(TracingObserver),
    };
    build_collector(config, parts)
}

/// Without a configured subscription, an inventory holding exactly one supplies it.
fn adopt_sole_subscription(config: &mut CollectorConfig, inventory: &Inventory) {
    let section = &mut config.provider.subscription;
    if !section.name.is_empty() || !section.id.is_empty() {
        return;
    }
    match inventory.subscriptions.as_slice() {
        [only] => {
            info!(subscription = %only.display_name, "using the inventory's only subscription");
            section.name = only.display_name.clone();
            section.id = only.subscription_id.clone();
        }
        [] => {}
        many => warn!(
            subscriptions = many.len(),
            "no subscription configured and the inventory holds several; syncs will fail"
        ),
    }
}

/// Initializes logging for a component. Hold the guard for the process lifetime.
pub fn init_logging(component: &str, to_stderr: bool) -> tracing_appender::non_blocking::WorkerGuard {
    cloudscope_core::logging::init_logging(component, to_stderr)
}
