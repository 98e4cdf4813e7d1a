#![allow(dead_code)]

use async_trait::async_trait;
use cloudscope_api::{
    CacheError, CacheStore, CloudProvider, GenericResource, ProviderClient, ProviderError,
    ResourceGroup, ResourceGroupProperties, Subscription, SubscriptionPolicies, Tags,
};
use cloudscope_core::bus::MemoryBus;
use cloudscope_core::config::BusSection;
use cloudscope_core::provider::Inventory;
use cloudscope_core::{
    CacheAsideFetcher, CachedProvider, CatalogQueryService, InventoryProvider, MemoryCacheStore,
    ProviderBinding, RecordingObserver, SubscriptionContext, SyncOrchestrator,
};
use cloudscope_ingest::{BackgroundRuntime, NoopMetrics, RuntimeConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect()
}

pub fn owned_tags(owner: &str) -> Tags {
    tags(&[("owner", owner), ("system", "billing")])
}

pub fn subscription() -> Subscription {
    Subscription {
        id: "/subscriptions/s1".to_string(),
        subscription_id: "s1".to_string(),
        display_name: "Production".to_string(),
        state: Some("Enabled".to_string()),
        tags: tags(&[("owner", "platform"), ("system", "core")]),
        subscription_policies: Some(SubscriptionPolicies {
            quota_id: Some("PayAsYouGo_2014-09-01".to_string()),
            spending_limit: Some("Off".to_string()),
        }),
    }
}

pub fn group(name: &str) -> ResourceGroup {
    ResourceGroup {
        id: format!("/subscriptions/s1/resourceGroups/{name}"),
        name: name.to_string(),
        resource_type: "Microsoft.Resources/resourceGroups".to_string(),
        location: Some("eastus".to_string()),
        tags: owned_tags("team-a"),
        properties: ResourceGroupProperties {
            provisioning_state: Some("Succeeded".to_string()),
        },
    }
}

pub fn resource(group: &str, provider_type: &str, name: &str, tags: Tags) -> GenericResource {
    GenericResource {
        id: format!("/subscriptions/s1/resourceGroups/{group}/providers/{provider_type}/{name}"),
        name: name.to_string(),
        resource_type: provider_type.to_string(),
        location: Some("eastus".to_string()),
        tags,
        provisioning_state: Some("Succeeded".to_string()),
    }
}

/// Two groups, three resources; `vm1` carries no ownership tags.
pub fn inventory() -> Inventory {
    Inventory {
        subscriptions: vec![subscription()],
        resource_groups: vec![group("rg1"), group("rg2")],
        resources: vec![
            resource(
                "rg1",
                "Microsoft.Storage/storageAccounts",
                "acct1",
                tags(&[("owner", "team-a"), ("env", "prod")]),
            ),
            resource(
                "rg1",
                "Microsoft.Web/sites",
                "web1",
                tags(&[("env", "dev")]),
            ),
            resource(
                "rg2",
                "Microsoft.Compute/virtualMachines",
                "vm1",
                Tags::new(),
            ),
        ],
    }
}

pub fn context() -> SubscriptionContext {
    SubscriptionContext::new("Production", "s1")
}

/// Inventory-backed provider that counts calls and can be switched to fail.
pub struct CountingProvider {
    inner: InventoryProvider,
    pub list_calls: AtomicUsize,
    pub group_calls: AtomicUsize,
    pub tag_calls: AtomicUsize,
    pub filter_calls: AtomicUsize,
    pub subscription_calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl CountingProvider {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inner: InventoryProvider::new(CloudProvider::Azure, inventory),
            list_calls: AtomicUsize::new(0),
            group_calls: AtomicUsize::new(0),
            tag_calls: AtomicUsize::new(0),
            filter_calls: AtomicUsize::new(0),
            subscription_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, counter: &AtomicUsize) -> Result<(), ProviderError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("provider unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderClient for CountingProvider {
    fn provider(&self) -> CloudProvider {
        CloudProvider::Azure
    }

    async fn list_resources(&self) -> Result<Vec<GenericResource>, ProviderError> {
        self.check(&self.list_calls)?;
        self.inner.list_resources().await
    }

    async fn list_by_resource_group(
        &self,
        name: &str,
    ) -> Result<Vec<GenericResource>, ProviderError> {
        self.check(&self.group_calls)?;
        self.inner.list_by_resource_group(name).await
    }

    async fn list_by_tag(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<GenericResource>, ProviderError> {
        self.check(&self.tag_calls)?;
        self.inner.list_by_tag(key, value).await
    }

    async fn filter_resource_groups(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ResourceGroup>, ProviderError> {
        self.check(&self.filter_calls)?;
        self.inner.filter_resource_groups(name).await
    }

    async fn get_subscription(
        &self,
        name: &str,
        id: &str,
    ) -> Result<Option<Subscription>, ProviderError> {
        self.check(&self.subscription_calls)?;
        self.inner.get_subscription(name, id).await
    }
}

/// Store whose every call fails.
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }
}

pub fn runtime(workers: usize, queue_capacity: usize) -> Arc<BackgroundRuntime> {
    Arc::new(BackgroundRuntime::start(
        &RuntimeConfig {
            workers,
            queue_capacity,
            drain_timeout_ms: 2_000,
        },
        Arc::new(NoopMetrics),
    ))
}

/// Everything wired together over in-memory collaborators.
pub struct Harness {
    pub provider: Arc<CountingProvider>,
    pub store: Arc<dyn CacheStore>,
    pub bus: Arc<MemoryBus>,
    pub observer: Arc<RecordingObserver>,
    pub runtime: Arc<BackgroundRuntime>,
    pub fetcher: Arc<CacheAsideFetcher>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub query: CatalogQueryService,
}

impl Harness {
    pub fn new(inventory: Inventory) -> Self {
        Self::with_store(inventory, Arc::new(MemoryCacheStore::new("app")))
    }

    pub fn with_store(inventory: Inventory, store: Arc<dyn CacheStore>) -> Self {
        let provider = Arc::new(CountingProvider::new(inventory));
        let bus = Arc::new(MemoryBus::default());
        let observer = Arc::new(RecordingObserver::default());
        let runtime = runtime(2, 64);
        let fetcher = Arc::new(CacheAsideFetcher::new(
            Arc::clone(&store),
            Arc::clone(&runtime),
            observer.clone(),
            Duration::from_secs(60),
        ));
        let binding = ProviderBinding {
            provider: CachedProvider::new(provider.clone(), Arc::clone(&fetcher), 1),
            context: context(),
        };
        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                bus.clone(),
                Arc::clone(&runtime),
                observer.clone(),
                BusSection::default(),
            )
            .with_binding(binding),
        );
        let query = CatalogQueryService::new(
            Arc::clone(&orchestrator),
            Arc::clone(&fetcher),
            CloudProvider::Azure,
            1,
        );

        Self {
            provider,
            store,
            bus,
            observer,
            runtime,
            fetcher,
            orchestrator,
            query,
        }
    }

    /// Waits until queued background work has finished.
    pub async fn settle(&self) {
        wait_until(|| {
            let stats = self.runtime.stats();
            stats.completed + stats.failed >= stats.submitted
        })
        .await;
    }
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
