//! One synchronization run: select resources, build the catalog, publish it.

use crate::bus::{DynPublisher, catalog_envelope};
use crate::config::BusSection;
use crate::graph::{SubscriptionContext, build_catalog};
use crate::observe::DynObserver;
use crate::provider::CachedProvider;
use cloudscope_api::{
    CatalogEntity, CatalogError, CatalogResult, CloudProvider, PublishError, SyncOutcome, Trigger,
};
use cloudscope_ingest::BackgroundRuntime;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A provider the orchestrator can sync, with the subscription its resources belong to.
#[derive(Clone)]
pub struct ProviderBinding {
    pub provider: CachedProvider,
    pub context: SubscriptionContext,
}

pub struct SyncOrchestrator {
    bindings: HashMap<CloudProvider, ProviderBinding>,
    publisher: DynPublisher,
    runtime: Arc<BackgroundRuntime>,
    observer: DynObserver,
    bus: BusSection,
}

impl SyncOrchestrator {
    pub fn new(
        publisher: DynPublisher,
        runtime: Arc<BackgroundRuntime>,
        observer: DynObserver,
        bus: BusSection,
    ) -> Self {
        Self {
            bindings: HashMap::new(),
            publisher,
            runtime,
            observer,
            bus,
        }
    }

    pub fn register(&mut self, binding: ProviderBinding) {
        self.bindings.insert(binding.provider.provider(), binding);
    }

    pub fn with_binding(mut self, binding: ProviderBinding) -> Self {
        self.register(binding);
        self
    }

    pub fn is_bound(&self, provider: CloudProvider) -> bool {
        self.bindings.contains_key(&provider)
    }

    #[instrument(skip_all, fields(provider = %trigger.provider))]
    pub async fn trigger_sync(&self, trigger: &Trigger) -> CatalogResult<Vec<CatalogEntity>> {
        let binding = trigger
            .provider
            .parse::<CloudProvider>()
            .ok()
            .and_then(|provider| self.bindings.get(&provider))
            .ok_or_else(|| CatalogError::UnsupportedProvider(trigger.provider.clone()))?;

        let selection = trigger.selection();
        debug!(?selection, "selecting resources");
        let resources = binding.provider.select(&selection).await?;
        let entities = build_catalog(&binding.provider, binding.context.clone(), &resources).await?;

        info!(
            resources = resources.len(),
            entities = entities.len(),
            "sync completed"
        );
        self.publish(&entities);
        Ok(entities)
    }

    /// Hands the entity list to the background runtime. Never fails the caller.
    fn publish(&self, entities: &[CatalogEntity]) {
        let routing_key = self.bus.routing_key.clone();
        let envelope = match catalog_envelope(&self.bus, entities) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.observer.record(SyncOutcome::PublishFailed {
                    routing_key,
                    error: PublishError::Rejected(e.to_string()),
                });
                return;
            }
        };

        let publisher = Arc::clone(&self.publisher);
        let observer = Arc::clone(&self.observer);
        let count = entities.len();
        let label = format!("publish:{routing_key}");
        let task_routing_key = routing_key.clone();

        let submitted = self.runtime.submit(label.clone(), async move {
            match publisher.publish(&envelope).await {
                Ok(()) => {
                    observer.record(SyncOutcome::Published {
                        routing_key: task_routing_key,
                        entities: count,
                    });
                    Ok(())
                }
                Err(error) => {
                    let message = error.to_string();
                    observer.record(SyncOutcome::PublishFailed {
                        routing_key: task_routing_key,
                        error,
                    });
                    Err(message)
                }
            }
        });

        if let Err(e) = submitted {
            self.observer.record(SyncOutcome::TaskRejected {
                label,
                error: e.to_string(),
            });
        }
    }
}
