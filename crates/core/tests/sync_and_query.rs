//! Orchestrator and query service over the in-memory harness.

mod common;

use async_trait::async_trait;
use cloudscope_api::{
    CacheStore, CatalogEntity, CatalogError, CloudProvider, Envelope, FilterKind, PublishError,
    Publisher, SyncOutcome, TargetResource, TargetTag, Trigger,
};
use cloudscope_core::config::BusSection;
use cloudscope_core::query::CatalogQueryService;
use cloudscope_core::{CachedProvider, ProviderBinding, SyncOrchestrator};
use common::{Harness, context, inventory, wait_until};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn names(entities: &[CatalogEntity]) -> Vec<&str> {
    entities.iter().map(|e| e.metadata.name.as_str()).collect()
}

struct RejectingPublisher;

#[async_trait]
impl Publisher for RejectingPublisher {
    async fn publish(&self, _envelope: &Envelope) -> Result<(), PublishError> {
        Err(PublishError::Connection("broker unreachable".to_string()))
    }
}

/// A full sync returns the hierarchy and publishes it in the background.
#[tokio::test]
async fn test_full_sync_publishes_catalog() {
    let h = Harness::new(inventory());
    let entities = h
        .orchestrator
        .trigger_sync(&Trigger::for_provider("azure"))
        .await
        .unwrap();
    assert_eq!(entities.len(), 6);

    wait_until(|| h.bus.sent().len() == 1).await;
    let envelope = &h.bus.sent()[0];
    assert_eq!(envelope.exchange, "collector");
    assert_eq!(envelope.routing_key, "backstage");
    assert_eq!(envelope.queue, "manifests");
    assert_eq!(envelope.content_type, "application/json");
    let published: Vec<CatalogEntity> = serde_json::from_slice(&envelope.body).unwrap();
    assert_eq!(published, entities);

    wait_until(|| {
        h.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::Published { entities: 6, .. }))
    })
    .await;
}

/// A resource-group target wins over a tag target.
#[tokio::test]
async fn test_resource_group_selection() {
    let h = Harness::new(inventory());
    let trigger = Trigger {
        provider: "azure".to_string(),
        target_resource: TargetResource {
            name: "rg2".to_string(),
            resource_type: String::new(),
        },
        target_tag: TargetTag {
            key: "env".to_string(),
            value: "prod".to_string(),
        },
    };

    let entities = h.orchestrator.trigger_sync(&trigger).await.unwrap();
    assert_eq!(names(&entities), ["Production", "rg2", "vm1"]);
    assert_eq!(h.provider.group_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.provider.tag_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.provider.list_calls.load(Ordering::SeqCst), 0);
}

/// Tag selection needs both key and value; otherwise everything is listed.
#[tokio::test]
async fn test_tag_selection_and_fallback() {
    let h = Harness::new(inventory());
    let mut trigger = Trigger::for_provider("azure");
    trigger.target_tag = TargetTag {
        key: "env".to_string(),
        value: "prod".to_string(),
    };
    let entities = h.orchestrator.trigger_sync(&trigger).await.unwrap();
    assert_eq!(names(&entities), ["Production", "rg1", "acct1"]);

    trigger.target_tag.value.clear();
    let entities = h.orchestrator.trigger_sync(&trigger).await.unwrap();
    assert_eq!(entities.len(), 6);
    assert_eq!(h.provider.list_calls.load(Ordering::SeqCst), 1);
}

/// Unknown and unbound providers are rejected before any provider call.
#[tokio::test]
async fn test_unsupported_providers() {
    let h = Harness::new(inventory());
    for name in ["oracle", "aws", ""] {
        let err = h
            .orchestrator
            .trigger_sync(&Trigger::for_provider(name))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedProvider(ref p) if p == name));
    }
    assert!(h.orchestrator.is_bound(CloudProvider::Azure));
    assert!(!h.orchestrator.is_bound(CloudProvider::Gcp));
    assert_eq!(h.provider.list_calls.load(Ordering::SeqCst), 0);
}

/// Provider failures surface to the caller and nothing is published.
#[tokio::test]
async fn test_provider_failure_aborts_sync() {
    let h = Harness::new(inventory());
    h.provider.fail(true);
    let err = h
        .orchestrator
        .trigger_sync(&Trigger::for_provider("azure"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Lookup {
            operation: "list_resources",
            ..
        }
    ));
    h.settle().await;
    assert!(h.bus.sent().is_empty());
}

/// Publish failures are observed but do not change the sync result.
#[tokio::test]
async fn test_publish_failure_is_only_reported() {
    let h = Harness::new(inventory());
    let orchestrator = SyncOrchestrator::new(
        Arc::new(RejectingPublisher),
        Arc::clone(&h.runtime),
        h.observer.clone(),
        BusSection::default(),
    )
    .with_binding(ProviderBinding {
        provider: CachedProvider::new(h.provider.clone(), Arc::clone(&h.fetcher), 1),
        context: context(),
    });

    let entities = orchestrator
        .trigger_sync(&Trigger::for_provider("azure"))
        .await
        .unwrap();
    assert_eq!(entities.len(), 6);

    wait_until(|| {
        h.observer
            .outcomes()
            .iter()
            .any(|o| matches!(o, SyncOutcome::PublishFailed { .. }))
    })
    .await;
}

/// Repeated syncs read the provider through the cache and refresh in the background.
#[tokio::test]
async fn test_provider_reads_are_cached() {
    let h = Harness::new(inventory());
    let trigger = Trigger::for_provider("azure");
    h.orchestrator.trigger_sync(&trigger).await.unwrap();
    assert_eq!(h.provider.subscription_calls.load(Ordering::SeqCst), 1);

    let again = h.orchestrator.trigger_sync(&trigger).await.unwrap();
    assert_eq!(again.len(), 6);
    wait_until(|| h.provider.list_calls.load(Ordering::SeqCst) == 2).await;
}

/// An empty filter returns and caches the unfiltered catalog.
#[tokio::test]
async fn test_get_all_with_empty_filter() {
    let h = Harness::new(inventory());
    let filter = FilterKind::default();
    let entities = h.query.get_all(&filter).await.unwrap();
    assert_eq!(entities.len(), 6);

    let key = CatalogQueryService::query_key(&filter);
    assert_eq!(key, "backstage_get_all_kinds");
    assert!(h.store.get(&key).await.unwrap().is_some());

    // Served from cache, refreshed by a background sync.
    let cached = h.query.get_all(&filter).await.unwrap();
    assert_eq!(cached, entities);
    wait_until(|| h.provider.list_calls.load(Ordering::SeqCst) >= 2).await;
}

/// Filters match case-insensitively; misses are empty and not cached.
#[tokio::test]
async fn test_get_all_with_filter() {
    let h = Harness::new(inventory());
    let filter = FilterKind {
        name: "ACCT1".to_string(),
        ..Default::default()
    };
    assert_eq!(names(&h.query.get_all(&filter).await.unwrap()), ["acct1"]);

    let missing = FilterKind {
        name: "nothing".to_string(),
        ..Default::default()
    };
    assert!(h.query.get_all(&missing).await.unwrap().is_empty());
    let key = CatalogQueryService::query_key(&missing);
    assert!(h.store.get(&key).await.unwrap().is_none());
}

/// get_kind requires every part and delegates to get_all.
#[tokio::test]
async fn test_get_kind() {
    let h = Harness::new(inventory());
    let err = h.query.get_kind("default", "", "vm1").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidArgument(_)));

    let found = h.query.get_kind("default", "resource", "vm1").await.unwrap();
    assert_eq!(names(&found), ["vm1"]);
    assert_eq!(found[0].kind, "Resource");
}

/// Sync errors surface through the query path on a miss.
#[tokio::test]
async fn test_get_all_propagates_sync_failure() {
    let h = Harness::new(inventory());
    h.provider.fail(true);
    let err = h.query.get_all(&FilterKind::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Lookup { .. }));
}
