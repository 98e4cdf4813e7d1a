//! Provider reads routed through the cache-aside fetcher.

use super::DynProviderClient;
use crate::cache::CacheAsideFetcher;
use crate::graph::{ResourceLookup, SubscriptionContext};
use async_trait::async_trait;
use cloudscope_api::{
    CatalogError, CatalogResult, CloudProvider, GenericResource, ResourceGroup, ResourceSelection,
    Subscription,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct CachedProvider {
    client: DynProviderClient,
    fetcher: Arc<CacheAsideFetcher>,
    ttl_units: u32,
}

impl CachedProvider {
    pub fn new(client: DynProviderClient, fetcher: Arc<CacheAsideFetcher>, ttl_units: u32) -> Self {
        Self {
            client,
            fetcher,
            ttl_units,
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.client.provider()
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.client.provider(), suffix)
    }

    /// Resources chosen by a trigger's selection.
    pub async fn select(&self, selection: &ResourceSelection) -> CatalogResult<Vec<GenericResource>> {
        match selection {
            ResourceSelection::ResourceGroup(name) => self.list_by_resource_group(name).await,
            ResourceSelection::Tag { key, value } => self.list_by_tag(key, value).await,
            ResourceSelection::All => self.list_resources().await,
        }
    }

    pub async fn list_resources(&self) -> CatalogResult<Vec<GenericResource>> {
        let client = Arc::clone(&self.client);
        self.fetcher
            .resolve(&self.key("all_resources"), self.ttl_units, move || async move {
                client
                    .list_resources()
                    .await
                    .map_err(|e| CatalogError::lookup("list_resources", e))
            })
            .await
    }

    pub async fn list_by_resource_group(&self, name: &str) -> CatalogResult<Vec<GenericResource>> {
        let client = Arc::clone(&self.client);
        let owned = name.to_string();
        self.fetcher
            .resolve(&self.key(&format!("rsg_{name}")), self.ttl_units, move || async move {
                client
                    .list_by_resource_group(&owned)
                    .await
                    .map_err(|e| CatalogError::lookup("list_by_resource_group", e))
            })
            .await
    }

    pub async fn list_by_tag(&self, key: &str, value: &str) -> CatalogResult<Vec<GenericResource>> {
        let client = Arc::clone(&self.client);
        let (tag_key, tag_value) = (key.to_string(), value.to_string());
        self.fetcher
            .resolve(
                &self.key(&format!("key_{key}_value_{value}")),
                self.ttl_units,
                move || async move {
                    client
                        .list_by_tag(&tag_key, &tag_value)
                        .await
                        .map_err(|e| CatalogError::lookup("list_by_tag", e))
                },
            )
            .await
    }

    pub async fn filter_resource_groups(
        &self,
        name: Option<&str>,
    ) -> CatalogResult<Vec<ResourceGroup>> {
        let client = Arc::clone(&self.client);
        let owned = name.map(str::to_string);
        let key = match name {
            Some(name) => self.key(&format!("filter_rsg_{name}")),
            None => self.key("filter_rsg"),
        };
        self.fetcher
            .resolve(&key, self.ttl_units, move || async move {
                client
                    .filter_resource_groups(owned.as_deref())
                    .await
                    .map_err(|e| CatalogError::lookup("filter_resource_groups", e))
            })
            .await
    }

    pub async fn get_subscription(&self, name: &str, id: &str) -> CatalogResult<Option<Subscription>> {
        let client = Arc::clone(&self.client);
        let (owned_name, owned_id) = (name.to_string(), id.to_string());
        self.fetcher
            .resolve(
                &self.key(&format!("subscription_{name}_{id}")),
                self.ttl_units,
                move || async move {
                    client
                        .get_subscription(&owned_name, &owned_id)
                        .await
                        .map_err(|e| CatalogError::lookup("get_subscription", e))
                },
            )
            .await
    }
}

#[async_trait]
impl ResourceLookup for CachedProvider {
    async fn resource_groups(&self, name: &str) -> CatalogResult<Vec<ResourceGroup>> {
        self.filter_resource_groups(Some(name)).await
    }

    async fn subscription(
        &self,
        context: &SubscriptionContext,
    ) -> CatalogResult<Option<Subscription>> {
        self.get_subscription(&context.name, &context.id).await
    }
}
