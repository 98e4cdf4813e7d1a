//! Provider client backed by an exported JSON inventory.

use crate::mapper::parse_resource_id;
use async_trait::async_trait;
use cloudscope_api::{
    CloudProvider, GenericResource, ProviderClient, ProviderError, ResourceGroup, Subscription,
    tag_value,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Inventory {
    pub subscriptions: Vec<Subscription>,
    pub resource_groups: Vec<ResourceGroup>,
    pub resources: Vec<GenericResource>,
}

pub struct InventoryProvider {
    provider: CloudProvider,
    inventory: Inventory,
}

impl InventoryProvider {
    pub fn new(provider: CloudProvider, inventory: Inventory) -> Self {
        Self {
            provider,
            inventory,
        }
    }

    pub async fn load(provider: CloudProvider, path: &Path) -> Result<Self, ProviderError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            ProviderError::Inventory(format!("cannot read {}: {e}", path.display()))
        })?;
        let inventory: Inventory = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Inventory(format!("{}: {e}", path.display())))?;
        info!(
            path = %path.display(),
            subscriptions = inventory.subscriptions.len(),
            resource_groups = inventory.resource_groups.len(),
            resources = inventory.resources.len(),
            "inventory loaded"
        );
        Ok(Self::new(provider, inventory))
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
}

#[async_trait]
impl ProviderClient for InventoryProvider {
    fn provider(&self) -> CloudProvider {
        self.provider
    }

    async fn list_resources(&self) -> Result<Vec<GenericResource>, ProviderError> {
        Ok(self.inventory.resources.clone())
    }

    async fn list_by_resource_group(
        &self,
        name: &str,
    ) -> Result<Vec<GenericResource>, ProviderError> {
        let wanted = name.to_lowercase();
        Ok(self
            .inventory
            .resources
            .iter()
            .filter(|r| parse_resource_id(&r.id).resource_group() == Some(wanted.as_str()))
            .cloned()
            .collect())
    }

    async fn list_by_tag(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<GenericResource>, ProviderError> {
        Ok(self
            .inventory
            .resources
            .iter()
            .filter(|r| tag_value(&r.tags, key) == Some(value))
            .cloned()
            .collect())
    }

    async fn filter_resource_groups(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ResourceGroup>, ProviderError> {
        let Some(name) = name else {
            return Ok(self.inventory.resource_groups.clone());
        };
        let needle = name.to_lowercase();
        Ok(self
            .inventory
            .resource_groups
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_subscription(
        &self,
        name: &str,
        id: &str,
    ) -> Result<Option<Subscription>, ProviderError> {
        Ok(self
            .inventory
            .subscriptions
            .iter()
            .find(|s| {
                (!name.is_empty() && s.display_name.eq_ignore_ascii_case(name))
                    || (!id.is_empty() && s.subscription_id == id)
            })
            .cloned())
    }
}
