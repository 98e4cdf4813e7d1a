use crate::error::ProviderError;
use crate::models::{CloudProvider, GenericResource, ResourceGroup, Subscription};
use async_trait::async_trait;

/// Read-only view of a cloud provider's resource inventory.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> CloudProvider;

    async fn list_resources(&self) -> Result<Vec<GenericResource>, ProviderError>;

    async fn list_by_resource_group(&self, name: &str)
    -> Result<Vec<GenericResource>, ProviderError>;

    async fn list_by_tag(&self, key: &str, value: &str)
    -> Result<Vec<GenericResource>, ProviderError>;

    /// Resource groups whose name contains `name`, or every group when `None`.
    async fn filter_resource_groups(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ResourceGroup>, ProviderError>;

    /// Looks a subscription up by display name or id. `Ok(None)` when neither matches.
    async fn get_subscription(
        &self,
        name: &str,
        id: &str,
    ) -> Result<Option<Subscription>, ProviderError>;
}
