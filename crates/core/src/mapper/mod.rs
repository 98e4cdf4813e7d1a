//! Raw provider records to catalog entities.
//!
//! Each raw shape has its own [`MapToEntity`] impl. Subscriptions and resource groups
//! without `owner` and `system` tags are excluded (`Ok(None)`); generic resources keep
//! those fields blank instead.

pub mod resource_id;

pub use resource_id::{ResourceIdentity, parse_resource_id};

use cloudscope_api::{
    CatalogEntity, CatalogResult, EntityMetadata, EntitySpec, GenericResource, OwnerPolicy,
    RawResource, ResourceGroup, Subscription, Tags, tag_value,
};
use std::collections::BTreeMap;

pub const SUBSCRIPTION_TYPE: &str = "subscription";

const OWNER_TAG: &str = "owner";
const SYSTEM_TAG: &str = "system";

pub trait MapToEntity {
    const OWNER_POLICY: OwnerPolicy;

    /// `Ok(None)` when tag policy excludes the record; `Err` when validation fails.
    fn map_entity(&self) -> CatalogResult<Option<CatalogEntity>>;
}

impl MapToEntity for Subscription {
    const OWNER_POLICY: OwnerPolicy = OwnerPolicy::Required;

    fn map_entity(&self) -> CatalogResult<Option<CatalogEntity>> {
        let mut annotations = BTreeMap::new();
        if let Some(state) = &self.state {
            annotations.insert("subscription_state".to_string(), state.clone());
        }
        if let Some(policies) = &self.subscription_policies {
            if let Some(quota) = &policies.quota_id {
                annotations.insert("subscription_quota".to_string(), quota.clone());
            }
            if let Some(limit) = &policies.spending_limit {
                annotations.insert("subscription_limit".to_string(), limit.clone());
            }
        }

        let Some((owner, system)) = required_ownership(&self.tags) else {
            return Ok(None);
        };

        finish(
            entity(&self.display_name, SUBSCRIPTION_TYPE, annotations, &self.tags, owner, system),
            Self::OWNER_POLICY,
        )
    }
}

impl MapToEntity for ResourceGroup {
    const OWNER_POLICY: OwnerPolicy = OwnerPolicy::Required;

    fn map_entity(&self) -> CatalogResult<Option<CatalogEntity>> {
        let (family, kind) = split_provider_type(&self.resource_type);
        let mut annotations = type_annotations(&family, &kind);
        if let Some(state) = &self.properties.provisioning_state {
            annotations.insert("resource_state".to_string(), state.to_lowercase());
        }

        let Some((owner, system)) = required_ownership(&self.tags) else {
            return Ok(None);
        };

        finish(
            entity(&self.name, &kind, annotations, &self.tags, owner, system),
            Self::OWNER_POLICY,
        )
    }
}

impl MapToEntity for GenericResource {
    const OWNER_POLICY: OwnerPolicy = OwnerPolicy::Optional;

    fn map_entity(&self) -> CatalogResult<Option<CatalogEntity>> {
        let (family, kind) = split_provider_type(&self.resource_type);
        let mut annotations = type_annotations(&family, &kind);
        if let Some(state) = &self.provisioning_state {
            annotations.insert("resource_state".to_string(), state.clone());
        }

        let owner = tag_value(&self.tags, OWNER_TAG).unwrap_or_default();
        let system = tag_value(&self.tags, SYSTEM_TAG).unwrap_or_default();

        finish(
            entity(&self.name, &kind, annotations, &self.tags, owner, system),
            Self::OWNER_POLICY,
        )
    }
}

/// Dispatches to the impl for the record's shape.
pub fn map_raw(raw: &RawResource) -> CatalogResult<Option<CatalogEntity>> {
    match raw {
        RawResource::Subscription(s) => s.map_entity(),
        RawResource::ResourceGroup(g) => g.map_entity(),
        RawResource::Generic(r) => r.map_entity(),
    }
}

/// `"Microsoft.Storage/storageAccounts"` -> `("microsoft.storage", "storageaccounts")`.
pub fn split_provider_type(provider_type: &str) -> (String, String) {
    let mut parts = provider_type.split('/');
    let family = parts.next().unwrap_or_default().to_lowercase();
    let kind = parts.next().unwrap_or_default().to_lowercase();
    (family, kind)
}

fn required_ownership(tags: &Tags) -> Option<(&str, &str)> {
    let owner = tag_value(tags, OWNER_TAG)?;
    let system = tag_value(tags, SYSTEM_TAG)?;
    Some((owner, system))
}

fn type_annotations(family: &str, kind: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("resource_family".to_string(), family.to_string()),
        ("resource_type".to_string(), kind.to_string()),
    ])
}

fn labels(tags: &Tags) -> BTreeMap<String, String> {
    tags.iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect()
}

fn entity(
    name: &str,
    entity_type: &str,
    annotations: BTreeMap<String, String>,
    tags: &Tags,
    owner: &str,
    system: &str,
) -> CatalogEntity {
    CatalogEntity {
        metadata: EntityMetadata {
            name: name.to_string(),
            labels: labels(tags),
            annotations,
            ..Default::default()
        },
        spec: EntitySpec {
            entity_type: entity_type.to_string(),
            owner: owner.to_string(),
            system: system.to_string(),
            ..Default::default()
        },
        kind: String::new(),
    }
}

fn finish(mut entity: CatalogEntity, policy: OwnerPolicy) -> CatalogResult<Option<CatalogEntity>> {
    entity.validate(policy)?;
    Ok(Some(entity))
}
