//! Raw provider records.
//!
//! Field names follow the provider's JSON wire format (camelCase), so inventories exported from
//! the provider can be deserialized without translation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider tags. A tag may be present with no value.
pub type Tags = BTreeMap<String, Option<String>>;

/// Returns the value of a tag only when the key is present with a value.
pub fn tag_value<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).and_then(|v| v.as_deref())
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPolicies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spending_limit: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_policies: Option<SubscriptionPolicies>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub properties: ResourceGroupProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// One raw provider object of any supported shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResource {
    Subscription(Subscription),
    ResourceGroup(ResourceGroup),
    Generic(GenericResource),
}

impl RawResource {
    pub fn id(&self) -> &str {
        match self {
            RawResource::Subscription(s) => &s.id,
            RawResource::ResourceGroup(g) => &g.id,
            RawResource::Generic(r) => &r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawResource::Subscription(s) => &s.display_name,
            RawResource::ResourceGroup(g) => &g.name,
            RawResource::Generic(r) => &r.name,
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            RawResource::Subscription(s) => &s.tags,
            RawResource::ResourceGroup(g) => &g.tags,
            RawResource::Generic(r) => &r.tags,
        }
    }
}

impl From<Subscription> for RawResource {
    fn from(value: Subscription) -> Self {
        RawResource::Subscription(value)
    }
}

impl From<ResourceGroup> for RawResource {
    fn from(value: ResourceGroup) -> Self {
        RawResource::ResourceGroup(value)
    }
}

impl From<GenericResource> for RawResource {
    fn from(value: GenericResource) -> Self {
        RawResource::Generic(value)
    }
}
