use crate::models::catalog::CatalogEntity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider names understood by the collector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Azure,
    Aws,
    Gcp,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Azure => "azure",
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Ok(CloudProvider::Azure),
            "aws" => Ok(CloudProvider::Aws),
            "gcp" => Ok(CloudProvider::Gcp),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct TargetResource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct TargetTag {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Selection criteria for one synchronization run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct Trigger {
    pub provider: String,
    #[serde(default)]
    pub target_resource: TargetResource,
    #[serde(default)]
    pub target_tag: TargetTag,
}

/// The resource subset a trigger selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSelection {
    ResourceGroup(String),
    Tag { key: String, value: String },
    All,
}

impl Trigger {
    pub fn for_provider(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// First match wins: resource group, then tag, then everything.
    pub fn selection(&self) -> ResourceSelection {
        if !self.target_resource.name.is_empty() {
            ResourceSelection::ResourceGroup(self.target_resource.name.clone())
        } else if !self.target_tag.key.is_empty() && !self.target_tag.value.is_empty() {
            ResourceSelection::Tag {
                key: self.target_tag.key.clone(),
                value: self.target_tag.value.clone(),
            }
        } else {
            ResourceSelection::All
        }
    }
}

/// Catalog query filter; every field is optional and matched case-insensitively.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct FilterKind {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
}

impl FilterKind {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.kind.is_empty() && self.namespace.is_empty()
    }

    /// Concatenation of the fields in namespace, kind, name order.
    pub fn key_suffix(&self) -> String {
        format!("{}{}{}", self.namespace, self.kind, self.name)
    }

    pub fn matches(&self, entity: &CatalogEntity) -> bool {
        field_matches(&self.name, &entity.metadata.name)
            && field_matches(&self.kind, &entity.kind)
            && field_matches(&self.namespace, &entity.metadata.namespace)
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted.to_lowercase() == actual.to_lowercase()
}
