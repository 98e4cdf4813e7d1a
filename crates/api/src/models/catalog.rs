use crate::error::ValidationError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_KIND: &str = "Resource";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Prefix used by dependency references (`resource:<name>`).
pub const REFERENCE_PREFIX: &str = "resource";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct EntityMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpec {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_of: Vec<String>,
}

/// Catalog descriptor produced for one subscription, resource group or resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct CatalogEntity {
    pub metadata: EntityMetadata,
    pub spec: EntitySpec,
    #[serde(default)]
    pub kind: String,
}

/// Whether an entity must carry an owner to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerPolicy {
    Required,
    Optional,
}

/// Deduplication identity: (name, namespace, type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub name: String,
    pub namespace: String,
    pub entity_type: String,
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.entity_type, self.name)
    }
}

impl CatalogEntity {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            name: self.metadata.name.clone(),
            namespace: self.metadata.namespace.clone(),
            entity_type: self.spec.entity_type.clone(),
        }
    }

    /// Dependency reference pointing at this entity.
    pub fn reference(&self) -> String {
        format!("{}:{}", REFERENCE_PREFIX, self.metadata.name)
    }

    pub fn apply_defaults(&mut self) {
        if self.kind.is_empty() {
            self.kind = DEFAULT_KIND.to_string();
        }
        if self.metadata.namespace.is_empty() {
            self.metadata.namespace = DEFAULT_NAMESPACE.to_string();
        }
    }

    /// Fills defaults, then checks required fields.
    pub fn validate(&mut self, owner: OwnerPolicy) -> Result<(), ValidationError> {
        self.apply_defaults();

        if self.metadata.name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.spec.entity_type.is_empty() {
            return Err(ValidationError::MissingType {
                name: self.metadata.name.clone(),
            });
        }
        if owner == OwnerPolicy::Required && self.spec.owner.is_empty() {
            return Err(ValidationError::MissingOwner {
                name: self.metadata.name.clone(),
            });
        }
        Ok(())
    }
}
