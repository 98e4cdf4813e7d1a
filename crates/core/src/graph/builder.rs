//! Builds the subscription → resource group → resource hierarchy from a flat resource list.

use super::CatalogGraph;
use crate::mapper::{MapToEntity, parse_resource_id};
use async_trait::async_trait;
use cloudscope_api::{
    CatalogEntity, CatalogError, CatalogResult, GenericResource, ProviderError, ResourceGroup,
    Subscription,
};
use schemars::JsonSchema;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Parent lookups needed while building. Errors abort the build.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Resource groups matching `name`, as the provider filters them.
    async fn resource_groups(&self, name: &str) -> CatalogResult<Vec<ResourceGroup>>;

    async fn subscription(
        &self,
        context: &SubscriptionContext,
    ) -> CatalogResult<Option<Subscription>>;
}

/// The subscription every resource of one build belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, JsonSchema)]
pub struct SubscriptionContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

impl SubscriptionContext {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

pub struct DependencyGraphBuilder<'a> {
    lookup: &'a dyn ResourceLookup,
    context: SubscriptionContext,
    subscription: Option<Subscription>,
    groups: HashMap<String, ResourceGroup>,
    graph: CatalogGraph,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(lookup: &'a dyn ResourceLookup, context: SubscriptionContext) -> Self {
        Self {
            lookup,
            context,
            subscription: None,
            groups: HashMap::new(),
            graph: CatalogGraph::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Adds one batch. Either the whole batch lands or, on the first failure, none of it.
    /// Returns the number of new entities.
    pub async fn add_batch(&mut self, resources: &[GenericResource]) -> CatalogResult<usize> {
        let mut staged = self.graph.clone();
        let before = staged.len();

        for resource in resources.iter().filter(|r| !r.id.is_empty()) {
            self.add_resource(&mut staged, resource).await?;
        }

        let added = staged.len() - before;
        self.graph = staged;
        debug!(batch = resources.len(), added, "dependency batch merged");
        Ok(added)
    }

    pub fn finish(self) -> Vec<CatalogEntity> {
        self.graph.into_entities()
    }

    async fn add_resource(
        &mut self,
        graph: &mut CatalogGraph,
        resource: &GenericResource,
    ) -> CatalogResult<()> {
        let identity = parse_resource_id(&resource.id);
        let group_name = identity.resource_group().ok_or_else(|| {
            CatalogError::lookup(
                "resource_group_segment",
                ProviderError::NotFound(format!("no resource group in `{}`", resource.id)),
            )
        })?;

        let group = self.resolve_group(group_name).await?;
        let subscription = self.resolve_subscription().await?;

        let sub_node = match subscription.map_entity()? {
            Some(entity) => Some(graph.insert(entity).0),
            None => None,
        };

        let group_node = match group.map_entity()? {
            Some(mut entity) => {
                if let Some(parent) = sub_node.and_then(|idx| graph.entity(idx)) {
                    entity.spec.depends_on = vec![parent.reference()];
                }
                let (idx, added) = graph.insert(entity);
                if let Some(parent) = sub_node {
                    link(graph, idx, added, parent);
                }
                Some(idx)
            }
            None => None,
        };

        if let Some(mut entity) = resource.map_entity()? {
            if let Some(parent) = group_node.and_then(|idx| graph.entity(idx)) {
                entity.spec.depends_on = vec![parent.reference()];
            }
            let (idx, added) = graph.insert(entity);
            if let Some(parent) = group_node {
                link(graph, idx, added, parent);
            }
            trace!(resource = %resource.name, added, "resource mapped");
        }
        Ok(())
    }

    async fn resolve_group(&mut self, name: &str) -> CatalogResult<ResourceGroup> {
        if let Some(group) = self.groups.get(name) {
            return Ok(group.clone());
        }

        let candidates = self.lookup.resource_groups(name).await?;
        let chosen = candidates
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .or_else(|| candidates.first())
            .cloned()
            .ok_or_else(|| {
                CatalogError::lookup(
                    "filter_resource_groups",
                    ProviderError::NotFound(format!("resource group `{name}`")),
                )
            })?;

        self.groups.insert(name.to_string(), chosen.clone());
        Ok(chosen)
    }

    async fn resolve_subscription(&mut self) -> CatalogResult<Subscription> {
        if let Some(subscription) = &self.subscription {
            return Ok(subscription.clone());
        }

        let subscription = self
            .lookup
            .subscription(&self.context)
            .await?
            .ok_or_else(|| {
                CatalogError::lookup(
                    "get_subscription",
                    ProviderError::NotFound(format!(
                        "subscription name=`{}` id=`{}`",
                        self.context.name, self.context.id
                    )),
                )
            })?;

        self.subscription = Some(subscription.clone());
        Ok(subscription)
    }
}

/// Adds the child → parent edge unless `child` is a surviving duplicate that already
/// depends on a different parent.
fn link(graph: &mut CatalogGraph, child: NodeIndex, added: bool, parent: NodeIndex) {
    let declared = match (graph.entity(child), graph.entity(parent)) {
        (Some(c), Some(p)) => c.spec.depends_on.contains(&p.reference()),
        _ => false,
    };
    if added || declared {
        graph.add_dependency(child, parent);
    }
}

/// Single-batch convenience over [`DependencyGraphBuilder`].
pub async fn build_catalog(
    lookup: &dyn ResourceLookup,
    context: SubscriptionContext,
    resources: &[GenericResource],
) -> CatalogResult<Vec<CatalogEntity>> {
    let mut builder = DependencyGraphBuilder::new(lookup, context);
    builder.add_batch(resources).await?;
    Ok(builder.finish())
}
