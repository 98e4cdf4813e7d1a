//! Catalog dependency graph
//!
//! Nodes are catalog entities keyed by their identity triple. Edges point from a child to
//! the parent it depends on.

pub mod builder;

pub use builder::{DependencyGraphBuilder, ResourceLookup, SubscriptionContext, build_catalog};

use cloudscope_api::{CatalogEntity, EntityKey};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

/// Marker weight for a "depends on" edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependsOn;

#[derive(Debug, Clone, Default)]
pub struct CatalogGraph {
    topology: StableDiGraph<CatalogEntity, DependsOn>,
    key_index: HashMap<EntityKey, NodeIndex>,
}

impl CatalogGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.topology.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.topology.node_count() == 0
    }

    pub fn find(&self, key: &EntityKey) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    pub fn entity(&self, idx: NodeIndex) -> Option<&CatalogEntity> {
        self.topology.node_weight(idx)
    }

    /// Inserts unless an entity with the same identity exists. Returns the node and whether
    /// it was newly added.
    pub fn insert(&mut self, entity: CatalogEntity) -> (NodeIndex, bool) {
        let key = entity.key();
        if let Some(&idx) = self.key_index.get(&key) {
            return (idx, false);
        }
        let idx = self.topology.add_node(entity);
        self.key_index.insert(key, idx);
        (idx, true)
    }

    pub fn add_dependency(&mut self, child: NodeIndex, parent: NodeIndex) {
        if self.topology.find_edge(child, parent).is_none() {
            self.topology.add_edge(child, parent, DependsOn);
        }
    }

    /// Entities in insertion order, with `dependencyOf` filled from incoming edges.
    pub fn into_entities(self) -> Vec<CatalogEntity> {
        let mut nodes: Vec<NodeIndex> = self.topology.node_indices().collect();
        nodes.sort();

        let mut dependents: HashMap<NodeIndex, Vec<String>> = HashMap::new();
        for &parent in &nodes {
            let mut children: Vec<NodeIndex> = self
                .topology
                .neighbors_directed(parent, Direction::Incoming)
                .collect();
            children.sort();
            let refs = children
                .into_iter()
                .filter_map(|child| self.topology.node_weight(child))
                .map(CatalogEntity::reference)
                .collect();
            dependents.insert(parent, refs);
        }

        let mut topology = self.topology;
        nodes
            .into_iter()
            .filter_map(|idx| {
                let mut entity = topology.remove_node(idx)?;
                if let Some(refs) = dependents.remove(&idx) {
                    entity.spec.dependency_of = refs;
                }
                Some(entity)
            })
            .collect()
    }
}
