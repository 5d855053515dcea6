use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::Node;
use crate::errors::{ModicioError, Result};

/// Prefix of every uri minted by the evolution engine
pub const URI_PREFIX: &str = "modicio:";

/// Build the uri the evolution engine assigns to `name`
pub fn mint_uri(name: &str) -> String {
    format!("{}{}", URI_PREFIX, name)
}

/// The type graph: an arena of nodes keyed by uri
///
/// Edges are owned uri strings inside each `Node` and are resolved through
/// this map at traversal time, so a node may point at a target that is
/// absent (not yet created, or living in another model).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    nodes: BTreeMap<String, Node>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a node list; uris must be unique
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut model = Self::new();
        for node in nodes {
            model.insert_node(node)?;
        }
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    pub fn node(&self, uri: &str) -> Option<&Node> {
        self.nodes.get(uri)
    }

    pub fn node_mut(&mut self, uri: &str) -> Option<&mut Node> {
        self.nodes.get_mut(uri)
    }

    /// Get a node, or fail with `NodeNotFound`
    pub fn require_node(&self, uri: &str) -> Result<&Node> {
        self.nodes
            .get(uri)
            .ok_or_else(|| ModicioError::NodeNotFound {
                uri: uri.to_string(),
            })
    }

    pub fn require_node_mut(&mut self, uri: &str) -> Result<&mut Node> {
        self.nodes
            .get_mut(uri)
            .ok_or_else(|| ModicioError::NodeNotFound {
                uri: uri.to_string(),
            })
    }

    /// Insert a node; fails with `NodeAlreadyExists` on a uri clash
    pub fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.uri) {
            return Err(ModicioError::NodeAlreadyExists { uri: node.uri });
        }
        self.nodes.insert(node.uri.clone(), node);
        Ok(())
    }

    pub fn remove_node(&mut self, uri: &str) -> Option<Node> {
        self.nodes.remove(uri)
    }

    /// Nodes in uri order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// First node (in uri order) whose name equals `name`, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a class reference written in an evolution statement.
    ///
    /// Matches the minted uri `modicio:<name>` first, then falls back to the
    /// node name. Both comparisons ignore case.
    pub fn resolve_class(&self, name: &str) -> Option<&Node> {
        let minted = mint_uri(name);
        self.nodes
            .values()
            .find(|n| n.uri.eq_ignore_ascii_case(&minted))
            .or_else(|| self.find_by_name(name))
    }

    /// Re-stamp the variant half of every node's annotation
    pub fn stamp_variant(&mut self, variant_id: &str, variant_time: DateTime<Utc>) {
        for node in self.nodes.values_mut() {
            node.annotation.set_variant(variant_id, variant_time);
        }
    }
}
