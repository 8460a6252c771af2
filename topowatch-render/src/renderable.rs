//! Rendered nodes and the graphs built from them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use topowatch_types::{EdgeMetadata, Node, StringSet};

/// A node of a rendered topology.
///
/// Wraps the report [`Node`] it was derived from together with display
/// labels and the IDs of the raw nodes that were folded into it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderableNode {
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_major: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_minor: String,

    /// Sort key used by views to group similar nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rank: String,

    /// Synthetic stand-in for something never observed directly.
    #[serde(default)]
    pub pseudo: bool,

    /// IDs of the report nodes that contributed to this node.
    #[serde(default, skip_serializing_if = "StringSet::is_empty")]
    pub origins: StringSet,

    /// Total traffic through this node.
    #[serde(default)]
    pub edge_metadata: EdgeMetadata,

    #[serde(default)]
    pub node: Node,
}

impl RenderableNode {
    /// A bare node with no origins.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            node: Node::new(id.clone()),
            id,
            ..Default::default()
        }
    }

    /// A node rendered 1:1 from a report node.
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            origins: StringSet::single(node.id.clone()),
            edge_metadata: node.edges.flatten(),
            node: node.clone(),
            ..Default::default()
        }
    }

    /// A node that stands in for nothing observed.
    pub fn pseudo(id: impl Into<String>, label_major: impl Into<String>) -> Self {
        Self {
            label_major: label_major.into(),
            pseudo: true,
            ..Self::new(id)
        }
    }

    pub fn with_labels(mut self, major: impl Into<String>, minor: impl Into<String>) -> Self {
        self.label_major = major.into();
        self.label_minor = minor.into();
        self
    }

    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = rank.into();
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.node = node.with_id(self.id.clone());
        self
    }

    pub fn with_adjacent(mut self, id: impl Into<String>) -> Self {
        self.node.adjacency.insert(id);
        self
    }

    pub fn adjacency(&self) -> &StringSet {
        &self.node.adjacency
    }

    /// Combine two renderings of the same ID.
    ///
    /// Labels keep whichever side has one (the greater if both do), a node
    /// stays pseudo only if both sides are, and traffic totals add up since
    /// each side accounts for different origins.
    pub fn merge(&self, other: &RenderableNode) -> RenderableNode {
        RenderableNode {
            id: pick(&self.id, &other.id),
            label_major: pick(&self.label_major, &other.label_major),
            label_minor: pick(&self.label_minor, &other.label_minor),
            rank: pick(&self.rank, &other.rank),
            pseudo: self.pseudo && other.pseudo,
            origins: self.origins.merge(&other.origins),
            edge_metadata: self.edge_metadata.flatten(&other.edge_metadata),
            node: self.node.merge(&other.node),
        }
    }
}

fn pick(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => a.max(b).to_string(),
    }
}

/// Rendered nodes keyed by ID.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderableNodes(BTreeMap<String, RenderableNode>);

impl RenderableNodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, merging it with any node already under its ID.
    pub fn add(&mut self, node: RenderableNode) {
        match self.0.get_mut(&node.id) {
            Some(existing) => *existing = existing.merge(&node),
            None => {
                self.0.insert(node.id.clone(), node);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&RenderableNode> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut RenderableNode> {
        self.0.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<RenderableNode> {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RenderableNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut RenderableNode> {
        self.0.values_mut()
    }

    /// Keep only the nodes matching `f`.
    pub fn retain(&mut self, mut f: impl FnMut(&RenderableNode) -> bool) {
        self.0.retain(|_, node| f(node));
    }

    /// Union of two graphs; nodes present in both are merged.
    pub fn merge(&self, other: &RenderableNodes) -> RenderableNodes {
        let mut out = self.clone();
        for node in other.0.values() {
            out.add(node.clone());
        }
        out
    }

    /// Drop adjacency entries pointing at nodes that are not in the graph.
    pub fn remove_dangling(&mut self) {
        let ids: BTreeSet<String> = self.0.keys().cloned().collect();
        for node in self.0.values_mut() {
            node.node.adjacency.retain(|target| ids.contains(target));
        }
    }

    /// Every ID some node's adjacency points at, self-loops excluded.
    pub fn referenced(&self) -> BTreeSet<String> {
        self.0
            .values()
            .flat_map(|node| {
                node.adjacency()
                    .iter()
                    .filter(move |target| *target != node.id)
                    .map(str::to_string)
            })
            .collect()
    }

    /// Remove pseudo nodes left with no adjacency and no inbound
    /// references, repeating until nothing changes. Returns the number of
    /// nodes removed.
    pub fn prune_pseudo(&mut self) -> usize {
        let before = self.0.len();
        loop {
            self.remove_dangling();
            let referenced = self.referenced();
            let count = self.0.len();
            self.0.retain(|id, node| {
                !node.pseudo || !node.node.adjacency.is_empty() || referenced.contains(id)
            });
            if self.0.len() == count {
                break;
            }
        }
        before - self.0.len()
    }

    /// Remove every node that is not connected to another node.
    ///
    /// Self-loops and dangling adjacency are stripped first; a node survives
    /// if it still points somewhere or something points at it. Each pass
    /// can orphan further nodes, so this repeats until a pass removes
    /// nothing. Returns the number of nodes removed.
    pub fn prune_unconnected(&mut self) -> usize {
        let before = self.0.len();
        loop {
            self.remove_dangling();
            for (id, node) in self.0.iter_mut() {
                node.node.adjacency.remove(id);
            }
            let referenced = self.referenced();
            let count = self.0.len();
            self.0
                .retain(|id, node| !node.node.adjacency.is_empty() || referenced.contains(id));
            if self.0.len() == count {
                break;
            }
        }
        before - self.0.len()
    }
}

impl FromIterator<RenderableNode> for RenderableNodes {
    fn from_iter<I: IntoIterator<Item = RenderableNode>>(iter: I) -> Self {
        let mut nodes = RenderableNodes::new();
        for node in iter {
            nodes.add(node);
        }
        nodes
    }
}

impl IntoIterator for RenderableNodes {
    type Item = (String, RenderableNode);
    type IntoIter = std::collections::btree_map::IntoIter<String, RenderableNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
