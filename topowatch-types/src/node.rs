//! A single observed entity.

use crate::counters::Counters;
use crate::edge::{EdgeMetadata, EdgeMetadatas};
use crate::latest::Metadata;
use crate::metric::{Metric, Metrics};
use crate::string_set::{Sets, StringSet};

/// One entity (endpoint, process, container, host, ...) as seen by probes.
///
/// A node is a bundle of mergeable containers. Two nodes describing the same
/// entity merge field by field, so partial observations from many probes add
/// up to one picture.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Node {
    /// Stable identity, see [`crate::ids`].
    pub id: String,

    /// Name of the topology this node belongs to (`"process"`, `"host"`, ...).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub topology: String,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Metadata::is_empty"))]
    pub latest: Metadata,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Sets::is_empty"))]
    pub sets: Sets,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Counters::is_empty"))]
    pub counters: Counters,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Metrics::is_empty"))]
    pub metrics: Metrics,

    /// IDs of nodes this node was seen connecting to.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "StringSet::is_empty"))]
    pub adjacency: StringSet,

    /// Traffic per adjacent node.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "EdgeMetadatas::is_empty"))]
    pub edges: EdgeMetadatas,

    /// Parent node IDs keyed by topology name.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Sets::is_empty"))]
    pub parents: Sets,

    /// Control IDs currently valid for this node.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "StringSet::is_empty"))]
    pub controls: StringSet,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_topology(mut self, topology: impl Into<String>) -> Self {
        self.topology = topology.into();
        self
    }

    /// Record one metadata field observed at `timestamp`.
    pub fn with_latest(
        mut self,
        key: impl Into<String>,
        timestamp: u64,
        value: impl Into<String>,
    ) -> Self {
        self.latest.set(key.into(), timestamp, value.into());
        self
    }

    /// Record several metadata fields observed at the same `timestamp`.
    pub fn with_latests<I, K, V>(mut self, timestamp: u64, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in fields {
            self.latest.set(key.into(), timestamp, value.into());
        }
        self
    }

    pub fn with_set(mut self, key: impl Into<String>, set: StringSet) -> Self {
        self.sets.add(key, set);
        self
    }

    pub fn with_counter(mut self, key: impl Into<String>, count: u64) -> Self {
        self.counters.add(key, count);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, metric: Metric) -> Self {
        self.metrics.add(key, metric);
        self
    }

    pub fn with_adjacent(mut self, id: impl Into<String>) -> Self {
        self.adjacency.insert(id);
        self
    }

    pub fn with_adjacents<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        for id in ids {
            self.adjacency.insert(id);
        }
        self
    }

    /// Record traffic to `peer`; also makes `peer` adjacent.
    pub fn with_edge(mut self, peer: impl Into<String>, edge: EdgeMetadata) -> Self {
        let peer = peer.into();
        self.adjacency.insert(peer.clone());
        self.edges.add(peer, edge);
        self
    }

    pub fn with_parent(mut self, topology: impl Into<String>, id: impl Into<String>) -> Self {
        self.parents.add(topology, StringSet::single(id));
        self
    }

    pub fn with_parents(mut self, parents: Sets) -> Self {
        self.parents = self.parents.merge(&parents);
        self
    }

    pub fn with_controls<S: Into<String>>(mut self, controls: impl IntoIterator<Item = S>) -> Self {
        for control in controls {
            self.controls.insert(control);
        }
        self
    }

    /// Current value of a metadata field.
    pub fn latest_value(&self, key: &str) -> Option<&str> {
        self.latest.lookup(key).map(String::as_str)
    }

    /// Field-wise merge of two observations of the same entity.
    ///
    /// Merging nodes with different IDs is a bug in the caller; in release
    /// builds the smaller ID is kept so the result stays order independent.
    pub fn merge(&self, other: &Node) -> Node {
        debug_assert!(
            self.id == other.id || self.id.is_empty() || other.id.is_empty(),
            "merging nodes with different ids: {:?} and {:?}",
            self.id,
            other.id
        );

        let id = match (self.id.is_empty(), other.id.is_empty()) {
            (true, _) => other.id.clone(),
            (_, true) => self.id.clone(),
            _ => std::cmp::min(&self.id, &other.id).clone(),
        };
        let topology = match (self.topology.is_empty(), other.topology.is_empty()) {
            (true, _) => other.topology.clone(),
            (_, true) => self.topology.clone(),
            _ => std::cmp::max(&self.topology, &other.topology).clone(),
        };

        Node {
            id,
            topology,
            latest: self.latest.merge(&other.latest),
            sets: self.sets.merge(&other.sets),
            counters: self.counters.merge(&other.counters),
            metrics: self.metrics.merge(&other.metrics),
            adjacency: self.adjacency.merge(&other.adjacency),
            edges: self.edges.merge(&other.edges),
            parents: self.parents.merge(&other.parents),
            controls: self.controls.merge(&other.controls),
        }
    }
}
