//! The nodes of one entity kind, plus their display templates.

use std::collections::BTreeMap;

use crate::node::Node;

/// Describes one metadata field to show for nodes of a topology.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataTemplate {
    pub id: String,
    pub label: String,
    /// Prime fields are shown first, and in the node summary.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prime: bool,
    /// Position among the fields; lower comes first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: u32,
}

/// Describes one metric to show for nodes of a topology.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricTemplate {
    pub id: String,
    pub label: String,
    /// Display format hint, e.g. `percent` or `filesize`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "String::is_empty"))]
    pub format: String,
    /// Metrics sharing a group are shown together, e.g. `load`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "String::is_empty"))]
    pub group: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: u32,
}

/// An action that may be offered on nodes of a topology.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlTemplate {
    pub id: String,
    pub human: String,
    pub icon: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rank: u32,
}

/// Nodes keyed by ID.
pub type Nodes = BTreeMap<String, Node>;

/// Union two template maps; on an ID collision keep the greater template.
fn merge_templates<T: Ord + Clone>(
    left: &BTreeMap<String, T>,
    right: &BTreeMap<String, T>,
) -> BTreeMap<String, T> {
    let mut out = left.clone();
    for (id, template) in right {
        match out.get_mut(id) {
            Some(existing) if *template > *existing => *existing = template.clone(),
            Some(_) => {}
            None => {
                out.insert(id.clone(), template.clone());
            }
        }
    }
    out
}

/// `node` as stored under `key`, its ID made to agree with the key.
fn under_key(key: &str, node: &Node) -> Node {
    let mut node = node.clone();
    if node.id != key {
        node.id = key.to_string();
    }
    node
}

#[cfg(feature = "serde")]
fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Nodes, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut nodes = <Nodes as serde::Deserialize>::deserialize(deserializer)?;
    for (key, node) in nodes.iter_mut() {
        if node.id != *key {
            node.id = key.clone();
        }
    }
    Ok(nodes)
}

/// All nodes of one kind observed in a report.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Topology {
    /// Nodes keyed by ID. A node's own `id` always follows its key.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_nodes"))]
    pub nodes: Nodes,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub metadata_templates: BTreeMap<String, MetadataTemplate>,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub metric_templates: BTreeMap<String, MetricTemplate>,

    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub controls: BTreeMap<String, ControlTemplate>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, merging it into any node already stored under its ID.
    pub fn add_node(&mut self, node: Node) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => *existing = existing.merge(&node),
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    /// Builder-style [`Topology::add_node`].
    pub fn with_node(mut self, node: Node) -> Self {
        self.add_node(node);
        self
    }

    pub fn with_metadata_template(mut self, template: MetadataTemplate) -> Self {
        self.metadata_templates.insert(template.id.clone(), template);
        self
    }

    pub fn with_metric_template(mut self, template: MetricTemplate) -> Self {
        self.metric_templates.insert(template.id.clone(), template);
        self
    }

    pub fn with_control(mut self, control: ControlTemplate) -> Self {
        self.controls.insert(control.id.clone(), control);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when there are neither nodes nor templates.
    pub fn is_blank(&self) -> bool {
        self.nodes.is_empty()
            && self.metadata_templates.is_empty()
            && self.metric_templates.is_empty()
            && self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn merge(&self, other: &Topology) -> Topology {
        let mut nodes: Nodes = self
            .nodes
            .iter()
            .map(|(id, node)| (id.clone(), under_key(id, node)))
            .collect();
        for (id, node) in &other.nodes {
            let node = under_key(id, node);
            match nodes.get_mut(id) {
                Some(existing) => *existing = existing.merge(&node),
                None => {
                    nodes.insert(id.clone(), node);
                }
            }
        }

        Topology {
            nodes,
            metadata_templates: merge_templates(
                &self.metadata_templates,
                &other.metadata_templates,
            ),
            metric_templates: merge_templates(&self.metric_templates, &other.metric_templates),
            controls: merge_templates(&self.controls, &other.controls),
        }
    }
}
