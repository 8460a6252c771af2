use serde::{Deserialize, Serialize};
use topowatch_types::{EdgeMetadata, Report};

use super::{
    node_docker_labels, node_metadata, node_metadata_from_templates, node_metrics,
    node_metrics_from_templates, parents, MetadataRow, MetricRow, Parent,
};
use crate::renderable::RenderableNode;

/// What a topology listing shows for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_minor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rank: String,
    #[serde(default)]
    pub pseudo: bool,
    pub adjacency: Vec<String>,
    /// Prime metadata only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataRow>,
}

/// Everything known about one node, as the detail panel shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_minor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rank: String,
    #[serde(default)]
    pub pseudo: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topology: String,
    pub metadata: Vec<MetadataRow>,
    pub labels: Vec<MetadataRow>,
    pub metrics: Vec<MetricRow>,
    pub parents: Vec<Parent>,
    pub origins: Vec<String>,
    pub adjacency: Vec<String>,
    pub edge_metadata: EdgeMetadata,
}

fn label(node: &RenderableNode) -> String {
    if node.label_major.is_empty() {
        node.id.clone()
    } else {
        node.label_major.clone()
    }
}

pub fn make_node_summary(node: &RenderableNode) -> NodeSummary {
    NodeSummary {
        id: node.id.clone(),
        label: label(node),
        label_minor: node.label_minor.clone(),
        rank: node.rank.clone(),
        pseudo: node.pseudo,
        adjacency: node.adjacency().as_slice().to_vec(),
        metadata: node_metadata(&node.node)
            .into_iter()
            .filter(|row| row.prime)
            .collect(),
    }
}

/// Project one rendered node into its detail tables.
///
/// Templates published by reporters take precedence over the built-in ones
/// for the node's topology.
pub fn make_node_details(report: &Report, node: &RenderableNode) -> NodeDetails {
    let inner = &node.node;
    let topology = report.topology(&inner.topology);

    let metadata = match topology {
        Some(t) if !t.metadata_templates.is_empty() => {
            node_metadata_from_templates(inner, &t.metadata_templates)
        }
        _ => node_metadata(inner),
    };
    let metrics = match topology {
        Some(t) if !t.metric_templates.is_empty() => {
            node_metrics_from_templates(inner, &t.metric_templates)
        }
        _ => node_metrics(inner),
    };

    NodeDetails {
        id: node.id.clone(),
        label: label(node),
        label_minor: node.label_minor.clone(),
        rank: node.rank.clone(),
        pseudo: node.pseudo,
        topology: inner.topology.clone(),
        metadata,
        labels: node_docker_labels(inner),
        metrics,
        parents: parents(report, inner),
        origins: node.origins.as_slice().to_vec(),
        adjacency: node.adjacency().as_slice().to_vec(),
        edge_metadata: node.edge_metadata,
    }
}
