//! Projection of one report topology into a rendered graph.

use topowatch_types::{
    EdgeMetadata, Report, ADDRESS, CONTAINER, CONTAINER_IMAGE, ENDPOINT, HOST, POD, PROCESS,
    SERVICE,
};

use crate::renderable::{RenderableNode, RenderableNodes};
use crate::renderer::Renderer;

/// Renders the nodes of one topology 1:1.
///
/// Raw edge metadata is asymmetric (each probe only sees its own side of a
/// connection), so every edge is credited to both ends: the source gets it
/// as-is and the target gets it reversed. Adjacency targets missing from the
/// topology get an empty placeholder node so later mapping can decide what
/// they stand for.
#[derive(Debug, Clone, Copy)]
pub struct TopologySelector {
    topology: &'static str,
}

impl TopologySelector {
    pub const fn new(topology: &'static str) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &'static str {
        self.topology
    }
}

pub const SELECT_ENDPOINT: TopologySelector = TopologySelector::new(ENDPOINT);
pub const SELECT_ADDRESS: TopologySelector = TopologySelector::new(ADDRESS);
pub const SELECT_PROCESS: TopologySelector = TopologySelector::new(PROCESS);
pub const SELECT_CONTAINER: TopologySelector = TopologySelector::new(CONTAINER);
pub const SELECT_CONTAINER_IMAGE: TopologySelector = TopologySelector::new(CONTAINER_IMAGE);
pub const SELECT_POD: TopologySelector = TopologySelector::new(POD);
pub const SELECT_SERVICE: TopologySelector = TopologySelector::new(SERVICE);
pub const SELECT_HOST: TopologySelector = TopologySelector::new(HOST);

impl Renderer for TopologySelector {
    fn render(&self, report: &Report) -> RenderableNodes {
        let mut out = RenderableNodes::new();
        let Some(topology) = report.topology(self.topology) else {
            return out;
        };

        let mut inbound: Vec<(String, EdgeMetadata)> = Vec::new();
        for (id, node) in topology.iter() {
            let mut node = node.clone().with_id(id);
            if node.topology.is_empty() {
                node.topology = self.topology.to_string();
            }
            for target in node.adjacency.iter() {
                let edge = node
                    .edges
                    .lookup(target)
                    .map(EdgeMetadata::reversed)
                    .unwrap_or_default();
                inbound.push((target.to_string(), edge));
            }
            out.add(RenderableNode::from_node(&node));
        }

        for (target, edge) in inbound {
            if !out.contains(&target) {
                let mut placeholder = RenderableNode::new(target.clone());
                placeholder.node.topology = self.topology.to_string();
                out.add(placeholder);
            }
            if let Some(node) = out.get_mut(&target) {
                node.edge_metadata = node.edge_metadata.flatten(&edge);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topowatch_types::Node;

    #[test]
    fn edges_are_credited_to_both_ends() {
        let report = Report::builder()
            .node(
                ENDPOINT,
                Node::new("a").with_edge(
                    "b",
                    EdgeMetadata {
                        egress_byte_count: Some(10),
                        ..Default::default()
                    },
                ),
            )
            .node(ENDPOINT, Node::new("b"))
            .build();

        let nodes = SELECT_ENDPOINT.render(&report);
        assert_eq!(nodes.get("a").unwrap().edge_metadata.egress_byte_count, Some(10));
        assert_eq!(nodes.get("b").unwrap().edge_metadata.ingress_byte_count, Some(10));
        assert_eq!(nodes.get("a").unwrap().origins.as_slice(), &["a"]);
    }

    #[test]
    fn dangling_targets_get_placeholders() {
        let report = Report::builder()
            .node(PROCESS, Node::new("h;1").with_adjacent("far;9"))
            .build();

        let nodes = SELECT_PROCESS.render(&report);
        let placeholder = nodes.get("far;9").unwrap();
        assert!(placeholder.origins.is_empty());
        assert_eq!(placeholder.node.topology, PROCESS);
        assert!(!placeholder.pseudo);
    }

    #[test]
    fn empty_slot_renders_nothing() {
        let report = Report::builder().node(HOST, Node::new("h;<host>")).build();
        assert!(SELECT_POD.render(&report).is_empty());
        assert_eq!(SELECT_HOST.render(&report).len(), 1);
    }
}
