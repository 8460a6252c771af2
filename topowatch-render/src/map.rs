//! Regrouping rendered nodes under new IDs.

use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use topowatch_types::{EdgeMetadatas, Report, StringSet};

use crate::localnets::LocalNetworks;
use crate::process_tree::ProcessTree;
use crate::renderable::{RenderableNode, RenderableNodes};
use crate::renderer::{Renderer, SharedRenderer, Stats};

/// Report-wide facts a map function may need, computed at most once per
/// render and only when asked for.
pub struct MapContext<'a> {
    report: &'a Report,
    local_networks: OnceCell<LocalNetworks>,
    process_tree: OnceCell<ProcessTree>,
}

impl<'a> MapContext<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self {
            report,
            local_networks: OnceCell::new(),
            process_tree: OnceCell::new(),
        }
    }

    pub fn report(&self) -> &'a Report {
        self.report
    }

    pub fn local_networks(&self) -> &LocalNetworks {
        self.local_networks
            .get_or_init(|| LocalNetworks::from_report(self.report))
    }

    pub fn process_tree(&self) -> &ProcessTree {
        self.process_tree
            .get_or_init(|| ProcessTree::from_report(self.report))
    }
}

/// Maps one input node to the nodes it contributes to (possibly none).
pub type MapFn = Arc<dyn Fn(&RenderableNode, &MapContext<'_>) -> Vec<RenderableNode> + Send + Sync>;

/// Regroups the output of another renderer.
///
/// Every input node is passed to the map function; outputs landing on the
/// same ID are merged and inherit the origins of everything mapped into
/// them. Adjacency is then rewritten through the same mapping: an edge
/// between two inputs becomes an edge between whatever they mapped to, and
/// edges to inputs that mapped to nothing disappear.
pub struct Map {
    map: MapFn,
    inner: SharedRenderer,
}

impl Map {
    pub fn new(map: MapFn, inner: SharedRenderer) -> Self {
        Self { map, inner }
    }

    /// Convenience for plain functions.
    pub fn from_fn(
        map: fn(&RenderableNode, &MapContext<'_>) -> Vec<RenderableNode>,
        inner: SharedRenderer,
    ) -> Self {
        Self::new(Arc::new(map), inner)
    }
}

impl Map {
    fn apply(&self, input: RenderableNodes, report: &Report) -> RenderableNodes {
        let ctx = MapContext::new(report);

        let mut output = RenderableNodes::new();
        let mut mapped: HashMap<&str, StringSet> = HashMap::new();
        let mut adjacencies: BTreeMap<String, StringSet> = BTreeMap::new();

        for (in_id, in_node) in input.iter() {
            for mut out_node in (self.map)(in_node, &ctx) {
                out_node.origins = out_node.origins.merge(&in_node.origins);
                out_node.node.id = out_node.id.clone();

                mapped.entry(in_id).or_default().insert(out_node.id.clone());
                let adjacency = adjacencies.entry(out_node.id.clone()).or_default();
                *adjacency = adjacency.merge(in_node.adjacency());
                output.add(out_node);
            }
        }

        for (out_id, in_adjacency) in adjacencies {
            let mut out_adjacency = StringSet::new();
            for target in in_adjacency.iter() {
                if let Some(targets) = mapped.get(target) {
                    for id in targets.iter() {
                        out_adjacency.insert(id);
                    }
                }
            }
            if let Some(node) = output.get_mut(&out_id) {
                node.node.adjacency = out_adjacency;
                node.node.edges = EdgeMetadatas::new();
            }
        }

        output
    }
}

impl Renderer for Map {
    fn render(&self, report: &Report) -> RenderableNodes {
        self.apply(self.inner.render(report), report)
    }

    fn stats(&self, report: &Report) -> Stats {
        self.inner.stats(report)
    }

    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        let (input, stats) = self.inner.render_with_stats(report);
        (self.apply(input, report), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderFn;

    fn source() -> SharedRenderer {
        Arc::new(RenderFn(|_: &Report| {
            vec![
                RenderableNode::new("a1").with_adjacent("b1"),
                RenderableNode::new("a2").with_adjacent("b2").with_adjacent("a1"),
                RenderableNode::new("b1"),
                RenderableNode::new("b2"),
                RenderableNode::new("c").with_adjacent("a1"),
            ]
            .into_iter()
            .map(|mut n| {
                n.origins.insert(n.id.clone());
                n
            })
            .collect::<RenderableNodes>()
        }))
    }

    /// Group by the first letter; drop "c".
    fn by_letter(node: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
        match &node.id[..1] {
            "c" => vec![],
            letter => vec![RenderableNode::new(letter.to_string())],
        }
    }

    #[test]
    fn groups_nodes_and_origins() {
        let nodes = Map::from_fn(by_letter, source()).render(&Report::new());
        assert_eq!(nodes.ids().collect::<Vec<_>>(), vec!["a", "b"]);

        let a = nodes.get("a").unwrap();
        assert_eq!(a.origins.as_slice(), &["a1", "a2"]);
        // a2 -> a1 collapses into a self-loop
        assert_eq!(a.adjacency().as_slice(), &["a", "b"]);
        assert!(nodes.get("b").unwrap().adjacency().is_empty());
    }

    fn fan_out(node: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
        vec![
            RenderableNode::new(format!("x-{}", node.id)),
            RenderableNode::new(format!("y-{}", node.id)),
        ]
    }

    #[test]
    fn fan_out_maps_to_every_target() {
        let pair: SharedRenderer = Arc::new(RenderFn(|_: &Report| {
            vec![RenderableNode::new("1").with_adjacent("2"), RenderableNode::new("2")]
                .into_iter()
                .collect::<RenderableNodes>()
        }));

        let nodes = Map::from_fn(fan_out, pair).render(&Report::new());
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes.get("x-1").unwrap().adjacency().as_slice(), &["x-2", "y-2"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let map = Map::from_fn(by_letter, source());
        let report = Report::new();
        assert_eq!(map.render(&report), map.render(&report));
    }
}
