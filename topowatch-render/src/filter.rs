//! Filters over rendered graphs.

use std::sync::Arc;

use topowatch_types::{keys, Report};

use crate::renderable::{RenderableNode, RenderableNodes};
use crate::renderer::{Renderer, SharedRenderer, Stats};

/// Decides whether a rendered node is kept.
pub type FilterFn = Arc<dyn Fn(&RenderableNode) -> bool + Send + Sync>;

/// Keeps the nodes of another renderer that satisfy a predicate.
///
/// Adjacency pointing at removed nodes is cut. Pseudo nodes exist only to
/// show where edges go, so any pseudo node left with no edges in either
/// direction is removed too, repeatedly, until the graph stops changing.
pub struct Filter {
    predicate: FilterFn,
    inner: SharedRenderer,
}

impl Filter {
    pub fn new(predicate: FilterFn, inner: SharedRenderer) -> Self {
        Self { predicate, inner }
    }

    /// Apply the predicate to `nodes`, returning how many were removed.
    fn keep(&self, nodes: &mut RenderableNodes) -> usize {
        let before = nodes.len();
        nodes.retain(|node| (self.predicate)(node));
        let removed = before - nodes.len();
        removed + nodes.prune_pseudo()
    }
}

impl Renderer for Filter {
    fn render(&self, report: &Report) -> RenderableNodes {
        let mut nodes = self.inner.render(report);
        self.keep(&mut nodes);
        nodes
    }

    fn stats(&self, report: &Report) -> Stats {
        self.render_with_stats(report).1
    }

    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        let (mut nodes, stats) = self.inner.render_with_stats(report);
        let filtered_nodes = self.keep(&mut nodes);
        (nodes, stats + Stats { filtered_nodes })
    }
}

/// Removes every node not connected to some other node.
pub struct FilterUnconnected {
    inner: SharedRenderer,
}

impl FilterUnconnected {
    pub fn new(inner: SharedRenderer) -> Self {
        Self { inner }
    }
}

impl Renderer for FilterUnconnected {
    fn render(&self, report: &Report) -> RenderableNodes {
        let mut nodes = self.inner.render(report);
        nodes.prune_unconnected();
        nodes
    }

    fn stats(&self, report: &Report) -> Stats {
        self.render_with_stats(report).1
    }

    fn render_with_stats(&self, report: &Report) -> (RenderableNodes, Stats) {
        let (mut nodes, stats) = self.inner.render_with_stats(report);
        let filtered_nodes = nodes.prune_unconnected();
        (nodes, stats + Stats { filtered_nodes })
    }
}

pub fn filter_unconnected(inner: SharedRenderer) -> SharedRenderer {
    Arc::new(FilterUnconnected::new(inner))
}

/// Drops pseudo nodes.
pub fn filter_pseudo(inner: SharedRenderer) -> SharedRenderer {
    Arc::new(Filter::new(Arc::new(|node: &RenderableNode| !node.pseudo), inner))
}

/// Drops containers that are not running. Nodes without a container state
/// are kept.
pub fn filter_stopped(inner: SharedRenderer) -> SharedRenderer {
    Arc::new(Filter::new(Arc::new(is_running), inner))
}

/// Drops infrastructure: the monitoring stack itself, orchestrator plumbing
/// and anything in the kubernetes system namespace.
pub fn filter_system(inner: SharedRenderer) -> SharedRenderer {
    Arc::new(Filter::new(Arc::new(is_application), inner))
}

/// Leaves the renderer as it is.
pub fn filter_noop(inner: SharedRenderer) -> SharedRenderer {
    inner
}

const SYSTEM_CONTAINER_NAMES: &[&str] = &["topowatch", "topowatch-probe", "ecs-agent"];

const SYSTEM_IMAGE_PREFIXES: &[&str] = &[
    "topowatch/app",
    "topowatch/probe",
    "amazon/amazon-ecs-agent",
    "beta.gcr.io/google_containers/pause",
    "gcr.io/google_containers/pause",
    "openshift/origin-pod",
    "docker.io/openshift/origin-pod",
];

const SYSTEM_ROLE_LABEL: &str = "works.weave.role";

fn label(node: &RenderableNode, name: &str) -> Option<String> {
    node.node
        .latest_value(&format!("{}{name}", keys::docker::LABEL_PREFIX))
        .map(str::to_string)
}

fn is_running(node: &RenderableNode) -> bool {
    node.node
        .latest_value(keys::docker::CONTAINER_STATE)
        .map_or(true, |state| state == keys::docker::STATE_RUNNING)
}

fn is_application(node: &RenderableNode) -> bool {
    let meta = &node.node;

    if let Some(name) = meta.latest_value(keys::docker::CONTAINER_NAME) {
        if SYSTEM_CONTAINER_NAMES.contains(&name.trim_start_matches('/')) {
            return false;
        }
    }

    if let Some(image) = meta.latest_value(keys::docker::IMAGE_NAME) {
        let repository = image.split(':').next().unwrap_or(image);
        if SYSTEM_IMAGE_PREFIXES.contains(&repository) {
            return false;
        }
    }

    if label(node, SYSTEM_ROLE_LABEL).as_deref() == Some("system") {
        return false;
    }

    if meta.latest_value(keys::kubernetes::NAMESPACE) == Some(keys::kubernetes::SYSTEM_NAMESPACE) {
        return false;
    }

    let system_pod_prefix = format!("{}/", keys::kubernetes::SYSTEM_NAMESPACE);
    let pod = label(node, keys::kubernetes::POD_LABEL);
    if pod.is_some_and(|pod| pod.starts_with(&system_pod_prefix)) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderFn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mock(nodes: Vec<RenderableNode>) -> SharedRenderer {
        let nodes: RenderableNodes = nodes.into_iter().collect();
        Arc::new(RenderFn(move |_: &Report| nodes.clone()))
    }

    fn node(id: &str, adjacent: &[&str]) -> RenderableNode {
        adjacent
            .iter()
            .fold(RenderableNode::new(id), |n, a| n.with_adjacent(*a))
    }

    fn pseudo(id: &str, adjacent: &[&str]) -> RenderableNode {
        RenderableNode {
            pseudo: true,
            ..node(id, adjacent)
        }
    }

    fn not(id: &'static str) -> FilterFn {
        Arc::new(move |n: &RenderableNode| n.id != id)
    }

    fn ids(nodes: &RenderableNodes) -> Vec<&str> {
        nodes.ids().collect()
    }

    #[test]
    fn unconnected_nodes_are_removed() {
        let r = filter_unconnected(mock(vec![
            node("foo", &["bar"]),
            node("bar", &["foo"]),
            node("baz", &[]),
        ]));
        let report = Report::new();
        assert_eq!(ids(&r.render(&report)), vec!["bar", "foo"]);
        assert_eq!(r.stats(&report).filtered_nodes, 1);
    }

    #[test]
    fn adjacency_to_filtered_nodes_is_cut() {
        let r = Filter::new(
            not("bar"),
            mock(vec![node("foo", &["bar"]), node("bar", &["foo"]), node("baz", &[])]),
        );
        let have = r.render(&Report::new());
        assert_eq!(have, vec![node("foo", &[]), node("baz", &[])].into_iter().collect());
    }

    #[test]
    fn connected_pseudo_nodes_survive() {
        let input = vec![node("foo", &["bar"]), node("bar", &["baz"]), pseudo("baz", &[])];
        let r = Filter::new(Arc::new(|_: &RenderableNode| true), mock(input.clone()));
        assert_eq!(r.render(&Report::new()), input.into_iter().collect());
    }

    #[test]
    fn pseudo_nodes_orphaned_downstream_are_removed() {
        let r = Filter::new(
            not("bar"),
            mock(vec![node("foo", &["bar"]), node("bar", &["baz"]), pseudo("baz", &[])]),
        );
        let have = r.render(&Report::new());
        assert_eq!(have, vec![node("foo", &[])].into_iter().collect());
        assert_eq!(r.stats(&Report::new()).filtered_nodes, 2);
    }

    #[test]
    fn pseudo_nodes_orphaned_upstream_are_removed() {
        let r = Filter::new(
            not("bar"),
            mock(vec![node("foo", &[]), node("bar", &["foo"]), pseudo("baz", &["bar"])]),
        );
        let have = r.render(&Report::new());
        assert_eq!(have, vec![node("foo", &[])].into_iter().collect());
    }

    #[test]
    fn nested_filter_stats_render_the_source_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let source: SharedRenderer = Arc::new(RenderFn(move |_: &Report| {
            counted.fetch_add(1, Ordering::SeqCst);
            vec![node("foo", &["bar"]), node("bar", &["foo"]), node("baz", &[])]
                .into_iter()
                .collect::<RenderableNodes>()
        }));

        let mut r = source;
        for _ in 0..6 {
            r = Arc::new(Filter::new(Arc::new(|_: &RenderableNode| true), r));
        }
        let r = filter_unconnected(Arc::new(Filter::new(not("qux"), r)));

        let report = Report::new();
        assert_eq!(r.stats(&report).filtered_nodes, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let (nodes, stats) = r.render_with_stats(&report);
        assert_eq!(ids(&nodes), vec!["bar", "foo"]);
        assert_eq!(stats.filtered_nodes, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn self_connected_nodes_are_unconnected() {
        let r = filter_unconnected(mock(vec![node("foo", &["foo"])]));
        assert!(r.render(&Report::new()).is_empty());
    }

    #[test]
    fn pseudo_filter() {
        let r = filter_pseudo(mock(vec![node("foo", &[]), pseudo("bar", &[])]));
        assert_eq!(ids(&r.render(&Report::new())), vec!["foo"]);
    }

    #[test]
    fn stopped_filter_keeps_running_and_untagged() {
        let state = |id: &str, state: &str| {
            let meta = topowatch_types::Node::default();
            node(id, &[]).with_node(meta.with_latest(keys::docker::CONTAINER_STATE, 1, state))
        };
        let running = state("a", "running");
        let stopped = state("b", "stopped");
        let r = filter_stopped(mock(vec![running, stopped, node("c", &[])]));
        assert_eq!(ids(&r.render(&Report::new())), vec!["a", "c"]);
    }

    #[test]
    fn system_filter() {
        let with = |id: &str, key: &str, value: &str| {
            node(id, &[]).with_node(topowatch_types::Node::default().with_latest(key, 1, value))
        };
        let role = format!("{}{SYSTEM_ROLE_LABEL}", keys::docker::LABEL_PREFIX);
        let pod = format!("{}{}", keys::docker::LABEL_PREFIX, keys::kubernetes::POD_LABEL);

        let r = filter_system(mock(vec![
            with("app", keys::docker::CONTAINER_NAME, "/web"),
            with("probe", keys::docker::CONTAINER_NAME, "/topowatch-probe"),
            with("pause", keys::docker::IMAGE_NAME, "gcr.io/google_containers/pause:3.0"),
            with("role", &role, "system"),
            with("ns", keys::kubernetes::NAMESPACE, "kube-system"),
            with("dns", &pod, "kube-system/kube-dns-v9"),
            with("user-pod", &pod, "default/frontend"),
        ]));
        assert_eq!(ids(&r.render(&Report::new())), vec!["app", "user-pod"]);
    }
}
