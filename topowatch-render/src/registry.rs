//! Named topology views, as browsed by users.

use std::sync::Arc;

use serde::Serialize;
use topowatch_types::Report;

use crate::detailed::{make_node_details, NodeDetails};
use crate::error::{RenderError, Result};
use crate::filter::{filter_unconnected, FilterUnconnected};
use crate::memoise::RenderCache;
use crate::renderable::RenderableNodes;
use crate::renderer::{Renderer, SharedRenderer, Stats};
use crate::topologies::Topologies;

pub const PROCESSES: &str = "processes";
pub const PROCESSES_BY_NAME: &str = "processes-by-name";
pub const CONTAINERS: &str = "containers";
pub const CONTAINERS_BY_IMAGE: &str = "containers-by-image";
pub const HOSTS: &str = "hosts";
pub const PODS: &str = "pods";
pub const PODS_BY_SERVICE: &str = "pods-by-service";

/// One browsable view.
#[derive(Clone)]
pub struct TopologyDesc {
    pub id: &'static str,
    pub name: &'static str,
    /// The view this one is a variant of, if any.
    pub parent: Option<&'static str>,
    pub renderer: SharedRenderer,
}

impl std::fmt::Debug for TopologyDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyDesc")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// A view and how large it currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologySummary {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<&'static str>,
    /// Nodes shown once unconnected nodes are filtered out.
    pub node_count: usize,
    pub stats: Stats,
}

/// Maps view IDs to their renderers.
#[derive(Debug, Clone)]
pub struct TopologyRegistry {
    topologies: Vec<TopologyDesc>,
    cache: Arc<RenderCache>,
}

impl TopologyRegistry {
    /// The built-in views over a fresh cache of `cache_size` entries.
    pub fn new(cache_size: usize) -> Self {
        Self::with_topologies(Topologies::new(Arc::new(RenderCache::new(cache_size))))
    }

    pub fn with_topologies(t: Topologies) -> Self {
        let desc = |id, name, parent, renderer| TopologyDesc {
            id,
            name,
            parent,
            renderer,
        };
        let topologies = vec![
            desc(PROCESSES, "Processes", None, t.processes.clone()),
            desc(PROCESSES_BY_NAME, "by name", Some(PROCESSES), t.process_names.clone()),
            desc(CONTAINERS, "Containers", None, t.containers_with_image_name.clone()),
            desc(CONTAINERS_BY_IMAGE, "by image", Some(CONTAINERS), t.container_images.clone()),
            desc(HOSTS, "Hosts", None, t.hosts.clone()),
            desc(PODS, "Pods", None, t.pods.clone()),
            desc(PODS_BY_SERVICE, "by service", Some(PODS), t.pod_services.clone()),
        ];
        Self {
            topologies,
            cache: Arc::clone(t.cache()),
        }
    }

    pub fn get(&self, id: &str) -> Result<&TopologyDesc> {
        self.topologies
            .iter()
            .find(|desc| desc.id == id)
            .ok_or_else(|| RenderError::UnknownTopology(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopologyDesc> {
        self.topologies.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.topologies.iter().map(|desc| desc.id)
    }

    /// Render a view. Unless `full` is set, nodes connected to nothing are
    /// left out.
    pub fn render_topology(
        &self,
        id: &str,
        report: &Report,
        full: bool,
    ) -> Result<RenderableNodes> {
        let desc = self.get(id)?;
        let nodes = if full {
            desc.renderer.render(report)
        } else {
            FilterUnconnected::new(desc.renderer.clone()).render(report)
        };
        tracing::debug!(topology = id, nodes = nodes.len(), full, "rendered topology");
        Ok(nodes)
    }

    /// Details of one node of a view, looked up among all of its nodes.
    pub fn node_details(&self, id: &str, node_id: &str, report: &Report) -> Result<NodeDetails> {
        let nodes = self.render_topology(id, report, true)?;
        let node = nodes.get(node_id).ok_or_else(|| RenderError::UnknownNode {
            topology: id.to_string(),
            id: node_id.to_string(),
        })?;
        Ok(make_node_details(report, node))
    }

    /// Every view with its current size.
    pub fn summaries(&self, report: &Report) -> Vec<TopologySummary> {
        self.topologies
            .iter()
            .map(|desc| {
                let connected = filter_unconnected(desc.renderer.clone());
                let (nodes, stats) = connected.render_with_stats(report);
                TopologySummary {
                    id: desc.id,
                    name: desc.name,
                    parent: desc.parent,
                    node_count: nodes.len(),
                    stats,
                }
            })
            .collect()
    }

    /// Forget every cached render.
    pub fn reset_cache(&self) {
        self.cache.reset();
    }
}

impl Default for TopologyRegistry {
    fn default() -> Self {
        Self::new(crate::memoise::DEFAULT_CACHE_SIZE)
    }
}
