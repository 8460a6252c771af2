//! Reports: one observation window across every topology.

use std::fmt;

use crate::node::Node;
use crate::string_set::StringSet;
use crate::topology::Topology;
use crate::version::SchemaVersion;

pub const ENDPOINT: &str = "endpoint";
pub const ADDRESS: &str = "address";
pub const PROCESS: &str = "process";
pub const CONTAINER: &str = "container";
pub const CONTAINER_IMAGE: &str = "container_image";
pub const POD: &str = "pod";
pub const SERVICE: &str = "service";
pub const HOST: &str = "host";
pub const OVERLAY: &str = "overlay";

/// Every topology slot of a [`Report`], in field order.
pub const TOPOLOGY_NAMES: [&str; 9] = [
    ENDPOINT,
    ADDRESS,
    PROCESS,
    CONTAINER,
    CONTAINER_IMAGE,
    POD,
    SERVICE,
    HOST,
    OVERLAY,
];

/// Identifies the reports that went into a value.
///
/// A fresh report carries one random ID; merging unions the sets. The
/// display form is stable and is what render caches key on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ReportId(StringSet);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(StringSet::single(id))
    }

    /// A new random (v4 UUID) ID.
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn merge(&self, other: &ReportId) -> ReportId {
        ReportId(self.0.merge(&other.0))
    }

    pub fn as_set(&self) -> &StringSet {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.as_slice().join(","))
    }
}

/// Everything observed during one window, grouped by entity kind.
///
/// Reports are values: [`Report::merge`] returns a new report and never
/// touches its inputs, so a report handed to a collector can be shared
/// freely between readers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Report {
    pub id: ReportId,

    /// Schema version of the probe that produced this report.
    pub version: SchemaVersion,

    /// Length of the observation window in milliseconds.
    pub window_ms: u64,

    pub endpoint: Topology,
    pub address: Topology,
    pub process: Topology,
    pub container: Topology,
    pub container_image: Topology,
    pub pod: Topology,
    pub service: Topology,
    pub host: Topology,
    pub overlay: Topology,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    /// An empty report with a fresh random ID.
    pub fn new() -> Self {
        Self {
            id: ReportId::random(),
            version: SchemaVersion::current(),
            window_ms: 0,
            endpoint: Topology::default(),
            address: Topology::default(),
            process: Topology::default(),
            container: Topology::default(),
            container_image: Topology::default(),
            pod: Topology::default(),
            service: Topology::default(),
            host: Topology::default(),
            overlay: Topology::default(),
        }
    }

    pub fn builder() -> ReportBuilder {
        ReportBuilder::new()
    }

    /// Look up a topology slot by name.
    pub fn topology(&self, name: &str) -> Option<&Topology> {
        Some(match name {
            ENDPOINT => &self.endpoint,
            ADDRESS => &self.address,
            PROCESS => &self.process,
            CONTAINER => &self.container,
            CONTAINER_IMAGE => &self.container_image,
            POD => &self.pod,
            SERVICE => &self.service,
            HOST => &self.host,
            OVERLAY => &self.overlay,
            _ => return None,
        })
    }

    pub fn topology_mut(&mut self, name: &str) -> Option<&mut Topology> {
        Some(match name {
            ENDPOINT => &mut self.endpoint,
            ADDRESS => &mut self.address,
            PROCESS => &mut self.process,
            CONTAINER => &mut self.container,
            CONTAINER_IMAGE => &mut self.container_image,
            POD => &mut self.pod,
            SERVICE => &mut self.service,
            HOST => &mut self.host,
            OVERLAY => &mut self.overlay,
            _ => return None,
        })
    }

    /// Every topology slot with its name.
    pub fn topologies(&self) -> impl Iterator<Item = (&'static str, &Topology)> {
        [
            (ENDPOINT, &self.endpoint),
            (ADDRESS, &self.address),
            (PROCESS, &self.process),
            (CONTAINER, &self.container),
            (CONTAINER_IMAGE, &self.container_image),
            (POD, &self.pod),
            (SERVICE, &self.service),
            (HOST, &self.host),
            (OVERLAY, &self.overlay),
        ]
        .into_iter()
    }

    /// Total node count across all topologies.
    pub fn node_count(&self) -> usize {
        self.topologies().map(|(_, t)| t.len()).sum()
    }

    /// True when no topology holds nodes or templates.
    pub fn is_empty(&self) -> bool {
        self.topologies().all(|(_, t)| t.is_blank())
    }

    /// Combine two reports.
    ///
    /// An empty report is the identity and contributes nothing, not even its
    /// ID. Between two empty reports the one with the smaller ID is kept.
    pub fn merge(&self, other: &Report) -> Report {
        match (self.is_empty(), other.is_empty()) {
            (false, true) => return self.clone(),
            (true, false) => return other.clone(),
            (true, true) if self.id != other.id => {
                let keep = if self.id < other.id { self } else { other };
                return keep.clone();
            }
            _ => {}
        }

        Report {
            id: self.id.merge(&other.id),
            version: self.version.max(other.version),
            window_ms: self.window_ms.max(other.window_ms),
            endpoint: self.endpoint.merge(&other.endpoint),
            address: self.address.merge(&other.address),
            process: self.process.merge(&other.process),
            container: self.container.merge(&other.container),
            container_image: self.container_image.merge(&other.container_image),
            pod: self.pod.merge(&other.pod),
            service: self.service.merge(&other.service),
            host: self.host.merge(&other.host),
            overlay: self.overlay.merge(&other.overlay),
        }
    }
}

/// Builder for [`Report`]s, mostly used by reporters and tests.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the random ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.report.id = ReportId::new(id);
        self
    }

    pub fn window_ms(mut self, window_ms: u64) -> Self {
        self.report.window_ms = window_ms;
        self
    }

    /// Add a node to the named topology, tagging it with that topology if it
    /// has no tag yet. Unknown topology names are ignored.
    pub fn node(mut self, topology: &str, mut node: Node) -> Self {
        if let Some(slot) = self.report.topology_mut(topology) {
            if node.topology.is_empty() {
                node.topology = topology.to_string();
            }
            slot.add_node(node);
        }
        self
    }

    /// Merge a whole topology into the named slot.
    pub fn topology(mut self, name: &str, topology: Topology) -> Self {
        if let Some(slot) = self.report.topology_mut(name) {
            *slot = slot.merge(&topology);
        }
        self
    }

    pub fn build(self) -> Report {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(id: &str) -> Report {
        Report::builder()
            .id(format!("r-{id}"))
            .node(PROCESS, Node::new(id).with_latest("pid", 1, id))
            .build()
    }

    #[test]
    fn new_reports_get_distinct_ids() {
        assert_ne!(Report::new().id, Report::new().id);
    }

    #[test]
    fn merge_unions_ids_and_nodes() {
        let merged = process("a").merge(&process("b"));
        assert_eq!(merged.id.to_string(), "r-a,r-b");
        assert_eq!(merged.process.len(), 2);
        assert_eq!(merged.node_count(), 2);
    }

    #[test]
    fn empty_report_is_identity() {
        let a = process("a");
        let empty = Report::new();
        assert_eq!(a.merge(&empty), a);
        assert_eq!(empty.merge(&a), a);
    }

    #[test]
    fn empty_reports_merge_commutatively() {
        let x = Report::builder().id("x").build();
        let y = Report::builder().id("y").build();
        assert_eq!(x.merge(&y), y.merge(&x));
        assert_eq!(x.merge(&y).id, ReportId::new("x"));
    }

    #[test]
    fn builder_tags_nodes_with_topology() {
        let r = Report::builder().node(HOST, Node::new("h;<host>")).build();
        assert_eq!(r.host.get("h;<host>").map(|n| n.topology.as_str()), Some(HOST));
        assert!(Report::builder().node("bogus", Node::new("x")).build().is_empty());
    }

    #[test]
    fn topology_lookup_by_name() {
        let r = process("a");
        assert_eq!(r.topology(PROCESS).map(Topology::len), Some(1));
        assert!(r.topology("nope").is_none());
        assert_eq!(r.topologies().count(), TOPOLOGY_NAMES.len());
    }
}
