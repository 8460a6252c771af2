//! # topowatch-types
//!
//! The report data model shared by probes and the aggregator. A [`Report`] is
//! one observation window: a bundle of [`Topology`] slots (endpoints,
//! processes, containers, hosts, ...) whose [`Node`]s are built from small
//! value containers, each with its own merge operator.
//!
//! ## Merge algebra
//!
//! Every container merges without coordination, so reports collected
//! independently by many probes can be combined in any order:
//!
//! | Type | Merge |
//! |------|-------|
//! | [`StringSet`] / [`Sets`] | union |
//! | [`LatestMap`] | per key, later timestamp wins; ties keep the greater value |
//! | [`Counters`] | pointwise sum |
//! | [`Metric`] | sample union, bounded to a retention window |
//! | [`EdgeMetadata`] | per-field max (see [`EdgeMetadata::flatten`] for sums) |
//! | [`Node`] / [`Topology`] / [`Report`] | field-wise over the above |
//!
//! Merging is commutative, associative and idempotent (counters excepted,
//! which probes never emit), and the empty report is the identity.
//!
//! ## Example
//!
//! ```rust
//! use topowatch_types::{ids, keys, Node, Report, PROCESS};
//!
//! let left = Report::builder()
//!     .node(PROCESS, Node::new(ids::make_process_node_id("host1", "2"))
//!         .with_latest(keys::process::PID, 1, "2"))
//!     .build();
//! let right = Report::builder()
//!     .node(PROCESS, Node::new(ids::make_process_node_id("host1", "3"))
//!         .with_latest(keys::process::PID, 1, "3"))
//!     .build();
//!
//! let merged = left.merge(&right);
//! assert_eq!(merged.process.len(), 2);
//! assert_eq!(merged, right.merge(&left));
//! ```
//!
//! ## Features
//!
//! - `serde`: JSON (and any other serde format) for every type in this crate

mod counters;
mod edge;
pub mod ids;
pub mod keys;
mod latest;
mod metric;
mod node;
mod report;
mod string_set;
mod topology;
mod version;

pub use counters::Counters;
pub use edge::{EdgeMetadata, EdgeMetadatas};
pub use latest::{LatestEntry, LatestMap, Metadata};
pub use metric::{Metric, MetricSummary, Metrics, Sample, METRIC_WINDOW_MS};
pub use node::Node;
pub use report::{
    Report, ReportBuilder, ReportId, ADDRESS, CONTAINER, CONTAINER_IMAGE, ENDPOINT, HOST,
    OVERLAY, POD, PROCESS, SERVICE, TOPOLOGY_NAMES,
};
pub use string_set::{Sets, StringSet};
pub use topology::{ControlTemplate, MetadataTemplate, MetricTemplate, Nodes, Topology};
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the report format.
pub const SCHEMA_VERSION: u32 = 1;

/// Milliseconds since the Unix epoch, used to stamp metadata and samples.
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
