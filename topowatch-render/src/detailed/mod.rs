//! Detail tables for a single rendered node.
//!
//! Everything here is a pure projection of a node's metadata, sets, metrics
//! and parents into rows ready for display. A node whose topology tag is not
//! one of the known kinds projects to empty tables, never to an error.

mod labels;
mod metadata;
mod metrics;
mod parents;
mod summary;

pub use labels::node_docker_labels;
pub use metadata::{node_metadata, node_metadata_from_templates, MetadataRow};
pub use metrics::{node_metrics, node_metrics_from_templates, MetricRow};
pub use parents::{parents, Parent};
pub use summary::{make_node_details, make_node_summary, NodeDetails, NodeSummary};
