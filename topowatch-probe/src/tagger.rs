//! Post-processing of merged probe reports.

use topowatch_types::{ids, keys, now_ms, Report, StringSet, HOST, TOPOLOGY_NAMES};

use crate::error::Result;

/// Rewrites a report after all reporters have contributed to it.
///
/// Taggers run in the order they were added to the probe, each seeing the
/// output of the previous one.
pub trait Tagger: Send + Sync {
    fn name(&self) -> &str;

    fn tag(&self, report: Report) -> Result<Report>;
}

/// Stamps every node with the host and probe that observed it.
///
/// Nodes get `host_node_id` and `probe_id` metadata and, except for host
/// nodes, a `host` parent. The aggregator relies on these to group nodes by
/// host and to tell which probe a node came from.
#[derive(Debug, Clone)]
pub struct HostTagger {
    host_node_id: String,
    probe_id: String,
}

impl HostTagger {
    /// `host_id` is the bare hostname, e.g. `web-1.example.com`.
    pub fn new(host_id: impl AsRef<str>, probe_id: impl Into<String>) -> Self {
        Self {
            host_node_id: ids::make_host_node_id(host_id.as_ref()),
            probe_id: probe_id.into(),
        }
    }

    pub fn host_node_id(&self) -> &str {
        &self.host_node_id
    }

    pub fn probe_id(&self) -> &str {
        &self.probe_id
    }
}

impl Tagger for HostTagger {
    fn name(&self) -> &str {
        "host"
    }

    fn tag(&self, mut report: Report) -> Result<Report> {
        let timestamp = now_ms();
        for name in TOPOLOGY_NAMES {
            let Some(topology) = report.topology_mut(name) else {
                continue;
            };
            for node in topology.nodes.values_mut() {
                node.latest.set(
                    keys::tagging::HOST_NODE_ID.to_string(),
                    timestamp,
                    self.host_node_id.clone(),
                );
                node.latest
                    .set(keys::tagging::PROBE_ID.to_string(), timestamp, self.probe_id.clone());
                if name != HOST {
                    node.parents.add(HOST, StringSet::single(self.host_node_id.clone()));
                }
            }
        }
        Ok(report)
    }
}
