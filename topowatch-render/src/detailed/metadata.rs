use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topowatch_types::{
    keys, MetadataTemplate, Node, CONTAINER, CONTAINER_IMAGE, HOST, POD, PROCESS, SERVICE,
};

/// One metadata field of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub value: String,
    /// Shown first, and in node summaries.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub prime: bool,
}

struct Field {
    id: &'static str,
    label: &'static str,
    prime: bool,
}

const fn field(id: &'static str, label: &'static str, prime: bool) -> Field {
    Field { id, label, prime }
}

const PROCESS_FIELDS: &[Field] = &[
    field(keys::process::PID, "PID", true),
    field(keys::process::PPID, "Parent PID", true),
    field(keys::process::CMDLINE, "Command", false),
    field(keys::process::THREADS, "# Threads", false),
];

const CONTAINER_FIELDS: &[Field] = &[
    field(keys::docker::CONTAINER_ID, "ID", true),
    field(keys::docker::CONTAINER_STATE, "State", true),
    field(keys::docker::IMAGE_ID, "Image ID", false),
    field(keys::docker::CONTAINER_COMMAND, "Command", false),
    field(keys::docker::CONTAINER_IPS, "IPs", false),
    field(keys::docker::CONTAINER_HOSTNAME, "Hostname", false),
];

const CONTAINER_IMAGE_FIELDS: &[Field] = &[
    field(keys::docker::IMAGE_ID, "Image ID", true),
    field(keys::docker::IMAGE_NAME, "Name", false),
];

const HOST_FIELDS: &[Field] = &[
    field(keys::host::HOST_NAME, "Hostname", true),
    field(keys::host::OS, "Operating system", true),
    field(keys::host::KERNEL_VERSION, "Kernel version", false),
    field(keys::host::UPTIME, "Uptime", false),
    field(keys::host::LOCAL_NETWORKS, "Local networks", false),
];

const POD_FIELDS: &[Field] = &[
    field(keys::kubernetes::POD_ID, "ID", true),
    field(keys::kubernetes::NAMESPACE, "Namespace", true),
    field(keys::kubernetes::POD_STATE, "State", true),
];

const SERVICE_FIELDS: &[Field] = &[
    field(keys::kubernetes::SERVICE_ID, "ID", true),
    field(keys::kubernetes::NAMESPACE, "Namespace", true),
];

fn fields(topology: &str) -> &'static [Field] {
    match topology {
        PROCESS => PROCESS_FIELDS,
        CONTAINER => CONTAINER_FIELDS,
        CONTAINER_IMAGE => CONTAINER_IMAGE_FIELDS,
        HOST => HOST_FIELDS,
        POD => POD_FIELDS,
        SERVICE => SERVICE_FIELDS,
        _ => &[],
    }
}

/// A metadata value, or a set joined with ", ".
fn value(node: &Node, id: &str) -> Option<String> {
    if let Some(value) = node.latest_value(id) {
        return Some(value.to_string());
    }
    let set = node.sets.lookup(id)?;
    (!set.is_empty()).then(|| set.iter().collect::<Vec<_>>().join(", "))
}

fn prime_first(mut rows: Vec<MetadataRow>) -> Vec<MetadataRow> {
    rows.sort_by_key(|row| !row.prime);
    rows
}

/// The metadata rows of a node, using the built-in fields of its topology.
pub fn node_metadata(node: &Node) -> Vec<MetadataRow> {
    let rows = fields(&node.topology)
        .iter()
        .filter_map(|field| {
            value(node, field.id).map(|value| MetadataRow {
                id: field.id.to_string(),
                label: field.label.to_string(),
                value,
                prime: field.prime,
            })
        })
        .collect();
    prime_first(rows)
}

/// The metadata rows of a node as described by reporter-supplied templates,
/// in priority order.
pub fn node_metadata_from_templates(
    node: &Node,
    templates: &BTreeMap<String, MetadataTemplate>,
) -> Vec<MetadataRow> {
    let mut templates: Vec<&MetadataTemplate> = templates.values().collect();
    templates.sort_by(|a, b| (a.priority, &a.id).cmp(&(b.priority, &b.id)));

    let rows = templates
        .into_iter()
        .filter_map(|template| {
            value(node, &template.id).map(|value| MetadataRow {
                id: template.id.clone(),
                label: template.label.clone(),
                value,
                prime: template.prime,
            })
        })
        .collect();
    prime_first(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use topowatch_types::StringSet;

    fn ids(rows: &[MetadataRow]) -> Vec<&str> {
        rows.iter().map(|row| row.id.as_str()).collect()
    }

    #[test]
    fn container_rows() {
        let node = Node::new("a1b2c3d4e5;<container>")
            .with_topology(CONTAINER)
            .with_latest(keys::docker::CONTAINER_ID, 1, "a1b2c3d4e5")
            .with_latest("docker_label_label1", 1, "label1value")
            .with_latest(keys::docker::CONTAINER_STATE, 1, "running")
            .with_set(
                keys::docker::CONTAINER_IPS,
                ["10.10.10.0/24", "10.10.10.1/24"].into_iter().collect::<StringSet>(),
            );

        let rows = node_metadata(&node);
        assert_eq!(
            ids(&rows),
            vec![
                keys::docker::CONTAINER_ID,
                keys::docker::CONTAINER_STATE,
                keys::docker::CONTAINER_IPS
            ]
        );
        assert!(rows[0].prime && rows[1].prime && !rows[2].prime);
        assert_eq!(rows[2].value, "10.10.10.0/24, 10.10.10.1/24");
    }

    #[test]
    fn prime_rows_come_first() {
        let node = Node::new("h;1")
            .with_topology(PROCESS)
            .with_latest(keys::process::CMDLINE, 1, "curl -s")
            .with_latest(keys::process::PPID, 1, "1");
        assert_eq!(
            ids(&node_metadata(&node)),
            vec![keys::process::PPID, keys::process::CMDLINE]
        );
    }

    #[test]
    fn unknown_topology_is_empty() {
        let node = Node::new("x")
            .with_topology("foobar")
            .with_latest(keys::docker::CONTAINER_ID, 1, "a1b2c3d4e5");
        assert!(node_metadata(&node).is_empty());
    }

    #[test]
    fn templates_order_by_priority() {
        let templates: BTreeMap<String, MetadataTemplate> = [
            MetadataTemplate {
                id: "b".into(),
                label: "B".into(),
                prime: false,
                priority: 1,
            },
            MetadataTemplate {
                id: "a".into(),
                label: "A".into(),
                prime: false,
                priority: 2,
            },
            MetadataTemplate {
                id: "c".into(),
                label: "C".into(),
                prime: true,
                priority: 3,
            },
        ]
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

        let node = Node::new("n").with_latests(1, [("a", "1"), ("b", "2"), ("c", "3")]);
        assert_eq!(ids(&node_metadata_from_templates(&node, &templates)), vec!["c", "b", "a"]);
    }
}
