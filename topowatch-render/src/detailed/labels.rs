use topowatch_types::{keys, Node, CONTAINER, CONTAINER_IMAGE};

use super::MetadataRow;

/// Docker labels of a container or image node, sorted by label name.
pub fn node_docker_labels(node: &Node) -> Vec<MetadataRow> {
    if node.topology != CONTAINER && node.topology != CONTAINER_IMAGE {
        return Vec::new();
    }

    node.latest
        .iter()
        .filter_map(|(key, value)| {
            let label = key.strip_prefix(keys::docker::LABEL_PREFIX)?;
            Some(MetadataRow {
                id: format!("label_{label}"),
                label: label.to_string(),
                value: value.clone(),
                prime: false,
            })
        })
        .collect()
}
