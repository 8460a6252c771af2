use serde::{Deserialize, Serialize};
use topowatch_types::{keys, Node, Report, CONTAINER, CONTAINER_IMAGE, HOST, POD, SERVICE};

use crate::registry;

/// A link from a node to a node it belongs to in another view.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub label: String,
    pub topology_id: String,
}

/// The view in which parents of a report topology are browsed.
fn view_of(topology: &str) -> Option<&'static str> {
    Some(match topology {
        CONTAINER => registry::CONTAINERS,
        CONTAINER_IMAGE => registry::CONTAINERS_BY_IMAGE,
        HOST => registry::HOSTS,
        POD => registry::PODS,
        SERVICE => registry::PODS_BY_SERVICE,
        _ => return None,
    })
}

fn label(topology: &str, parent: &Node) -> Option<String> {
    let key = match topology {
        CONTAINER => keys::docker::CONTAINER_NAME,
        CONTAINER_IMAGE => keys::docker::IMAGE_NAME,
        HOST => keys::host::HOST_NAME,
        POD => keys::kubernetes::POD_NAME,
        SERVICE => keys::kubernetes::SERVICE_NAME,
        _ => return None,
    };
    parent
        .latest_value(key)
        .map(|name| name.trim_start_matches('/').to_string())
}

/// Parents of `node` that exist in `report`, sorted by view then ID.
///
/// Parents missing from the report are skipped, as is the node itself when
/// it is tagged as its own parent.
pub fn parents(report: &Report, node: &Node) -> Vec<Parent> {
    let mut out = Vec::new();
    for (topology, ids) in node.parents.iter() {
        let (Some(view), Some(nodes)) = (view_of(topology), report.topology(topology)) else {
            continue;
        };
        for id in ids.iter().filter(|id| *id != node.id) {
            let Some(parent) = nodes.get(id) else {
                continue;
            };
            out.push(Parent {
                id: id.to_string(),
                label: label(topology, parent).unwrap_or_else(|| id.to_string()),
                topology_id: view.to_string(),
            });
        }
    }
    out.sort_by(|a, b| (&a.topology_id, &a.id).cmp(&(&b.topology_id, &b.id)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report::builder()
            .node(
                HOST,
                Node::new("h;<host>").with_latest(keys::host::HOST_NAME, 1, "h.example.com"),
            )
            .node(
                CONTAINER,
                Node::new("c;<container>").with_latest(keys::docker::CONTAINER_NAME, 1, "/client"),
            )
            .node(
                CONTAINER_IMAGE,
                Node::new("i;<container_image>")
                    .with_latest(keys::docker::IMAGE_NAME, 1, "image/client"),
            )
            .build()
    }

    #[test]
    fn parents_sorted_by_view() {
        let node = Node::new("h;10001")
            .with_parent(HOST, "h;<host>")
            .with_parent(CONTAINER_IMAGE, "i;<container_image>")
            .with_parent(CONTAINER, "c;<container>");

        let have = parents(&report(), &node);
        let want = vec![
            Parent {
                id: "c;<container>".into(),
                label: "client".into(),
                topology_id: registry::CONTAINERS.into(),
            },
            Parent {
                id: "i;<container_image>".into(),
                label: "image/client".into(),
                topology_id: registry::CONTAINERS_BY_IMAGE.into(),
            },
            Parent {
                id: "h;<host>".into(),
                label: "h.example.com".into(),
                topology_id: registry::HOSTS.into(),
            },
        ];
        assert_eq!(have, want);
    }

    #[test]
    fn self_and_missing_parents_are_skipped() {
        let host = Node::new("h;<host>").with_parent(HOST, "h;<host>");
        assert!(parents(&report(), &host).is_empty());

        let orphan = Node::new("h;1").with_parent(POD, "ns/gone;<pod>");
        assert!(parents(&report(), &orphan).is_empty());
    }
}
