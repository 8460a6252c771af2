//! Container membership of processes, inherited through parent PIDs.

use std::collections::HashMap;

use topowatch_types::{ids, keys, Node, Report};

/// Resolves the container of every process in a report.
///
/// A process without a container tag belongs to the container of its
/// nearest tagged ancestor on the same host, so short-lived children show up
/// under the right container before a tagger has seen them.
#[derive(Debug, Clone, Default)]
pub struct ProcessTree {
    containers: HashMap<String, String>,
}

impl ProcessTree {
    pub fn from_report(report: &Report) -> Self {
        let mut by_pid: HashMap<(&str, &str), &Node> = HashMap::new();
        for (id, node) in report.process.iter() {
            if let Some((host, pid)) = host_and_pid(id, node) {
                by_pid.insert((host, pid), node);
            }
        }

        let mut containers = HashMap::new();
        for (id, node) in report.process.iter() {
            let Some((host, _)) = host_and_pid(id, node) else {
                continue;
            };

            let mut current = node;
            // a ppid cycle cannot be longer than the number of processes
            for _ in 0..=by_pid.len() {
                if let Some(container) = current.latest_value(keys::docker::CONTAINER_ID) {
                    containers.insert(id.to_string(), container.to_string());
                    break;
                }
                let Some(parent) = current
                    .latest_value(keys::process::PPID)
                    .and_then(|ppid| by_pid.get(&(host, ppid)).copied())
                else {
                    break;
                };
                current = parent;
            }
        }

        Self { containers }
    }

    /// Container ID of the process with node ID `process_id`.
    pub fn container_of(&self, process_id: &str) -> Option<&str> {
        self.containers.get(process_id).map(String::as_str)
    }
}

fn host_and_pid<'a>(id: &'a str, node: &'a Node) -> Option<(&'a str, &'a str)> {
    let (host, pid) = ids::parse_process_node_id(id)?;
    Some((host, node.latest_value(keys::process::PID).unwrap_or(pid)))
}
