//! Detail tables of fixture nodes, as served by the registry.

use topowatch_render::{
    detailed::{make_node_summary, node_metrics, parents, Parent},
    fixture, mapping, registry, RenderError, TopologyRegistry,
};
use topowatch_types::{ids, keys};

fn parent(id: String, label: &str, view: &str) -> Parent {
    Parent {
        id,
        label: label.to_string(),
        topology_id: view.to_string(),
    }
}

#[test]
fn container_details() {
    let registry = TopologyRegistry::default();
    let report = fixture::report();
    let details = registry
        .node_details(registry::CONTAINERS, &fixture::client_container_node_id(), &report)
        .unwrap();

    assert_eq!(details.label, fixture::CLIENT_CONTAINER_NAME);
    assert_eq!(details.rank, fixture::CLIENT_CONTAINER_IMAGE_NAME);
    assert!(!details.pseudo);

    let metadata: Vec<(&str, &str, bool)> = details
        .metadata
        .iter()
        .map(|row| (row.id.as_str(), row.value.as_str(), row.prime))
        .collect();
    assert_eq!(
        metadata,
        vec![
            (keys::docker::CONTAINER_ID, fixture::CLIENT_CONTAINER_ID, true),
            (keys::docker::CONTAINER_STATE, keys::docker::STATE_RUNNING, true),
            (keys::docker::IMAGE_ID, fixture::CLIENT_CONTAINER_IMAGE_ID, false),
        ]
    );

    assert_eq!(details.labels.len(), 1);
    assert_eq!(details.labels[0].id, format!("label_{}", keys::kubernetes::POD_LABEL));
    assert_eq!(details.labels[0].value, "ping/pong-a");

    let metrics: Vec<(&str, f64)> = details
        .metrics
        .iter()
        .map(|row| (row.id.as_str(), row.value))
        .collect();
    assert_eq!(
        metrics,
        vec![
            (keys::docker::CPU_TOTAL_USAGE, fixture::CLIENT_CONTAINER_CPU),
            (keys::docker::MEMORY_USAGE, fixture::CLIENT_CONTAINER_MEMORY),
        ]
    );

    assert_eq!(
        details.parents,
        vec![
            parent(
                fixture::client_container_image_node_id(),
                fixture::CLIENT_CONTAINER_IMAGE_NAME,
                registry::CONTAINERS_BY_IMAGE
            ),
            parent(fixture::client_host_node_id(), fixture::CLIENT_HOST_NAME, registry::HOSTS),
            parent(fixture::client_pod_node_id(), fixture::CLIENT_POD_NAME, registry::PODS),
        ]
    );
}

#[test]
fn process_details() {
    let registry = TopologyRegistry::default();
    let report = fixture::report();
    let details = registry
        .node_details(registry::PROCESSES, &fixture::client_process1_node_id(), &report)
        .unwrap();

    assert_eq!(details.topology, topowatch_types::PROCESS);
    assert_eq!(details.metadata[0].id, keys::process::PID);
    assert_eq!(details.metadata[0].value, fixture::CLIENT_PID1);

    let cpu = &details.metrics[0];
    assert_eq!(cpu.id, keys::process::CPU_USAGE);
    assert_eq!(cpu.format, "percent");
    assert_eq!(cpu.value, fixture::CLIENT_PROCESS_CPU);
    assert_eq!(details.metrics[1].value, fixture::CLIENT_PROCESS_MEMORY);

    assert_eq!(
        details.parents,
        vec![
            parent(
                fixture::client_container_node_id(),
                fixture::CLIENT_CONTAINER_NAME,
                registry::CONTAINERS
            ),
            parent(
                fixture::client_container_image_node_id(),
                fixture::CLIENT_CONTAINER_IMAGE_NAME,
                registry::CONTAINERS_BY_IMAGE
            ),
            parent(fixture::client_host_node_id(), fixture::CLIENT_HOST_NAME, registry::HOSTS),
        ]
    );
    assert_eq!(
        details.adjacency,
        vec![fixture::server_process_node_id()]
    );
    assert_eq!(details.edge_metadata.egress_byte_count, Some(100));
}

#[test]
fn host_metrics_include_load() {
    let report = fixture::report();
    let host = report.host.nodes.get(&fixture::client_host_node_id()).unwrap();
    let rows = node_metrics(host);

    let values: Vec<(&str, f64)> = rows.iter().map(|row| (row.id.as_str(), row.value)).collect();
    assert_eq!(
        values,
        vec![
            (keys::host::CPU_USAGE, fixture::CLIENT_HOST_CPU),
            (keys::host::MEMORY_USAGE, fixture::CLIENT_HOST_MEMORY),
            (keys::host::LOAD1, fixture::CLIENT_HOST_LOAD1),
            (keys::host::LOAD5, fixture::CLIENT_HOST_LOAD5),
            (keys::host::LOAD15, fixture::CLIENT_HOST_LOAD15),
        ]
    );
    assert!(rows[2..].iter().all(|row| row.group == "load" && row.format.is_empty()));

    // the server host reports no metrics at all
    let server = report.host.nodes.get(&fixture::server_host_node_id()).unwrap();
    assert!(node_metrics(server).is_empty());
}

#[test]
fn image_parents_are_hosts() {
    let registry = TopologyRegistry::default();
    let report = fixture::report();
    let nodes = registry
        .render_topology(registry::CONTAINERS_BY_IMAGE, &report, false)
        .unwrap();
    let image = nodes.get(&fixture::client_container_image_node_id()).unwrap();

    assert_eq!(
        parents(&report, &image.node),
        vec![parent(fixture::client_host_node_id(), fixture::CLIENT_HOST_NAME, registry::HOSTS)]
    );
}

#[test]
fn pseudo_node_details() {
    let registry = TopologyRegistry::default();
    let report = fixture::report();
    let details = registry
        .node_details(registry::PROCESSES, mapping::THE_INTERNET_ID, &report)
        .unwrap();

    assert!(details.pseudo);
    assert_eq!(details.label, mapping::THE_INTERNET_LABEL);
    assert!(details.metadata.is_empty());
    assert!(details.parents.is_empty());
    assert!(details.origins.contains(&fixture::random_client_node_id()));
}

#[test]
fn summaries_only_carry_prime_metadata() {
    let registry = TopologyRegistry::default();
    let nodes = registry
        .render_topology(registry::HOSTS, &fixture::report(), false)
        .unwrap();
    let summary = make_node_summary(nodes.get(&fixture::client_host_node_id()).unwrap());

    assert_eq!(summary.label, "client");
    let fields: Vec<&str> = summary.metadata.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(fields, vec![keys::host::HOST_NAME, keys::host::OS]);
}

#[test]
fn missing_nodes_are_reported() {
    let registry = TopologyRegistry::default();
    let err = registry
        .node_details(registry::HOSTS, &ids::make_host_node_id("elsewhere"), &fixture::report())
        .unwrap_err();
    assert_eq!(
        err,
        RenderError::UnknownNode {
            topology: registry::HOSTS.to_string(),
            id: ids::make_host_node_id("elsewhere"),
        }
    );
}

#[test]
fn details_serialize_to_json() {
    let registry = TopologyRegistry::default();
    let details = registry
        .node_details(registry::HOSTS, &fixture::client_host_node_id(), &fixture::report())
        .unwrap();
    let json = serde_json::to_value(&details).unwrap();

    assert_eq!(json["label"], "client");
    assert_eq!(json["metrics"].as_array().unwrap().len(), 5);
    assert_eq!(json["metrics"][2]["group"], "load");
}
