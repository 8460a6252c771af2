//! A small client/server deployment used by tests and benchmarks.
//!
//! Two hosts on the local networks `10.10.10.0/24` and `192.168.1.0/24`:
//!
//! - `client.hostname.com` runs two `curl` processes in the `client`
//!   container (pod `ping/pong-a`). Only the first is tagged with its
//!   container; the second is its child and inherits it.
//! - `server.hostname.com` runs `apache` in the `server` container (pod
//!   `ping/pong-b`) and an uncontained `bash`.
//!
//! Both curls talk to apache on port 80, as do an unknown local peer
//! (`10.10.10.10`) and a client on the Internet (`51.52.53.54`). Both pods
//! are selected by the service `ping/pongservice`.

use topowatch_types::{
    ids, keys, EdgeMetadata, Metric, Node, Report, StringSet, ADDRESS, CONTAINER, CONTAINER_IMAGE,
    ENDPOINT, HOST, POD, PROCESS, SERVICE,
};

pub const NOW: u64 = 1_700_000_000_000;

pub const CLIENT_HOST_NAME: &str = "client.hostname.com";
pub const SERVER_HOST_NAME: &str = "server.hostname.com";
pub const CLIENT_IP: &str = "10.10.10.20";
pub const SERVER_IP: &str = "192.168.1.1";
pub const UNKNOWN_CLIENT_IP: &str = "10.10.10.10";
pub const RANDOM_CLIENT_IP: &str = "51.52.53.54";
pub const LOCAL_NETWORKS: [&str; 2] = ["10.10.10.0/24", "192.168.1.0/24"];

pub const CLIENT_PID1: &str = "10001";
pub const CLIENT_PID2: &str = "10002";
pub const SERVER_PID: &str = "215";
pub const NON_CONTAINER_PID: &str = "10003";

pub const CLIENT_PROCESS_NAME: &str = "curl";
pub const SERVER_PROCESS_NAME: &str = "apache";
pub const NON_CONTAINER_NAME: &str = "bash";

pub const CLIENT_CONTAINER_ID: &str = "a1b2c3d4e5";
pub const SERVER_CONTAINER_ID: &str = "5e4d3c2b1a";
pub const CLIENT_CONTAINER_NAME: &str = "client";
pub const SERVER_CONTAINER_NAME: &str = "server";

pub const CLIENT_CONTAINER_IMAGE_ID: &str = "imageid123";
pub const SERVER_CONTAINER_IMAGE_ID: &str = "imageid456";
pub const CLIENT_CONTAINER_IMAGE_NAME: &str = "image/client";
pub const SERVER_CONTAINER_IMAGE_NAME: &str = "image/server";

pub const KUBERNETES_NAMESPACE: &str = "ping";
pub const CLIENT_POD_NAME: &str = "pong-a";
pub const SERVER_POD_NAME: &str = "pong-b";
pub const SERVICE_NAME: &str = "pongservice";

pub const CLIENT_PROCESS_CPU: f64 = 0.01;
pub const CLIENT_PROCESS_MEMORY: f64 = 0.02;
pub const CLIENT_CONTAINER_CPU: f64 = 0.03;
pub const CLIENT_CONTAINER_MEMORY: f64 = 0.04;
pub const CLIENT_HOST_CPU: f64 = 0.07;
pub const CLIENT_HOST_MEMORY: f64 = 0.08;
pub const CLIENT_HOST_LOAD1: f64 = 0.09;
pub const CLIENT_HOST_LOAD5: f64 = 0.10;
pub const CLIENT_HOST_LOAD15: f64 = 0.11;

pub fn client_host_node_id() -> String {
    ids::make_host_node_id(CLIENT_HOST_NAME)
}

pub fn server_host_node_id() -> String {
    ids::make_host_node_id(SERVER_HOST_NAME)
}

pub fn client_54001_node_id() -> String {
    ids::make_endpoint_node_id(CLIENT_HOST_NAME, CLIENT_IP, "54001")
}

pub fn client_54002_node_id() -> String {
    ids::make_endpoint_node_id(CLIENT_HOST_NAME, CLIENT_IP, "54002")
}

pub fn server_80_node_id() -> String {
    ids::make_endpoint_node_id(SERVER_HOST_NAME, SERVER_IP, "80")
}

pub fn unknown_client_node_id() -> String {
    ids::make_endpoint_node_id("", UNKNOWN_CLIENT_IP, "54010")
}

pub fn random_client_node_id() -> String {
    ids::make_endpoint_node_id("", RANDOM_CLIENT_IP, "12345")
}

pub fn client_process1_node_id() -> String {
    ids::make_process_node_id(CLIENT_HOST_NAME, CLIENT_PID1)
}

pub fn client_process2_node_id() -> String {
    ids::make_process_node_id(CLIENT_HOST_NAME, CLIENT_PID2)
}

pub fn server_process_node_id() -> String {
    ids::make_process_node_id(SERVER_HOST_NAME, SERVER_PID)
}

pub fn non_container_process_node_id() -> String {
    ids::make_process_node_id(SERVER_HOST_NAME, NON_CONTAINER_PID)
}

pub fn client_container_node_id() -> String {
    ids::make_container_node_id(CLIENT_CONTAINER_ID)
}

pub fn server_container_node_id() -> String {
    ids::make_container_node_id(SERVER_CONTAINER_ID)
}

pub fn client_container_image_node_id() -> String {
    ids::make_container_image_node_id(CLIENT_CONTAINER_IMAGE_ID)
}

pub fn server_container_image_node_id() -> String {
    ids::make_container_image_node_id(SERVER_CONTAINER_IMAGE_ID)
}

pub fn client_pod_node_id() -> String {
    ids::make_pod_node_id(KUBERNETES_NAMESPACE, CLIENT_POD_NAME)
}

pub fn server_pod_node_id() -> String {
    ids::make_pod_node_id(KUBERNETES_NAMESPACE, SERVER_POD_NAME)
}

pub fn service_node_id() -> String {
    ids::make_service_node_id(KUBERNETES_NAMESPACE, SERVICE_NAME)
}

pub fn client_address_node_id() -> String {
    ids::make_address_node_id(CLIENT_HOST_NAME, CLIENT_IP)
}

pub fn server_address_node_id() -> String {
    ids::make_address_node_id(SERVER_HOST_NAME, SERVER_IP)
}

pub fn unknown_address_node_id() -> String {
    ids::make_address_node_id("", UNKNOWN_CLIENT_IP)
}

fn metric(value: f64) -> Metric {
    Metric::new().add(NOW, value)
}

fn pod_label() -> String {
    format!("{}{}", keys::docker::LABEL_PREFIX, keys::kubernetes::POD_LABEL)
}

fn traffic(packets: u64, bytes: u64) -> EdgeMetadata {
    EdgeMetadata {
        egress_packet_count: Some(packets),
        egress_byte_count: Some(bytes),
        ..Default::default()
    }
}

fn tagged(id: String, host_node_id: &str) -> Node {
    Node::new(id).with_latest(keys::tagging::HOST_NODE_ID, NOW, host_node_id)
}

fn endpoint(host: Option<&str>, addr: &str, port: &str, pid: Option<&str>) -> Node {
    let id = ids::make_endpoint_node_id(host.unwrap_or_default(), addr, port);
    let mut node = match host {
        Some(host) => tagged(id, &ids::make_host_node_id(host)),
        None => Node::new(id),
    };
    node = node.with_latests(NOW, [(keys::endpoint::ADDR, addr), (keys::endpoint::PORT, port)]);
    if let Some(pid) = pid {
        node = node.with_latest(keys::process::PID, NOW, pid);
    }
    node
}

fn host(name: &str) -> Node {
    tagged(ids::make_host_node_id(name), &ids::make_host_node_id(name))
        .with_latests(NOW, [(keys::host::HOST_NAME, name), (keys::host::OS, "Linux")])
        .with_set(keys::host::LOCAL_NETWORKS, LOCAL_NETWORKS.into_iter().collect::<StringSet>())
}

fn service_ids() -> StringSet {
    StringSet::single(format!("{KUBERNETES_NAMESPACE}/{SERVICE_NAME}"))
}

/// The fixture report.
pub fn report() -> Report {
    let client_host = client_host_node_id();
    let server_host = server_host_node_id();
    let server_80 = server_80_node_id();

    Report::builder()
        .id("fixture")
        .window_ms(15_000)
        // endpoints
        .node(
            ENDPOINT,
            endpoint(Some(CLIENT_HOST_NAME), CLIENT_IP, "54001", Some(CLIENT_PID1))
                .with_edge(server_80.clone(), traffic(10, 100)),
        )
        .node(
            ENDPOINT,
            endpoint(Some(CLIENT_HOST_NAME), CLIENT_IP, "54002", Some(CLIENT_PID2))
                .with_edge(server_80.clone(), traffic(20, 200)),
        )
        .node(
            ENDPOINT,
            endpoint(Some(SERVER_HOST_NAME), SERVER_IP, "80", Some(SERVER_PID)),
        )
        .node(
            ENDPOINT,
            endpoint(None, UNKNOWN_CLIENT_IP, "54010", None).with_adjacent(server_80.clone()),
        )
        .node(
            ENDPOINT,
            endpoint(None, RANDOM_CLIENT_IP, "12345", None).with_adjacent(server_80),
        )
        // addresses
        .node(
            ADDRESS,
            tagged(client_address_node_id(), &client_host)
                .with_latest(keys::endpoint::ADDR, NOW, CLIENT_IP)
                .with_adjacent(server_address_node_id()),
        )
        .node(
            ADDRESS,
            tagged(server_address_node_id(), &server_host)
                .with_latest(keys::endpoint::ADDR, NOW, SERVER_IP),
        )
        .node(
            ADDRESS,
            Node::new(unknown_address_node_id())
                .with_latest(keys::endpoint::ADDR, NOW, UNKNOWN_CLIENT_IP)
                .with_adjacent(server_address_node_id()),
        )
        // processes
        .node(
            PROCESS,
            tagged(client_process1_node_id(), &client_host)
                .with_latests(
                    NOW,
                    [
                        (keys::process::PID, CLIENT_PID1),
                        (keys::process::NAME, CLIENT_PROCESS_NAME),
                        (keys::docker::CONTAINER_ID, CLIENT_CONTAINER_ID),
                    ],
                )
                .with_metric(keys::process::CPU_USAGE, metric(CLIENT_PROCESS_CPU))
                .with_metric(keys::process::MEMORY_USAGE, metric(CLIENT_PROCESS_MEMORY))
                .with_parent(CONTAINER, client_container_node_id())
                .with_parent(CONTAINER_IMAGE, client_container_image_node_id())
                .with_parent(HOST, client_host.clone()),
        )
        .node(
            PROCESS,
            tagged(client_process2_node_id(), &client_host)
                .with_latests(
                    NOW,
                    [
                        (keys::process::PID, CLIENT_PID2),
                        (keys::process::PPID, CLIENT_PID1),
                        (keys::process::NAME, CLIENT_PROCESS_NAME),
                    ],
                )
                .with_parent(HOST, client_host.clone()),
        )
        .node(
            PROCESS,
            tagged(server_process_node_id(), &server_host)
                .with_latests(
                    NOW,
                    [
                        (keys::process::PID, SERVER_PID),
                        (keys::process::NAME, SERVER_PROCESS_NAME),
                        (keys::docker::CONTAINER_ID, SERVER_CONTAINER_ID),
                    ],
                )
                .with_parent(CONTAINER, server_container_node_id())
                .with_parent(CONTAINER_IMAGE, server_container_image_node_id())
                .with_parent(HOST, server_host.clone()),
        )
        .node(
            PROCESS,
            tagged(non_container_process_node_id(), &server_host)
                .with_latests(
                    NOW,
                    [
                        (keys::process::PID, NON_CONTAINER_PID),
                        (keys::process::PPID, "1"),
                        (keys::process::NAME, NON_CONTAINER_NAME),
                    ],
                )
                .with_parent(HOST, server_host.clone()),
        )
        // containers
        .node(
            CONTAINER,
            tagged(client_container_node_id(), &client_host)
                .with_latests(
                    NOW,
                    [
                        (keys::docker::CONTAINER_ID, CLIENT_CONTAINER_ID),
                        (keys::docker::CONTAINER_NAME, CLIENT_CONTAINER_NAME),
                        (keys::docker::CONTAINER_STATE, keys::docker::STATE_RUNNING),
                        (keys::docker::IMAGE_ID, CLIENT_CONTAINER_IMAGE_ID),
                    ],
                )
                .with_latest(pod_label(), NOW, format!("{KUBERNETES_NAMESPACE}/{CLIENT_POD_NAME}"))
                .with_metric(keys::docker::CPU_TOTAL_USAGE, metric(CLIENT_CONTAINER_CPU))
                .with_metric(keys::docker::MEMORY_USAGE, metric(CLIENT_CONTAINER_MEMORY))
                .with_parent(CONTAINER_IMAGE, client_container_image_node_id())
                .with_parent(HOST, client_host.clone())
                .with_parent(POD, client_pod_node_id()),
        )
        .node(
            CONTAINER,
            tagged(server_container_node_id(), &server_host)
                .with_latests(
                    NOW,
                    [
                        (keys::docker::CONTAINER_ID, SERVER_CONTAINER_ID),
                        (keys::docker::CONTAINER_NAME, SERVER_CONTAINER_NAME),
                        (keys::docker::CONTAINER_STATE, keys::docker::STATE_RUNNING),
                        (keys::docker::IMAGE_ID, SERVER_CONTAINER_IMAGE_ID),
                    ],
                )
                .with_latest(pod_label(), NOW, format!("{KUBERNETES_NAMESPACE}/{SERVER_POD_NAME}"))
                .with_parent(CONTAINER_IMAGE, server_container_image_node_id())
                .with_parent(HOST, server_host.clone())
                .with_parent(POD, server_pod_node_id()),
        )
        // container images
        .node(
            CONTAINER_IMAGE,
            tagged(client_container_image_node_id(), &client_host)
                .with_latests(
                    NOW,
                    [
                        (keys::docker::IMAGE_ID, CLIENT_CONTAINER_IMAGE_ID),
                        (keys::docker::IMAGE_NAME, CLIENT_CONTAINER_IMAGE_NAME),
                    ],
                )
                .with_parent(HOST, client_host.clone()),
        )
        .node(
            CONTAINER_IMAGE,
            tagged(server_container_image_node_id(), &server_host)
                .with_latests(
                    NOW,
                    [
                        (keys::docker::IMAGE_ID, SERVER_CONTAINER_IMAGE_ID),
                        (keys::docker::IMAGE_NAME, SERVER_CONTAINER_IMAGE_NAME),
                    ],
                )
                .with_parent(HOST, server_host.clone()),
        )
        // kubernetes
        .node(
            POD,
            tagged(client_pod_node_id(), &client_host)
                .with_latests(
                    NOW,
                    [
                        (
                            keys::kubernetes::POD_ID,
                            format!("{KUBERNETES_NAMESPACE}/{CLIENT_POD_NAME}").as_str(),
                        ),
                        (keys::kubernetes::POD_NAME, CLIENT_POD_NAME),
                        (keys::kubernetes::NAMESPACE, KUBERNETES_NAMESPACE),
                    ],
                )
                .with_set(keys::kubernetes::SERVICE_IDS, service_ids())
                .with_parent(HOST, client_host.clone())
                .with_parent(SERVICE, service_node_id()),
        )
        .node(
            POD,
            tagged(server_pod_node_id(), &server_host)
                .with_latests(
                    NOW,
                    [
                        (
                            keys::kubernetes::POD_ID,
                            format!("{KUBERNETES_NAMESPACE}/{SERVER_POD_NAME}").as_str(),
                        ),
                        (keys::kubernetes::POD_NAME, SERVER_POD_NAME),
                        (keys::kubernetes::NAMESPACE, KUBERNETES_NAMESPACE),
                    ],
                )
                .with_set(keys::kubernetes::SERVICE_IDS, service_ids())
                .with_parent(HOST, server_host.clone())
                .with_parent(SERVICE, service_node_id()),
        )
        .node(
            SERVICE,
            Node::new(service_node_id()).with_latests(
                NOW,
                [
                    (
                        keys::kubernetes::SERVICE_ID,
                        format!("{KUBERNETES_NAMESPACE}/{SERVICE_NAME}").as_str(),
                    ),
                    (keys::kubernetes::SERVICE_NAME, SERVICE_NAME),
                    (keys::kubernetes::NAMESPACE, KUBERNETES_NAMESPACE),
                ],
            ),
        )
        // hosts
        .node(
            HOST,
            host(CLIENT_HOST_NAME)
                .with_metric(keys::host::CPU_USAGE, metric(CLIENT_HOST_CPU))
                .with_metric(keys::host::MEMORY_USAGE, metric(CLIENT_HOST_MEMORY))
                .with_metric(keys::host::LOAD1, metric(CLIENT_HOST_LOAD1))
                .with_metric(keys::host::LOAD5, metric(CLIENT_HOST_LOAD5))
                .with_metric(keys::host::LOAD15, metric(CLIENT_HOST_LOAD15)),
        )
        .node(HOST, host(SERVER_HOST_NAME))
        .build()
}
