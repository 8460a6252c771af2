//! Map functions used by the topology views.
//!
//! Each function turns one rendered node into the nodes it belongs to in a
//! coarser view: endpoints into processes, processes into containers,
//! containers into images and pods, and so on. Pseudo nodes stand in for
//! things no probe reported: the Internet, unknown local peers, processes
//! outside any container and containers outside any pod.

use topowatch_types::{
    ids, keys, EdgeMetadatas, Sets, StringSet, ADDRESS, CONTAINER, CONTAINER_IMAGE, ENDPOINT, HOST,
    POD, PROCESS, SERVICE,
};

use crate::map::MapContext;
use crate::renderable::RenderableNode;

pub const THE_INTERNET_ID: &str = "theinternet";
pub const THE_INTERNET_LABEL: &str = "the Internet";
pub const UNCONTAINED_LABEL: &str = "Uncontained";
pub const UNMANAGED_LABEL: &str = "Unmanaged";

pub const PROCESSES_COUNTER: &str = "processes";
pub const CONTAINERS_COUNTER: &str = "containers";
pub const PODS_COUNTER: &str = "pods";

/// ID of the node grouping the processes of `host` that run outside any
/// container.
pub fn uncontained_id(host: &str) -> String {
    ids::make_pseudo_node_id(&["uncontained", host])
}

/// ID of the node grouping the containers of `host` that belong to no pod.
pub fn unmanaged_id(host: &str) -> String {
    ids::make_pseudo_node_id(&["unmanaged", host])
}

/// Parent topologies a node of `topology` may link to.
fn allowed_parents(topology: &str) -> &'static [&'static str] {
    match topology {
        PROCESS => &[CONTAINER, CONTAINER_IMAGE, POD, HOST],
        CONTAINER => &[CONTAINER_IMAGE, POD, HOST, SERVICE],
        CONTAINER_IMAGE => &[HOST],
        POD => &[HOST, SERVICE],
        _ => &[],
    }
}

/// A node of `topology` built from `input`.
///
/// Metadata, sets and metrics carry over so the coarser node keeps what was
/// observed about its members. Connectivity and tallies do not: adjacency is
/// rewritten by [`crate::Map`] and counters belong to the view that adds them.
fn derive(id: impl Into<String>, topology: &str, input: &RenderableNode) -> RenderableNode {
    let id = id.into();
    let allowed = allowed_parents(topology);

    let mut node = input.node.clone();
    node.id = id.clone();
    node.topology = topology.to_string();
    node.adjacency = StringSet::new();
    node.edges = EdgeMetadatas::new();
    node.counters = Default::default();
    node.parents = input
        .node
        .parents
        .iter()
        .filter(|(parent, _)| allowed.iter().any(|allowed| allowed == parent))
        .fold(Sets::new(), |sets, (parent, ids)| sets.with(parent, ids.clone()));

    RenderableNode {
        id,
        edge_metadata: input.edge_metadata,
        node,
        ..Default::default()
    }
}

fn pseudo(
    id: impl Into<String>,
    major: impl Into<String>,
    minor: impl Into<String>,
    input: &RenderableNode,
) -> RenderableNode {
    let mut node = RenderableNode::pseudo(id, major);
    node.label_minor = minor.into();
    node.edge_metadata = input.edge_metadata;
    node
}

fn the_internet(input: &RenderableNode) -> RenderableNode {
    pseudo(THE_INTERNET_ID, THE_INTERNET_LABEL, "", input)
}

/// Pseudo nodes survive every regrouping unchanged.
fn passthrough(input: &RenderableNode) -> Vec<RenderableNode> {
    vec![input.clone()]
}

/// The hostname of the probe that reported `input`.
fn hostname(input: &RenderableNode) -> Option<&str> {
    let host_node_id = input.node.latest_value(keys::tagging::HOST_NODE_ID)?;
    Some(ids::parse_host_node_id(host_node_id).unwrap_or(host_node_id))
}

fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// A peer no probe reported: the shared Internet node when it lies outside
/// every local network, otherwise its own pseudo node.
fn unknown_peer(input: &RenderableNode, ctx: &MapContext<'_>, parts: &[&str]) -> RenderableNode {
    let addr = parts[0];
    if !ctx.local_networks().contains_addr(addr) {
        return the_internet(input);
    }
    let label = input
        .node
        .sets
        .lookup(keys::endpoint::REVERSE_DNS_NAMES)
        .and_then(StringSet::first)
        .map(str::to_string)
        .unwrap_or_else(|| parts.join(":"));
    pseudo(ids::make_pseudo_node_id(parts), label, "", input)
}

pub fn map_endpoint_identity(n: &RenderableNode, ctx: &MapContext<'_>) -> Vec<RenderableNode> {
    let meta = &n.node;
    let (addr, port) = match (
        meta.latest_value(keys::endpoint::ADDR),
        meta.latest_value(keys::endpoint::PORT),
    ) {
        (Some(addr), Some(port)) => (addr, port),
        _ => match ids::parse_endpoint_node_id(&n.id) {
            Some((_, addr, port)) => (addr, port),
            None => return vec![],
        },
    };

    match hostname(n) {
        None => vec![unknown_peer(n, ctx, &[addr, port])],
        Some(host) => vec![derive(n.id.clone(), ENDPOINT, n)
            .with_labels(format!("{addr}:{port}"), host)
            .with_rank(addr)],
    }
}

/// Endpoints belong to the process that owns their socket.
pub fn map_endpoint_to_process(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let (Some(pid), Some(host)) = (n.node.latest_value(keys::process::PID), hostname(n)) else {
        return vec![];
    };
    vec![derive(ids::make_process_node_id(host, pid), PROCESS, n)]
}

pub fn map_process_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let Some(pid) = n.node.latest_value(keys::process::PID) else {
        return vec![];
    };
    let name = n.node.latest_value(keys::process::NAME).unwrap_or(pid);
    let host = hostname(n)
        .or_else(|| ids::parse_process_node_id(&n.id).map(|(host, _)| host))
        .unwrap_or_default();

    vec![derive(n.id.clone(), PROCESS, n)
        .with_labels(name, format!("{host} ({pid})"))
        .with_rank(name)]
}

/// Processes with the same name are grouped system wide.
pub fn map_process_to_name(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let Some(name) = n.node.latest_value(keys::process::NAME) else {
        return vec![];
    };
    let mut out = derive(name, PROCESS, n).with_labels(name, "").with_rank(name);
    out.node.counters.add(PROCESSES_COUNTER, 1);
    vec![out]
}

pub fn map_count_processes(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let mut out = n.clone();
    if let Some(count) = n.node.counters.lookup(PROCESSES_COUNTER) {
        out.label_minor = plural(count, "process", "processes");
    }
    vec![out]
}

/// Processes belong to their container, or to their host's "Uncontained"
/// node when they have none.
pub fn map_process_to_container(n: &RenderableNode, ctx: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let container = ctx
        .process_tree()
        .container_of(&n.id)
        .or_else(|| n.node.latest_value(keys::docker::CONTAINER_ID));

    match (container, hostname(n)) {
        (Some(container), _) => vec![derive(ids::make_container_node_id(container), CONTAINER, n)],
        (None, Some(host)) => vec![pseudo(uncontained_id(host), UNCONTAINED_LABEL, host, n)],
        (None, None) => vec![],
    }
}

pub fn map_container_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let meta = &n.node;
    let Some(container_id) = meta
        .latest_value(keys::docker::CONTAINER_ID)
        .or_else(|| ids::parse_container_node_id(&n.id))
    else {
        return vec![];
    };
    let name = meta
        .latest_value(keys::docker::CONTAINER_NAME)
        .map(|name| name.trim_start_matches('/'))
        .unwrap_or(container_id);
    let image = meta.latest_value(keys::docker::IMAGE_NAME).unwrap_or_default();

    vec![derive(n.id.clone(), CONTAINER, n)
        .with_labels(name, hostname(n).unwrap_or_default())
        .with_rank(image)]
}

/// Image name without its tag, e.g. `nginx` for `nginx:1.25`.
pub fn image_name_without_version(image: &str) -> &str {
    let name_start = image.rfind('/').map_or(0, |slash| slash + 1);
    match image[name_start..].find(':') {
        Some(colon) => &image[..name_start + colon],
        None => image,
    }
}

/// Containers take their image name from the image topology when the
/// container node itself does not carry it.
pub fn map_container_image_name(n: &RenderableNode, ctx: &MapContext<'_>) -> Vec<RenderableNode> {
    let mut out = n.clone();
    if n.pseudo {
        return vec![out];
    }
    let Some(image_id) = n.node.latest_value(keys::docker::IMAGE_ID) else {
        return vec![out];
    };
    let image = ctx
        .report()
        .container_image
        .get(&ids::make_container_image_node_id(image_id))
        .and_then(|image| image.latest.lookup_entry(keys::docker::IMAGE_NAME));

    if let Some(entry) = image {
        out.node
            .latest
            .set(keys::docker::IMAGE_NAME.to_string(), entry.timestamp, entry.value.clone());
        out.rank = image_name_without_version(&entry.value).to_string();
    }
    vec![out]
}

pub fn map_container_to_image(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let Some(image_id) = n.node.latest_value(keys::docker::IMAGE_ID) else {
        return vec![];
    };
    let mut out = derive(ids::make_container_image_node_id(image_id), CONTAINER_IMAGE, n);
    out.node.counters.add(CONTAINERS_COUNTER, 1);
    vec![out]
}

pub fn map_container_image_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let meta = &n.node;
    let Some(image_id) = meta
        .latest_value(keys::docker::IMAGE_ID)
        .or_else(|| ids::parse_container_image_node_id(&n.id))
    else {
        return vec![];
    };
    let name = meta.latest_value(keys::docker::IMAGE_NAME).unwrap_or(image_id);
    vec![derive(n.id.clone(), CONTAINER_IMAGE, n)
        .with_labels(name, "")
        .with_rank(image_name_without_version(name))]
}

pub fn map_count_containers(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let mut out = n.clone();
    if let Some(count) = n.node.counters.lookup(CONTAINERS_COUNTER) {
        out.label_minor = plural(count, "container", "containers");
    }
    vec![out]
}

pub fn map_address_identity(n: &RenderableNode, ctx: &MapContext<'_>) -> Vec<RenderableNode> {
    let Some(addr) = n
        .node
        .latest_value(keys::endpoint::ADDR)
        .or_else(|| ids::parse_address_node_id(&n.id).map(|(_, addr)| addr))
    else {
        return vec![];
    };

    match hostname(n) {
        None => vec![unknown_peer(n, ctx, &[addr])],
        Some(host) => vec![derive(n.id.clone(), ADDRESS, n)
            .with_labels(addr, host)
            .with_rank(addr)],
    }
}

/// Non-pseudo nodes belong to the host of the probe that reported them.
pub fn map_x_to_host(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return vec![];
    }
    let Some(host_node_id) = n.node.latest_value(keys::tagging::HOST_NODE_ID) else {
        return vec![];
    };
    vec![derive(host_node_id, HOST, n)]
}

pub fn map_address_to_host(n: &RenderableNode, ctx: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    map_x_to_host(n, ctx)
}

pub fn map_host_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let Some(name) = n
        .node
        .latest_value(keys::host::HOST_NAME)
        .or_else(|| ids::parse_host_node_id(&n.id))
    else {
        return vec![];
    };
    let (major, minor) = name.split_once('.').unwrap_or((name, ""));
    vec![derive(n.id.clone(), HOST, n)
        .with_labels(major, minor)
        .with_rank(minor)]
}

/// Containers belong to the pod named by their kubernetes label, or to
/// their host's "Unmanaged" node.
pub fn map_container_to_pod(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let label = format!("{}{}", keys::docker::LABEL_PREFIX, keys::kubernetes::POD_LABEL);
    let pod = n
        .node
        .latest_value(&label)
        .and_then(|pod| pod.split_once('/'));

    match (pod, hostname(n)) {
        (Some((namespace, name)), _) => {
            vec![derive(ids::make_pod_node_id(namespace, name), POD, n)]
        }
        (None, Some(host)) => vec![pseudo(unmanaged_id(host), UNMANAGED_LABEL, host, n)],
        (None, None) => vec![],
    }
}

fn namespaced(n: &RenderableNode, name_key: &str, id: Option<&str>) -> Option<(String, String)> {
    let (namespace, name) = id.and_then(|id| id.split_once('/')).unwrap_or(("", ""));
    let namespace = n
        .node
        .latest_value(keys::kubernetes::NAMESPACE)
        .unwrap_or(namespace);
    let name = n.node.latest_value(name_key).unwrap_or(name);
    (!name.is_empty()).then(|| (name.to_string(), namespace.to_string()))
}

pub fn map_pod_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let id = n
        .node
        .latest_value(keys::kubernetes::POD_ID)
        .or_else(|| ids::parse_pod_node_id(&n.id));
    let Some((name, namespace)) = namespaced(n, keys::kubernetes::POD_NAME, id) else {
        return vec![];
    };
    vec![derive(n.id.clone(), POD, n)
        .with_labels(name, namespace.clone())
        .with_rank(namespace)]
}

/// Pods belong to every service selecting them. Pods no service selects
/// drop out of the view.
pub fn map_pod_to_service(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    if n.pseudo {
        return passthrough(n);
    }
    let Some(services) = n.node.sets.lookup(keys::kubernetes::SERVICE_IDS) else {
        return vec![];
    };
    services
        .iter()
        .filter_map(|service| service.split_once('/'))
        .map(|(namespace, name)| {
            let mut out = derive(ids::make_service_node_id(namespace, name), SERVICE, n);
            out.node.counters.add(PODS_COUNTER, 1);
            out
        })
        .collect()
}

pub fn map_service_identity(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let id = n
        .node
        .latest_value(keys::kubernetes::SERVICE_ID)
        .or_else(|| ids::parse_service_node_id(&n.id));
    let Some((name, namespace)) = namespaced(n, keys::kubernetes::SERVICE_NAME, id) else {
        return vec![];
    };
    vec![derive(n.id.clone(), SERVICE, n)
        .with_labels(name, namespace.clone())
        .with_rank(namespace)]
}

pub fn map_count_pods(n: &RenderableNode, _: &MapContext<'_>) -> Vec<RenderableNode> {
    let mut out = n.clone();
    if let Some(count) = n.node.counters.lookup(PODS_COUNTER) {
        out.label_minor = plural(count, "pod", "pods");
    }
    vec![out]
}
