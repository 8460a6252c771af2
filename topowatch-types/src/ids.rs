//! Canonical node IDs.
//!
//! Node IDs are plain strings so they can be used directly as map keys and
//! adjacency targets. Each topology has its own shape:
//!
//! | Topology | ID |
//! |----------|----|
//! | endpoint | `<host>;<addr>;<port>` |
//! | address | `<host>;<addr>` |
//! | process | `<host>;<pid>` |
//! | host | `<host>;<host>` |
//! | container | `<id>;<container>` |
//! | container image | `<id>;<container_image>` |
//! | pod | `<ns>/<name>;<pod>` |
//! | service | `<ns>/<name>;<service>` |
//! | overlay | `<peer>;<overlay>` |
//!
//! Synthetic nodes that stand for something never observed directly use
//! `pseudo:` followed by their parts joined with `:`.

const SEPARATOR: char = ';';
const PSEUDO_PREFIX: &str = "pseudo:";

const HOST_TAG: &str = "<host>";
const CONTAINER_TAG: &str = "<container>";
const CONTAINER_IMAGE_TAG: &str = "<container_image>";
const POD_TAG: &str = "<pod>";
const SERVICE_TAG: &str = "<service>";
const OVERLAY_TAG: &str = "<overlay>";

fn tagged(id: &str, tag: &str) -> String {
    format!("{id}{SEPARATOR}{tag}")
}

fn untag<'a>(node_id: &'a str, tag: &str) -> Option<&'a str> {
    let (id, rest) = node_id.rsplit_once(SEPARATOR)?;
    (rest == tag).then_some(id)
}

pub fn make_endpoint_node_id(host: &str, addr: &str, port: &str) -> String {
    format!("{host}{SEPARATOR}{addr}{SEPARATOR}{port}")
}

pub fn make_address_node_id(host: &str, addr: &str) -> String {
    format!("{host}{SEPARATOR}{addr}")
}

pub fn make_process_node_id(host: &str, pid: &str) -> String {
    format!("{host}{SEPARATOR}{pid}")
}

pub fn make_host_node_id(host: &str) -> String {
    tagged(host, HOST_TAG)
}

pub fn make_container_node_id(container_id: &str) -> String {
    tagged(container_id, CONTAINER_TAG)
}

pub fn make_container_image_node_id(image_id: &str) -> String {
    tagged(image_id, CONTAINER_IMAGE_TAG)
}

pub fn make_pod_node_id(namespace: &str, name: &str) -> String {
    tagged(&format!("{namespace}/{name}"), POD_TAG)
}

pub fn make_service_node_id(namespace: &str, name: &str) -> String {
    tagged(&format!("{namespace}/{name}"), SERVICE_TAG)
}

pub fn make_overlay_node_id(peer: &str) -> String {
    tagged(peer, OVERLAY_TAG)
}

/// Build a pseudo node ID, e.g. `pseudo:10.0.0.1:80`.
pub fn make_pseudo_node_id<S: AsRef<str>>(parts: &[S]) -> String {
    let joined: Vec<&str> = parts.iter().map(|p| p.as_ref()).collect();
    format!("{PSEUDO_PREFIX}{}", joined.join(":"))
}

pub fn is_pseudo_node_id(id: &str) -> bool {
    id.starts_with(PSEUDO_PREFIX)
}

/// Split an endpoint node ID into `(host, addr, port)`.
pub fn parse_endpoint_node_id(id: &str) -> Option<(&str, &str, &str)> {
    let mut fields = id.splitn(3, SEPARATOR);
    let host = fields.next()?;
    let addr = fields.next()?;
    let port = fields.next()?;
    if port.contains(SEPARATOR) {
        return None;
    }
    Some((host, addr, port))
}

/// Split an address node ID into `(host, addr)`.
pub fn parse_address_node_id(id: &str) -> Option<(&str, &str)> {
    let (host, addr) = id.split_once(SEPARATOR)?;
    (!addr.contains(SEPARATOR)).then_some((host, addr))
}

/// Split a process node ID into `(host, pid)`.
pub fn parse_process_node_id(id: &str) -> Option<(&str, &str)> {
    parse_address_node_id(id)
}

pub fn parse_host_node_id(id: &str) -> Option<&str> {
    untag(id, HOST_TAG)
}

pub fn parse_container_node_id(id: &str) -> Option<&str> {
    untag(id, CONTAINER_TAG)
}

pub fn parse_container_image_node_id(id: &str) -> Option<&str> {
    untag(id, CONTAINER_IMAGE_TAG)
}

/// The `<ns>/<name>` part of a pod node ID.
pub fn parse_pod_node_id(id: &str) -> Option<&str> {
    untag(id, POD_TAG)
}

/// The `<ns>/<name>` part of a service node ID.
pub fn parse_service_node_id(id: &str) -> Option<&str> {
    untag(id, SERVICE_TAG)
}

pub fn parse_overlay_node_id(id: &str) -> Option<&str> {
    untag(id, OVERLAY_TAG)
}
