//! Networks the monitored hosts consider local.

use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use topowatch_types::{keys, Report};

/// The union of every host's local networks.
///
/// Addresses outside all of them belong to "the Internet".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalNetworks(Vec<IpNetwork>);

impl LocalNetworks {
    /// Collect the CIDRs recorded on the host nodes of `report`. Malformed
    /// entries are skipped.
    pub fn from_report(report: &Report) -> Self {
        let mut networks = Vec::new();
        for (_, node) in report.host.iter() {
            let Some(cidrs) = node.sets.lookup(keys::host::LOCAL_NETWORKS) else {
                continue;
            };
            for cidr in cidrs.iter() {
                let Some(network) = parse_network(cidr) else {
                    tracing::trace!(cidr, "ignoring malformed local network");
                    continue;
                };
                if !networks.contains(&network) {
                    networks.push(network);
                }
            }
        }
        Self(networks)
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.iter().any(|net| net.contains(ip))
    }

    /// Whether `addr` parses as an IP inside a local network.
    pub fn contains_addr(&self, addr: &str) -> bool {
        IpAddr::from_str(addr).is_ok_and(|ip| self.contains(ip))
    }

    pub fn networks(&self) -> &[IpNetwork] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a CIDR, normalizing the address to the network address.
fn parse_network(cidr: &str) -> Option<IpNetwork> {
    let parsed = IpNetwork::from_str(cidr).ok()?;
    IpNetwork::new(parsed.network(), parsed.prefix()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use topowatch_types::{Node, StringSet, HOST};

    #[test]
    fn collects_and_normalizes_host_networks() {
        let report = Report::builder()
            .node(HOST, Node::new("nonets;<host>"))
            .node(
                HOST,
                Node::new("foo;<host>").with_set(
                    keys::host::LOCAL_NETWORKS,
                    ["10.0.0.1/8", "192.168.1.1/24", "10.0.0.1/8", "badnet/33"]
                        .into_iter()
                        .collect::<StringSet>(),
                ),
            )
            .build();

        let nets = LocalNetworks::from_report(&report);
        let want: Vec<IpNetwork> = vec![
            IpNetwork::from_str("10.0.0.0/8").unwrap(),
            IpNetwork::from_str("192.168.1.0/24").unwrap(),
        ];
        assert_eq!(nets.networks(), want.as_slice());
    }

    #[test]
    fn membership() {
        let report = Report::builder()
            .node(
                HOST,
                Node::new("h;<host>")
                    .with_set(keys::host::LOCAL_NETWORKS, StringSet::single("10.10.10.0/24")),
            )
            .build();
        let nets = LocalNetworks::from_report(&report);

        assert!(nets.contains_addr("10.10.10.99"));
        assert!(!nets.contains_addr("8.8.8.8"));
        assert!(!nets.contains_addr("not-an-ip"));
    }
}
