//! Per-connection traffic counters.

use std::collections::BTreeMap;

/// Traffic observed on one edge.
///
/// Two probes usually see the same connection from opposite ends, so
/// [`EdgeMetadata::merge`] takes the per-field maximum: re-merging an
/// observation never inflates it. [`EdgeMetadata::flatten`] sums instead and
/// is used when rolling many distinct edges up into one node total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeMetadata {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub egress_packet_count: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub ingress_packet_count: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub egress_byte_count: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub ingress_byte_count: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub max_conn_count_tcp: Option<u64>,
}

fn combine(a: Option<u64>, b: Option<u64>, f: impl Fn(u64, u64) -> u64) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, b) => a.or(b),
    }
}

impl EdgeMetadata {
    pub fn is_empty(&self) -> bool {
        *self == EdgeMetadata::default()
    }

    /// Two observations of the same edge; every field keeps the larger value.
    pub fn merge(&self, other: &EdgeMetadata) -> EdgeMetadata {
        self.zip_with(other, u64::max)
    }

    /// Two distinct edges folded into one total; every field is summed.
    pub fn flatten(&self, other: &EdgeMetadata) -> EdgeMetadata {
        self.zip_with(other, u64::saturating_add)
    }

    fn zip_with(&self, other: &EdgeMetadata, f: impl Fn(u64, u64) -> u64) -> EdgeMetadata {
        let (a, b) = (self, other);
        EdgeMetadata {
            egress_packet_count: combine(a.egress_packet_count, b.egress_packet_count, &f),
            ingress_packet_count: combine(a.ingress_packet_count, b.ingress_packet_count, &f),
            egress_byte_count: combine(a.egress_byte_count, b.egress_byte_count, &f),
            ingress_byte_count: combine(a.ingress_byte_count, b.ingress_byte_count, &f),
            max_conn_count_tcp: combine(a.max_conn_count_tcp, b.max_conn_count_tcp, &f),
        }
    }

    /// The same edge seen from the other end.
    pub fn reversed(&self) -> EdgeMetadata {
        EdgeMetadata {
            egress_packet_count: self.ingress_packet_count,
            ingress_packet_count: self.egress_packet_count,
            egress_byte_count: self.ingress_byte_count,
            ingress_byte_count: self.egress_byte_count,
            max_conn_count_tcp: self.max_conn_count_tcp,
        }
    }
}

/// Edge metadata keyed by the peer node ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EdgeMetadatas(BTreeMap<String, EdgeMetadata>);

impl EdgeMetadatas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `edge` into whatever is recorded for `peer`.
    pub fn add(&mut self, peer: impl Into<String>, edge: EdgeMetadata) {
        let peer = peer.into();
        match self.0.get_mut(&peer) {
            Some(existing) => *existing = existing.merge(&edge),
            None => {
                self.0.insert(peer, edge);
            }
        }
    }

    pub fn lookup(&self, peer: &str) -> Option<&EdgeMetadata> {
        self.0.get(peer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EdgeMetadata)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&self, other: &EdgeMetadatas) -> EdgeMetadatas {
        let mut out = self.clone();
        for (peer, edge) in &other.0 {
            out.add(peer.clone(), *edge);
        }
        out
    }

    /// Sum of every edge.
    pub fn flatten(&self) -> EdgeMetadata {
        self.0
            .values()
            .fold(EdgeMetadata::default(), |acc, e| acc.flatten(e))
    }
}
