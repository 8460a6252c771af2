//! Integer tallies that add up when merged.

use std::collections::BTreeMap;

/// A map from key to count; merging sums pointwise.
///
/// Renderers use counters to tally what they grouped together (processes
/// per name, containers per image). Summing is not idempotent, so probes do
/// not put counters into the reports they publish.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Counters(BTreeMap<String, u64>);

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the tally for `key`.
    pub fn add(&mut self, key: impl Into<String>, count: u64) {
        let slot = self.0.entry(key.into()).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Builder-style [`Counters::add`].
    pub fn with(mut self, key: impl Into<String>, count: u64) -> Self {
        self.add(key, count);
        self
    }

    pub fn lookup(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&self, other: &Counters) -> Counters {
        let mut out = self.clone();
        for (key, count) in &other.0 {
            out.add(key.clone(), *count);
        }
        out
    }
}
