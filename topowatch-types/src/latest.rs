//! Last-writer-wins maps.

use std::borrow::Borrow;
use std::collections::BTreeMap;

/// One timestamped cell of a [`LatestMap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatestEntry<V> {
    /// Milliseconds since the Unix epoch at which the value was observed.
    pub timestamp: u64,
    pub value: V,
}

impl<V: Ord> LatestEntry<V> {
    /// Whether `self` should replace `other` in a merge.
    ///
    /// Later timestamps win; equal timestamps fall back to the value order so
    /// that the outcome does not depend on argument order.
    fn supersedes(&self, other: &LatestEntry<V>) -> bool {
        (self.timestamp, &self.value) > (other.timestamp, &other.value)
    }
}

/// A map of last-writer-wins cells.
///
/// Node metadata is a `LatestMap<String, String>` (see [`Metadata`]): every
/// field is observed independently and the most recent observation wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LatestMap<K: Ord, V> {
    entries: BTreeMap<K, LatestEntry<V>>,
}

/// Node metadata: string fields with last-writer-wins semantics.
pub type Metadata = LatestMap<String, String>;

impl<K: Ord, V> Default for LatestMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V: Ord + Clone> LatestMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `key` as observed at `timestamp`.
    ///
    /// An older observation than the one already held is ignored.
    pub fn set(&mut self, key: K, timestamp: u64, value: V) {
        let entry = LatestEntry { timestamp, value };
        match self.entries.get_mut(&key) {
            Some(existing) if !entry.supersedes(existing) => {}
            Some(existing) => *existing = entry,
            None => {
                self.entries.insert(key, entry);
            }
        }
    }

    /// Builder-style [`LatestMap::set`].
    pub fn with(mut self, key: K, timestamp: u64, value: V) -> Self {
        self.set(key, timestamp, value);
        self
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn lookup_entry<Q>(&self, key: &Q) -> Option<&LatestEntry<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, e)| (k, &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per key, keep the later observation.
    pub fn merge(&self, other: &LatestMap<K, V>) -> LatestMap<K, V> {
        if other.entries.is_empty() {
            return self.clone();
        }

        let mut out = self.clone();
        for (key, entry) in &other.entries {
            match out.entries.get_mut(key) {
                Some(existing) => {
                    if entry.supersedes(existing) {
                        *existing = entry.clone();
                    }
                }
                None => {
                    out.entries.insert(key.clone(), entry.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(entries: &[(&str, u64, &str)]) -> Metadata {
        entries.iter().fold(Metadata::new(), |m, (k, ts, v)| {
            m.with(k.to_string(), *ts, v.to_string())
        })
    }

    #[test]
    fn later_timestamp_wins() {
        let old = meta(&[("state", 1, "running")]);
        let new = meta(&[("state", 2, "stopped")]);

        assert_eq!(old.merge(&new).lookup("state").map(String::as_str), Some("stopped"));
        assert_eq!(new.merge(&old).lookup("state").map(String::as_str), Some("stopped"));
    }

    #[test]
    fn equal_timestamps_tie_break_is_order_independent() {
        let x = meta(&[("k", 5, "x")]);
        let y = meta(&[("k", 5, "y")]);

        assert_eq!(x.merge(&y), y.merge(&x));
        assert_eq!(x.merge(&y).lookup("k").map(String::as_str), Some("y"));
    }

    #[test]
    fn disjoint_keys_are_unioned() {
        let a = meta(&[("pid", 1, "2")]);
        let b = meta(&[("name", 1, "curl")]);

        let merged = a.merge(&b);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains_key("pid"));
        assert!(merged.contains_key("name"));
    }

    #[test]
    fn set_ignores_stale_observation() {
        let mut m = meta(&[("state", 10, "running")]);
        m.set("state".to_string(), 3, "created".to_string());
        assert_eq!(m.lookup("state").map(String::as_str), Some("running"));
        assert_eq!(m.lookup_entry("state").map(|e| e.timestamp), Some(10));
    }

    #[test]
    fn merge_is_idempotent() {
        let m = meta(&[("a", 1, "1"), ("b", 2, "2")]);
        assert_eq!(m.merge(&m), m);
    }
}
