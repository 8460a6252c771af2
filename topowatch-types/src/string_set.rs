//! Sorted, deduplicated string sets and named groups of them.

use std::collections::BTreeMap;
use std::fmt;

/// An ordered, deduplicated set of strings.
///
/// Elements are kept sorted so that serialization is deterministic and
/// merging two sets is a linear walk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "Vec<String>", into = "Vec<String>")
)]
pub struct StringSet(Vec<String>);

impl StringSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a set holding a single element.
    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    /// Insert a value, keeping sort order. Returns false if it was present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        match self.0.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, value);
                true
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, value: impl Into<String>) -> Self {
        self.insert(value);
        self
    }

    /// Remove a value. Returns false if it was absent.
    pub fn remove(&mut self, value: &str) -> bool {
        match self.0.binary_search_by(|v| v.as_str().cmp(value)) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0
            .binary_search_by(|v| v.as_str().cmp(value))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Keep only the elements matching `f`.
    pub fn retain(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.0.retain(|v| f(v.as_str()));
    }

    /// Union of two sets.
    pub fn merge(&self, other: &StringSet) -> StringSet {
        if other.0.is_empty() {
            return self.clone();
        }
        if self.0.is_empty() {
            return other.clone();
        }

        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Less => {
                    out.push(self.0[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(other.0[j].clone());
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.push(self.0[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);
        StringSet(out)
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let values: Vec<String> = iter.into_iter().map(Into::into).collect();
        Self::from(values)
    }
}

impl From<Vec<String>> for StringSet {
    fn from(mut values: Vec<String>) -> Self {
        values.sort();
        values.dedup();
        Self(values)
    }
}

impl From<StringSet> for Vec<String> {
    fn from(set: StringSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for StringSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Named groups of string sets, e.g. a container's IP addresses.
///
/// Also used for node parents, keyed by topology name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Sets(BTreeMap<String, StringSet>);

impl Sets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `set` into the group stored under `key`.
    pub fn add(&mut self, key: impl Into<String>, set: StringSet) {
        let key = key.into();
        match self.0.get_mut(&key) {
            Some(existing) => *existing = existing.merge(&set),
            None => {
                self.0.insert(key, set);
            }
        }
    }

    /// Builder-style [`Sets::add`].
    pub fn with(mut self, key: impl Into<String>, set: StringSet) -> Self {
        self.add(key, set);
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&StringSet> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<StringSet> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StringSet)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Per-key union of both groups.
    pub fn merge(&self, other: &Sets) -> Sets {
        let mut out = self.clone();
        for (key, set) in &other.0 {
            out.add(key.clone(), set.clone());
        }
        out
    }
}
