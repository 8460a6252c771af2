//! Report schema versions.

use std::fmt;

use crate::SCHEMA_VERSION;

/// Schema version information embedded in reports.
///
/// Probes and the aggregator are upgraded independently, so a report may
/// arrive from an older or newer probe. Merging keeps the greater version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    /// Major version - breaking changes increment this.
    pub major: u32,

    /// Minor version - backwards-compatible additions increment this.
    pub minor: u32,
}

impl SchemaVersion {
    /// Create a new schema version.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The current schema version used by this library.
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }

    /// Whether reports of this version read as the current schema.
    ///
    /// Minor versions only add fields, which older readers default.
    pub fn is_compatible(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_bump_stays_compatible() {
        assert!(SchemaVersion::new(SCHEMA_VERSION, 7).is_compatible());
        assert!(!SchemaVersion::new(SCHEMA_VERSION + 1, 0).is_compatible());
    }

    #[test]
    fn displays_as_major_dot_minor() {
        assert_eq!(SchemaVersion::new(2, 13).to_string(), "2.13");
    }

    #[test]
    fn versions_order_major_first() {
        assert!(SchemaVersion::new(1, 9) < SchemaVersion::new(2, 0));
        assert_eq!(
            SchemaVersion::new(1, 2).max(SchemaVersion::new(1, 3)),
            SchemaVersion::new(1, 3)
        );
    }
}
