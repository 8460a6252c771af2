//! Data source abstraction for receiving probe reports.
//!
//! This module provides a trait-based abstraction for receiving reports
//! from various sources (files written by probes, network streams, in-process
//! channels).

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

use topowatch_types::{Report, SchemaVersion};

/// Trait for receiving reports from various sources.
///
/// # Example
///
/// ```
/// use topowatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("report.json");
/// if let Some(report) = source.poll() {
///     println!("Got {} nodes", report.node_count());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next report.
    ///
    /// Returns `Some(report)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Report>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The error encountered by the last poll, if any.
    fn error(&self) -> Option<String>;
}

/// Check that `report` was written against the current schema.
///
/// Reports from a probe with a different major version are still used,
/// since serde defaults whatever fields they lack, but are logged.
pub(crate) fn check_version(report: &Report, source: &str) -> bool {
    let compatible = report.version.is_compatible();
    if !compatible {
        tracing::warn!(
            source,
            version = %report.version,
            current = %SchemaVersion::current(),
            "report written with an incompatible schema version"
        );
    }
    compatible
}
