//! Sources of reports on the probe side.

use std::fmt;

use topowatch_types::Report;

use crate::error::Result;

/// Produces a report describing what it observes right now.
///
/// A probe asks each of its reporters for a report on every tick and merges
/// the results, so reporters only describe their own slice of the host
/// (processes, containers, connections) and never need to coordinate.
///
/// # Example
///
/// ```rust
/// use topowatch_probe::{ProbeError, Reporter};
/// use topowatch_types::{ids, keys, Node, Report, PROCESS};
///
/// struct SelfReporter;
///
/// impl Reporter for SelfReporter {
///     fn name(&self) -> &str {
///         "self"
///     }
///
///     fn report(&self) -> Result<Report, ProbeError> {
///         let pid = std::process::id().to_string();
///         Ok(Report::builder()
///             .node(
///                 PROCESS,
///                 Node::new(ids::make_process_node_id("localhost", &pid))
///                     .with_latest(keys::process::PID, topowatch_types::now_ms(), pid),
///             )
///             .build())
///     }
/// }
///
/// assert_eq!(SelfReporter.report().unwrap().process.len(), 1);
/// ```
pub trait Reporter: Send + Sync {
    /// Used in logs and errors.
    fn name(&self) -> &str;

    fn report(&self) -> Result<Report>;
}

/// A [`Reporter`] backed by a closure.
pub struct FnReporter<F> {
    name: String,
    report: F,
}

impl<F> FnReporter<F>
where
    F: Fn() -> Result<Report> + Send + Sync,
{
    pub fn new(name: impl Into<String>, report: F) -> Self {
        Self {
            name: name.into(),
            report,
        }
    }
}

impl<F> Reporter for FnReporter<F>
where
    F: Fn() -> Result<Report> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn report(&self) -> Result<Report> {
        (self.report)()
    }
}

impl<F> fmt::Debug for FnReporter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReporter").field("name", &self.name).finish()
    }
}
