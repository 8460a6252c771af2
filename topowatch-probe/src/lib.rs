//! # topowatch-probe
//!
//! Probe-side SDK for publishing topowatch reports.
//!
//! A probe runs on every host. Its [`Reporter`]s each describe a slice of
//! what they observe (processes, containers, connections), its [`Tagger`]s
//! annotate the merged result, and the probe publishes one [`Report`] per
//! interval to its [`Output`]s for the aggregator to collect.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use topowatch_probe::{FnReporter, HostTagger, Output, Probe};
//! use topowatch_types::{ids, keys, now_ms, Node, Report, PROCESS};
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = Probe::builder()
//!         .reporter(FnReporter::new("self", || {
//!             let pid = std::process::id().to_string();
//!             Ok(Report::builder()
//!                 .node(
//!                     PROCESS,
//!                     Node::new(ids::make_process_node_id("web-1", &pid))
//!                         .with_latest(keys::process::PID, now_ms(), pid),
//!                 )
//!                 .build())
//!         }))
//!         .tagger(HostTagger::new("web-1", "probe-1"))
//!         .output(Output::file("report.json"))
//!         .interval(Duration::from_secs(1))
//!         .build();
//!
//!     // Start background publishing (non-blocking)
//!     let handle = probe.start();
//!
//!     // ... your application runs ...
//!     # handle.stop();
//! }
//! ```
//!
//! ## Features
//!
//! - `tokio` (default): background publishing and channel output

mod error;
#[cfg(feature = "tokio")]
mod handle;
mod output;
mod probe;
mod reporter;
mod tagger;

pub use error::{ProbeError, Result};
#[cfg(feature = "tokio")]
pub use handle::PublishHandle;
pub use output::Output;
pub use probe::{Probe, ProbeBuilder};
pub use reporter::{FnReporter, Reporter};
pub use tagger::{HostTagger, Tagger};

// Re-export types for convenience
pub use topowatch_types::Report;
