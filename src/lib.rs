//! # topowatch
//!
//! Aggregator for topowatch probe reports.
//!
//! Probes on every host publish [`Report`]s describing what they observe.
//! This crate receives them from various sources (files, network streams,
//! in-process channels), keeps every report within a sliding window in a
//! [`Collector`], and serves their merge through the named topology views of
//! [`topowatch_render`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌──────────┐    ┌────────┐ │
//! │  │ source  │───▶│ collector │───▶│ registry │───▶│  JSON  │ │
//! │  │ (input) │    │ (window)  │    │ (render) │    │        │ │
//! │  └────▲────┘    └───────────┘    └──────────┘    └────────┘ │
//! │       │                                                     │
//! │       └── FileSource | StreamSource | ChannelSource         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Ties sources, the collector and the topology registry together
//! - **[`collector`]**: Windowed aggregation of reports, with change notification
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for file polling, TCP streams, and channel-based input
//! - **[`config`]**: Layered settings (defaults, file, environment)
//! - **[`data`]**: Duration parsing for settings
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Render the containers view from a report file written by a probe
//! topowatch --file report.json --topology containers
//!
//! # Follow a probe's TCP output
//! topowatch --connect localhost:4040 --watch
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use std::sync::Arc;
//! use topowatch::{App, Collector, FileSource};
//! use topowatch_render::TopologyRegistry;
//!
//! let mut app = App::new(Arc::new(Collector::default()), TopologyRegistry::default())
//!     .with_source(Box::new(FileSource::new("report.json")));
//! app.poll();
//! ```
//!
//! ### As a library with stream source (TCP, etc.)
//!
//! ```no_run
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use topowatch::{App, Collector, StreamSource};
//! use topowatch_render::TopologyRegistry;
//!
//! # tokio_test::block_on(async {
//! // Example with a cursor (in practice, use TcpStream)
//! let data = b"{}\n";
//! let stream = Cursor::new(data.to_vec());
//! let source = StreamSource::spawn(stream, "example");
//! let app = App::new(Arc::new(Collector::default()), TopologyRegistry::default())
//!     .with_source(Box::new(source));
//! # });
//! ```
//!
//! ### As a library with channel source (in-process probes)
//!
//! ```
//! use topowatch::ChannelSource;
//!
//! let (tx, source) = ChannelSource::create("local probe");
//! ```

pub mod app;
pub mod collector;
pub mod config;
pub mod data;
pub mod source;

// Re-export main types for convenience
pub use app::App;
pub use collector::{Collector, DEFAULT_WINDOW};
pub use config::Settings;
pub use source::{ChannelSource, DataSource, FileSource, StreamSource};
pub use topowatch_types::Report;
