//! # topowatch-render
//!
//! Turns merged reports into browsable topology graphs.
//!
//! A [`Renderer`] is a pure function from a [`Report`](topowatch_types::Report)
//! to [`RenderableNodes`]. Views are built by wrapping renderers in one
//! another:
//!
//! - [`TopologySelector`] projects one report topology 1:1
//! - [`Map`] regroups nodes under new IDs (processes into containers, ...)
//! - [`Filter`] and [`FilterUnconnected`] drop nodes and prune what they orphan
//! - [`Reduce`] unions several renderers
//! - [`Memoise`] caches a renderer per report in a shared [`RenderCache`]
//!
//! The built-in views live in [`Topologies`] and are served by name from a
//! [`TopologyRegistry`]; [`detailed`] projects single nodes into display
//! tables.
//!
//! ## Quick Start
//!
//! ```rust
//! use topowatch_render::{registry, TopologyRegistry};
//! use topowatch_types::Report;
//!
//! let registry = TopologyRegistry::default();
//! let report = Report::new();
//!
//! let containers = registry.render_topology(registry::CONTAINERS, &report, false).unwrap();
//! assert!(containers.is_empty());
//! assert!(registry.render_topology("nope", &report, false).is_err());
//! ```
//!
//! ## Features
//!
//! - `test-fixtures`: exposes [`fixture`], a sample client/server report

pub mod detailed;
mod error;
mod filter;
mod localnets;
mod map;
pub mod mapping;
mod memoise;
mod process_tree;
pub mod registry;
mod renderable;
mod renderer;
mod selector;
mod topologies;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixture;

pub use error::{RenderError, Result};
pub use filter::{
    filter_noop, filter_pseudo, filter_stopped, filter_system, filter_unconnected, Filter,
    FilterFn, FilterUnconnected,
};
pub use localnets::LocalNetworks;
pub use map::{Map, MapContext, MapFn};
pub use memoise::{Memoise, RenderCache, DEFAULT_CACHE_SIZE};
pub use process_tree::ProcessTree;
pub use registry::{TopologyDesc, TopologyRegistry, TopologySummary};
pub use renderable::{RenderableNode, RenderableNodes};
pub use renderer::{
    render_with, Decorated, Decorator, Reduce, RenderFn, Renderer, SharedRenderer, Stats,
};
pub use selector::{
    TopologySelector, SELECT_ADDRESS, SELECT_CONTAINER, SELECT_CONTAINER_IMAGE, SELECT_ENDPOINT,
    SELECT_HOST, SELECT_POD, SELECT_PROCESS, SELECT_SERVICE,
};
pub use topologies::Topologies;
