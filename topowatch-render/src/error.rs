//! Error types for topology lookups.

use thiserror::Error;

/// Errors surfaced to callers resolving topologies and nodes by name.
///
/// Rendering itself never fails; these only describe lookups of things that
/// do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unknown topology: {0}")]
    UnknownTopology(String),

    #[error("node {id} not found in topology {topology}")]
    UnknownNode { topology: String, id: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;
