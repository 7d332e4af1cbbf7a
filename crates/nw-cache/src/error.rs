//! Error types for the artifact cache.

use nw_graph::GraphError;
use nw_layout::LayoutError;
use thiserror::Error;

/// Result type for cache operations and builder bodies.
pub type CacheResult<T> = Result<T, CacheError>;

/// Why a named graph could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A builder requested, directly or through others, a graph that is
    /// still being built.
    #[error("Build cycle: {}", .chain.join(" -> "))]
    BuildCycle { chain: Vec<String> },

    /// A builder body gave up.
    #[error("Builder for '{name}' failed: {what}")]
    Builder { name: String, what: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

impl CacheError {
    pub fn builder(name: impl Into<String>, what: impl Into<String>) -> Self {
        Self::Builder {
            name: name.into(),
            what: what.into(),
        }
    }
}
