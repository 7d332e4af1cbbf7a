//! Error types for layout.

use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that make a graph impossible to lay out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Ordinary links form a loop that no scope pair accounts for.
    #[error("Graph '{graph}' has a link cycle outside any scope pair: {}", .cycle.join(" -> "))]
    StructuralCycle { graph: String, cycle: Vec<String> },

    /// A frame is its own ancestor.
    #[error("Graph '{graph}' has a frame nesting cycle: {}", .chain.join(" -> "))]
    FrameCycle { graph: String, chain: Vec<String> },

    /// Layout configuration could not be parsed or is out of range.
    #[error("Invalid layout config: {what}")]
    Config { what: String },
}
