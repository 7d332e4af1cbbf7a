//! nw-graph: node graph model for nodeweave.
//!
//! Provides:
//! - Core graph data structures (Node, Socket, Link, Frame, ScopePair, Graph)
//! - Incremental graph builder with validation
//! - Interface declarations and their staleness signatures
//!
//! # Example
//!
//! ```
//! use nw_graph::{GraphBuilder, SocketType};
//!
//! let mut builder = GraphBuilder::new("offset_curve");
//! let a = builder.add_op("curve_line", "Line");
//! let out = builder.add_output(a, "Curve", SocketType::Geometry);
//! let b = builder.add_op("set_position", "Offset");
//! let input = builder.add_input(b, "Geometry", SocketType::Geometry);
//! builder.link(out, input);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes().len(), 2);
//! assert_eq!(graph.links().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod interface;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{
    Frame, Graph, Link, Node, NodeKind, Placement, ScopeKind, ScopePair, Socket,
    SocketDirection, SocketType, Value,
};
pub use interface::{Interface, InterfaceSignature, InterfaceSocket};
