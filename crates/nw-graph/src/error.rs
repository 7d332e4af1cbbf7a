//! Graph-specific error types.

use nw_core::{FrameId, NodeId, ScopeId, SocketId};
use thiserror::Error;

use crate::graph::SocketDirection;

/// Result type for graph construction.
pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A reference to a node that doesn't exist.
    #[error("Node {node} does not exist")]
    UnknownNode { node: NodeId },

    /// A reference to a socket that doesn't exist.
    #[error("Socket {socket} does not exist")]
    UnknownSocket { socket: SocketId },

    /// A reference to a frame that doesn't exist.
    #[error("Frame {frame} does not exist")]
    UnknownFrame { frame: FrameId },

    /// A socket looked up by name on a node that has no such socket.
    #[error("Node '{node}' has no {direction} socket named '{name}'")]
    SocketNotFound {
        node: String,
        direction: &'static str,
        name: String,
    },

    /// A node's socket list and the socket's owner disagree.
    #[error("Socket {socket} is listed on node {node} but belongs elsewhere")]
    SocketNodeMismatch { socket: SocketId, node: NodeId },

    /// Link endpoints have the wrong directions.
    #[error("Link {from} -> {to} must run from an output to an input (got {from_dir} -> {to_dir})")]
    LinkDirection {
        from: SocketId,
        to: SocketId,
        from_dir: &'static str,
        to_dir: &'static str,
    },

    /// An input socket with more than one incoming link.
    #[error("Input socket {socket} on '{node}' already has an incoming link")]
    InputAlreadyLinked { socket: SocketId, node: String },

    /// A link from a node to itself.
    #[error("Link on '{node}' connects the node to itself")]
    SelfLoop { node: String },

    /// A scope pair whose nodes are not an entry and an exit.
    #[error("Scope {scope}: node {node} is not a matching scope boundary")]
    ScopeNodeKind { scope: ScopeId, node: NodeId },

    /// Entry and exit of a scope pair disagree on the scope kind.
    #[error("Scope {scope}: entry and exit are different scope kinds")]
    ScopeKindMismatch { scope: ScopeId },

    /// A boundary node referenced by more than one scope pair.
    #[error("Node {node} belongs to more than one scope pair")]
    NodeInMultipleScopes { node: NodeId },

    /// A scope boundary node that no pair references.
    #[error("Scope boundary node '{node}' is not paired")]
    UnpairedScopeBoundary { node: String },

    /// A node whose socket counts violate its kind's declared shape.
    #[error("Node '{node}' has {inputs} inputs and {outputs} outputs (expected {expected_inputs} and {expected_outputs})")]
    ShapeMismatch {
        node: String,
        inputs: usize,
        outputs: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },

    /// Two interface sockets in the same direction share a name.
    #[error("Interface declares {direction} '{name}' twice")]
    DuplicateInterfaceSocket {
        name: String,
        direction: &'static str,
    },
}

impl GraphError {
    pub(crate) fn socket_not_found(node: &str, direction: SocketDirection, name: &str) -> Self {
        GraphError::SocketNotFound {
            node: node.to_string(),
            direction: direction.as_str(),
            name: name.to_string(),
        }
    }
}
