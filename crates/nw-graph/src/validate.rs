//! Graph validation logic.

use std::collections::HashSet;

use nw_core::{LinkId, NodeId, SocketId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Frame, Link, Node, NodeKind, ScopePair, Socket, SocketDirection};
use crate::interface::Interface;

/// Interface socket names must be unique per direction.
pub(crate) fn validate_interface(interface: &Interface) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for socket in interface.sockets() {
        if !seen.insert((socket.direction, socket.name.as_str())) {
            return Err(GraphError::DuplicateInterfaceSocket {
                name: socket.name.clone(),
                direction: socket.direction.as_str(),
            });
        }
    }
    Ok(())
}

/// Validate node/socket/frame references and declared node shapes.
pub(crate) fn validate_structure(
    nodes: &[Node],
    sockets: &[Socket],
    frames: &[Frame],
) -> GraphResult<()> {
    // Each socket must belong to an existing node
    for socket in sockets {
        if socket.node.slot() >= nodes.len() {
            return Err(GraphError::UnknownNode { node: socket.node });
        }
    }

    for node in nodes {
        // Socket lists must point back at this node with the right direction
        for (list, direction) in [
            (&node.inputs, SocketDirection::Input),
            (&node.outputs, SocketDirection::Output),
        ] {
            for &socket_id in list {
                let socket = sockets
                    .get(socket_id.slot())
                    .ok_or(GraphError::UnknownSocket { socket: socket_id })?;
                if socket.node != node.id || socket.direction != direction {
                    return Err(GraphError::SocketNodeMismatch {
                        socket: socket_id,
                        node: node.id,
                    });
                }
            }
        }

        if let Some((expected_inputs, expected_outputs)) = node.kind.declared_shape() {
            if node.inputs.len() != expected_inputs || node.outputs.len() != expected_outputs {
                return Err(GraphError::ShapeMismatch {
                    node: node.label.clone(),
                    inputs: node.inputs.len(),
                    outputs: node.outputs.len(),
                    expected_inputs,
                    expected_outputs,
                });
            }
        }

        if let Some(frame) = node.parent {
            if frame.slot() >= frames.len() {
                return Err(GraphError::UnknownFrame { frame });
            }
        }
    }

    // Frame parents must exist; acyclicity is checked by layout
    for frame in frames {
        if let Some(parent) = frame.parent {
            if parent.slot() >= frames.len() {
                return Err(GraphError::UnknownFrame { frame: parent });
            }
        }
    }

    Ok(())
}

/// Every boundary node is in exactly one well-formed pair.
pub(crate) fn validate_scopes(nodes: &[Node], scopes: &[ScopePair]) -> GraphResult<()> {
    let mut paired: HashSet<NodeId> = HashSet::new();

    for scope in scopes {
        let entry = nodes
            .get(scope.entry.slot())
            .ok_or(GraphError::UnknownNode { node: scope.entry })?;
        let exit = nodes
            .get(scope.exit.slot())
            .ok_or(GraphError::UnknownNode { node: scope.exit })?;

        let entry_kind = match entry.kind {
            NodeKind::ScopeEntry(kind) => kind,
            _ => {
                return Err(GraphError::ScopeNodeKind {
                    scope: scope.id,
                    node: entry.id,
                });
            }
        };
        let exit_kind = match exit.kind {
            NodeKind::ScopeExit(kind) => kind,
            _ => {
                return Err(GraphError::ScopeNodeKind {
                    scope: scope.id,
                    node: exit.id,
                });
            }
        };
        if entry_kind != exit_kind || entry_kind != scope.kind {
            return Err(GraphError::ScopeKindMismatch { scope: scope.id });
        }

        for node in [scope.entry, scope.exit] {
            if !paired.insert(node) {
                return Err(GraphError::NodeInMultipleScopes { node });
            }
        }
    }

    if let Some(node) = nodes
        .iter()
        .find(|n| n.kind.is_scope_boundary() && !paired.contains(&n.id))
    {
        return Err(GraphError::UnpairedScopeBoundary {
            node: node.label.clone(),
        });
    }

    Ok(())
}

/// Check raw links and resolve them to `Link`s with owning nodes.
pub(crate) fn validate_links(
    nodes: &[Node],
    sockets: &[Socket],
    raw: &[(SocketId, SocketId)],
) -> GraphResult<Vec<Link>> {
    let mut linked_inputs: HashSet<SocketId> = HashSet::new();
    let mut links = Vec::with_capacity(raw.len());

    for (i, &(from, to)) in raw.iter().enumerate() {
        let from_socket = sockets
            .get(from.slot())
            .ok_or(GraphError::UnknownSocket { socket: from })?;
        let to_socket = sockets
            .get(to.slot())
            .ok_or(GraphError::UnknownSocket { socket: to })?;

        if from_socket.direction != SocketDirection::Output
            || to_socket.direction != SocketDirection::Input
        {
            return Err(GraphError::LinkDirection {
                from,
                to,
                from_dir: from_socket.direction.as_str(),
                to_dir: to_socket.direction.as_str(),
            });
        }

        if from_socket.node == to_socket.node {
            return Err(GraphError::SelfLoop {
                node: nodes[from_socket.node.slot()].label.clone(),
            });
        }

        if !linked_inputs.insert(to) {
            return Err(GraphError::InputAlreadyLinked {
                socket: to,
                node: nodes[to_socket.node.slot()].label.clone(),
            });
        }

        links.push(Link {
            id: LinkId::from_index(i as u32),
            from,
            to,
            from_node: from_socket.node,
            to_node: to_socket.node,
        });
    }

    Ok(links)
}
