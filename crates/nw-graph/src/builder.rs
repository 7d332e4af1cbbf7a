//! Incremental graph builder.

use nw_core::{FrameId, LinkId, NodeId, ScopeId, SocketId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{
    Frame, Graph, Link, Node, NodeKind, ScopeKind, ScopePair, Socket, SocketDirection,
    SocketType, Value,
};
use crate::interface::Interface;
use crate::validate;

/// Builder for constructing a graph incrementally.
///
/// Builder bodies declare nodes, sockets, links and frames here, then the
/// owner calls `build()` to validate and freeze it into an immutable `Graph`.
/// Links are recorded as-is and only checked in `build()`, so a body can
/// declare things in whatever order reads best.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    name: String,
    interface: Interface,
    nodes: Vec<Node>,
    sockets: Vec<Socket>,
    links: Vec<(SocketId, SocketId)>,
    frames: Vec<Frame>,
    scopes: Vec<ScopePair>,
}

impl GraphBuilder {
    /// Create a new empty builder for the graph cached under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Declare the graph's public parameters.
    ///
    /// Group input/output nodes mirror the interface at the time they are
    /// added, so declare it first.
    pub fn set_interface(&mut self, interface: Interface) {
        self.interface = interface;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Add a node of any kind and return its ID.
    ///
    /// Kinds with a declared shape get their sockets created here.
    pub fn add_node(&mut self, kind: NodeKind, label: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            kind: kind.clone(),
            label: label.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parent: None,
            placement: None,
        });

        if kind.is_reroute() {
            self.add_input(id, "Input", SocketType::Any);
            self.add_output(id, "Output", SocketType::Any);
        }
        id
    }

    /// Add an ordinary operation node.
    pub fn add_op(&mut self, tag: impl Into<String>, label: impl Into<String>) -> NodeId {
        self.add_node(NodeKind::Op(tag.into()), label)
    }

    /// Add a pass-through node.
    pub fn add_reroute(&mut self, label: impl Into<String>) -> NodeId {
        self.add_node(NodeKind::Reroute, label)
    }

    /// Add a node exposing the interface inputs as output sockets.
    pub fn add_group_input(&mut self) -> NodeId {
        let id = self.add_node(NodeKind::GroupInput, "Group Input");
        let inputs: Vec<_> = self
            .interface
            .inputs()
            .map(|s| (s.name.clone(), s.socket_type))
            .collect();
        for (name, ty) in inputs {
            self.add_output(id, name, ty);
        }
        id
    }

    /// Add a node collecting the interface outputs as input sockets.
    pub fn add_group_output(&mut self) -> NodeId {
        let id = self.add_node(NodeKind::GroupOutput, "Group Output");
        let outputs: Vec<_> = self
            .interface
            .outputs()
            .map(|s| (s.name.clone(), s.socket_type))
            .collect();
        for (name, ty) in outputs {
            self.add_input(id, name, ty);
        }
        id
    }

    /// Add an instance of another graph; its sockets mirror that graph's
    /// interface.
    pub fn add_group(&mut self, graph: &Graph, label: impl Into<String>) -> NodeId {
        let id = self.add_node(NodeKind::Group(graph.name().to_string()), label);
        for socket in graph.interface().sockets() {
            match socket.direction {
                SocketDirection::Input => {
                    self.add_input(id, socket.name.clone(), socket.socket_type);
                }
                SocketDirection::Output => {
                    self.add_output(id, socket.name.clone(), socket.socket_type);
                }
            }
        }
        id
    }

    /// Add a scope-boundary pair (entry and exit node) of the given kind.
    pub fn add_scope(&mut self, kind: ScopeKind, label: impl Into<String>) -> ScopePair {
        let label = label.into();
        let entry = self.add_node(NodeKind::ScopeEntry(kind), format!("{label} Input"));
        let exit = self.add_node(NodeKind::ScopeExit(kind), format!("{label} Output"));
        let id = self.pair_scope(entry, exit);
        self.scopes[id.slot()]
    }

    /// Pair two existing boundary nodes. Checked in `build()`.
    pub fn pair_scope(&mut self, entry: NodeId, exit: NodeId) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len() as u32);
        let kind = match self.nodes.get(entry.slot()).map(|n| &n.kind) {
            Some(NodeKind::ScopeEntry(kind)) => *kind,
            _ => ScopeKind::Repeat,
        };
        self.scopes.push(ScopePair {
            id,
            kind,
            entry,
            exit,
        });
        id
    }

    /// Add an input socket to a node.
    pub fn add_input(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        socket_type: SocketType,
    ) -> SocketId {
        self.add_socket(node, SocketDirection::Input, name.into(), socket_type)
    }

    /// Add an output socket to a node.
    pub fn add_output(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        socket_type: SocketType,
    ) -> SocketId {
        self.add_socket(node, SocketDirection::Output, name.into(), socket_type)
    }

    fn add_socket(
        &mut self,
        node: NodeId,
        direction: SocketDirection,
        name: String,
        socket_type: SocketType,
    ) -> SocketId {
        let id = SocketId::from_index(self.sockets.len() as u32);
        self.sockets.push(Socket {
            id,
            node,
            direction,
            name,
            socket_type,
            default: None,
        });
        // Unknown nodes are reported by build() via the socket's owner.
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            match direction {
                SocketDirection::Input => n.inputs.push(id),
                SocketDirection::Output => n.outputs.push(id),
            }
        }
        id
    }

    /// Set the literal value an unconnected input falls back to.
    pub fn set_default(&mut self, socket: SocketId, value: Value) {
        if let Some(s) = self.sockets.get_mut(socket.slot()) {
            s.default = Some(value);
        }
    }

    /// Connect an output socket to an input socket.
    pub fn link(&mut self, from: SocketId, to: SocketId) -> LinkId {
        let id = LinkId::from_index(self.links.len() as u32);
        self.links.push((from, to));
        id
    }

    /// Connect two sockets looked up by name.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        output: &str,
        to_node: NodeId,
        input: &str,
    ) -> GraphResult<LinkId> {
        let from = self.output(from_node, output)?;
        let to = self.input(to_node, input)?;
        Ok(self.link(from, to))
    }

    /// Input socket of `node` named `name`.
    pub fn input(&self, node: NodeId, name: &str) -> GraphResult<SocketId> {
        self.find_socket(node, SocketDirection::Input, name)
    }

    /// Output socket of `node` named `name`.
    pub fn output(&self, node: NodeId, name: &str) -> GraphResult<SocketId> {
        self.find_socket(node, SocketDirection::Output, name)
    }

    fn find_socket(
        &self,
        node: NodeId,
        direction: SocketDirection,
        name: &str,
    ) -> GraphResult<SocketId> {
        let n = self
            .nodes
            .get(node.slot())
            .ok_or(GraphError::UnknownNode { node })?;
        let list = match direction {
            SocketDirection::Input => &n.inputs,
            SocketDirection::Output => &n.outputs,
        };
        list.iter()
            .copied()
            .find(|s| self.sockets[s.slot()].name == name)
            .ok_or_else(|| GraphError::socket_not_found(&n.label, direction, name))
    }

    /// Add a frame and return its ID.
    pub fn add_frame(&mut self, label: impl Into<String>) -> FrameId {
        let id = FrameId::from_index(self.frames.len() as u32);
        self.frames.push(Frame {
            id,
            label: label.into(),
            parent: None,
            bounds: None,
        });
        id
    }

    /// Place a node inside a frame.
    pub fn set_parent(&mut self, node: NodeId, frame: FrameId) {
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            n.parent = Some(frame);
        }
    }

    /// Nest a frame inside another frame.
    pub fn set_frame_parent(&mut self, child: FrameId, parent: FrameId) {
        if let Some(f) = self.frames.get_mut(child.slot()) {
            f.parent = Some(parent);
        }
    }

    /// Rename a node (useful for post-construction adjustments).
    pub fn rename_node(&mut self, node: NodeId, label: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            n.label = label.into();
        }
    }

    /// Build and validate the graph, returning an immutable `Graph`.
    ///
    /// This performs validation, resolves link endpoints to their nodes and
    /// constructs compact adjacency lists.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_interface(&self.interface)?;
        validate::validate_structure(&self.nodes, &self.sockets, &self.frames)?;
        validate::validate_scopes(&self.nodes, &self.scopes)?;
        let links = validate::validate_links(&self.nodes, &self.sockets, &self.links)?;

        let (in_offsets, in_links) =
            Self::build_adjacency(self.nodes.len(), &links, |l| l.to_node);
        let (out_offsets, out_links) =
            Self::build_adjacency(self.nodes.len(), &links, |l| l.from_node);

        Ok(Graph {
            name: self.name,
            interface: self.interface,
            nodes: self.nodes,
            sockets: self.sockets,
            links,
            frames: self.frames,
            scopes: self.scopes,
            in_offsets,
            in_links,
            out_offsets,
            out_links,
        })
    }

    /// Build compact adjacency lists: for each node, the links keyed to it
    /// by `endpoint`, in link declaration order.
    fn build_adjacency(
        node_count: usize,
        links: &[Link],
        endpoint: impl Fn(&Link) -> NodeId,
    ) -> (Vec<usize>, Vec<LinkId>) {
        let mut per_node: Vec<Vec<LinkId>> = vec![Vec::new(); node_count];
        for link in links {
            per_node[endpoint(link).slot()].push(link.id);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut flat = Vec::with_capacity(links.len());
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}
