//! Core graph data structures.

use nw_core::{FrameId, LinkId, NodeId, Rect, ScopeId, SocketId};

use crate::interface::Interface;

/// Direction of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    /// Receives at most one link.
    Input,
    /// May fan out to any number of links.
    Output,
}

impl SocketDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SocketDirection::Input => "input",
            SocketDirection::Output => "output",
        }
    }
}

/// Data type carried by a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    Float,
    Int,
    Bool,
    Vector,
    Geometry,
    String,
    /// Accepts anything; used by reroutes and scope items of unknown type.
    Any,
}

impl SocketType {
    pub fn as_str(self) -> &'static str {
        match self {
            SocketType::Float => "float",
            SocketType::Int => "int",
            SocketType::Bool => "bool",
            SocketType::Vector => "vector",
            SocketType::Geometry => "geometry",
            SocketType::String => "string",
            SocketType::Any => "any",
        }
    }
}

/// Literal default value of an unconnected input.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Vector([f64; 3]),
    String(String),
}

/// Kind of a scope-boundary region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Bounded iteration (repeat input / repeat output).
    Repeat,
    /// Parameterized sub-procedure (closure input / closure output).
    Closure,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::Repeat => "repeat",
            ScopeKind::Closure => "closure",
        }
    }
}

/// The operation a node performs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Ordinary operation identified by its type tag.
    Op(String),
    /// Pass-through node: one input, one output, identity semantics.
    Reroute,
    /// Entry of a scope-boundary pair.
    ScopeEntry(ScopeKind),
    /// Exit of a scope-boundary pair.
    ScopeExit(ScopeKind),
    /// Exposes the graph's interface inputs as outputs.
    GroupInput,
    /// Collects the graph's interface outputs.
    GroupOutput,
    /// Instance of another cached graph, by logical name.
    Group(String),
}

impl NodeKind {
    /// String identifier of the operation kind.
    pub fn type_tag(&self) -> &str {
        match self {
            NodeKind::Op(tag) => tag,
            NodeKind::Reroute => "reroute",
            NodeKind::ScopeEntry(ScopeKind::Repeat) => "repeat_input",
            NodeKind::ScopeEntry(ScopeKind::Closure) => "closure_input",
            NodeKind::ScopeExit(ScopeKind::Repeat) => "repeat_output",
            NodeKind::ScopeExit(ScopeKind::Closure) => "closure_output",
            NodeKind::GroupInput => "group_input",
            NodeKind::GroupOutput => "group_output",
            NodeKind::Group(_) => "group",
        }
    }

    pub fn is_reroute(&self) -> bool {
        matches!(self, NodeKind::Reroute)
    }

    pub fn is_scope_boundary(&self) -> bool {
        matches!(self, NodeKind::ScopeEntry(_) | NodeKind::ScopeExit(_))
    }

    /// Fixed (inputs, outputs) socket counts, for kinds that have one.
    pub fn declared_shape(&self) -> Option<(usize, usize)> {
        match self {
            NodeKind::Reroute => Some((1, 1)),
            _ => None,
        }
    }
}

/// A typed connection point on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    pub id: SocketId,
    pub node: NodeId,
    pub direction: SocketDirection,
    pub name: String,
    pub socket_type: SocketType,
    pub default: Option<Value>,
}

/// Layout result for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub column: u32,
    pub row: u32,
    pub rect: Rect,
}

/// A typed unit of computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub inputs: Vec<SocketId>,
    pub outputs: Vec<SocketId>,
    pub parent: Option<FrameId>,
    pub placement: Option<Placement>,
}

/// A directed edge from an output socket to an input socket.
///
/// Owning nodes are resolved when the graph is built so layout never has
/// to chase socket ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub from: SocketId,
    pub to: SocketId,
    pub from_node: NodeId,
    pub to_node: NodeId,
}

/// A grouping container. Its bounds are derived by layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    pub label: String,
    pub parent: Option<FrameId>,
    pub bounds: Option<Rect>,
}

/// An entry/exit node pair delimiting a repeat or closure region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopePair {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub entry: NodeId,
    pub exit: NodeId,
}

/// The graph: a validated collection of nodes, sockets, links, frames and
/// scope pairs, plus the interface it was built for.
///
/// Structure is frozen once built. Only layout results (node placements and
/// frame bounds) can be written afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub(crate) name: String,
    pub(crate) interface: Interface,
    pub(crate) nodes: Vec<Node>,
    pub(crate) sockets: Vec<Socket>,
    pub(crate) links: Vec<Link>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) scopes: Vec<ScopePair>,

    /// Offsets for node->incoming links: node i's links are in
    /// in_links[in_offsets[i]..in_offsets[i+1]], in link declaration order.
    pub(crate) in_offsets: Vec<usize>,
    pub(crate) in_links: Vec<LinkId>,

    /// Same layout for outgoing links.
    pub(crate) out_offsets: Vec<usize>,
    pub(crate) out_links: Vec<LinkId>,
}

impl Graph {
    /// Logical name the graph is cached under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public parameters of the graph.
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn sockets(&self) -> &[Socket] {
        &self.sockets
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn scopes(&self) -> &[ScopePair] {
        &self.scopes
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.sockets.get(id.slot())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.slot())
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id.slot())
    }

    /// Links whose target is `node`.
    pub fn incoming(&self, node: NodeId) -> &[LinkId] {
        Self::adjacent(&self.in_offsets, &self.in_links, node)
    }

    /// Links whose source is `node`.
    pub fn outgoing(&self, node: NodeId) -> &[LinkId] {
        Self::adjacent(&self.out_offsets, &self.out_links, node)
    }

    fn adjacent<'a>(offsets: &[usize], flat: &'a [LinkId], node: NodeId) -> &'a [LinkId] {
        let idx = node.slot();
        if idx + 1 >= offsets.len() {
            return &[];
        }
        &flat[offsets[idx]..offsets[idx + 1]]
    }

    /// Input socket of `node` with the given name.
    pub fn input(&self, node: NodeId, name: &str) -> Option<SocketId> {
        let node = self.node(node)?;
        node.inputs
            .iter()
            .copied()
            .find(|&s| self.sockets[s.slot()].name == name)
    }

    /// Output socket of `node` with the given name.
    pub fn output(&self, node: NodeId, name: &str) -> Option<SocketId> {
        let node = self.node(node)?;
        node.outputs
            .iter()
            .copied()
            .find(|&s| self.sockets[s.slot()].name == name)
    }

    /// First node carrying `label`.
    pub fn find_node(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.label == label).map(|n| n.id)
    }

    /// Nodes whose direct parent is `frame`.
    pub fn frame_nodes(&self, frame: FrameId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.parent == Some(frame))
            .map(|n| n.id)
    }

    /// Frames whose direct parent is `frame`.
    pub fn child_frames(&self, frame: FrameId) -> impl Iterator<Item = FrameId> + '_ {
        self.frames
            .iter()
            .filter(move |f| f.parent == Some(frame))
            .map(|f| f.id)
    }

    /// The scope pair `node` opens or closes, if any.
    pub fn scope_of(&self, node: NodeId) -> Option<&ScopePair> {
        self.scopes
            .iter()
            .find(|s| s.entry == node || s.exit == node)
    }

    /// True once every node has a placement.
    pub fn is_laid_out(&self) -> bool {
        self.nodes.iter().all(|n| n.placement.is_some())
    }

    /// Record the layout result for a node.
    pub fn set_placement(&mut self, node: NodeId, placement: Placement) {
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            n.placement = Some(placement);
        }
    }

    /// Record the derived bounds of a frame.
    pub fn set_frame_bounds(&mut self, frame: FrameId, bounds: Option<Rect>) {
        if let Some(f) = self.frames.get_mut(frame.slot()) {
            f.bounds = bounds;
        }
    }

    /// Forget all layout results.
    pub fn clear_layout(&mut self) {
        for node in &mut self.nodes {
            node.placement = None;
        }
        for frame in &mut self.frames {
            frame.bounds = None;
        }
    }
}
