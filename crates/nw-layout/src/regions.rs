//! Scope-boundary regions.
//!
//! A region's interior is every node reachable from its entry without
//! passing the exit, from which the exit is reachable without passing the
//! entry. Links back into an entry from its exit or from its interior are
//! loop-backs: they close the iteration and carry no ordering.

use nw_core::{LinkId, NodeId};
use nw_graph::{Graph, ScopePair};

/// Interior membership of every scope pair plus loop-back link flags.
#[derive(Debug, Clone)]
pub(crate) struct Regions {
    scopes: Vec<ScopePair>,
    /// interior[s][node slot]
    interior: Vec<Vec<bool>>,
    interior_len: Vec<usize>,
    /// loop_back[link slot]
    loop_back: Vec<bool>,
}

impl Regions {
    pub(crate) fn compute(graph: &Graph) -> Self {
        let n = graph.nodes().len();
        let scopes = graph.scopes().to_vec();
        let mut interior = Vec::with_capacity(scopes.len());
        let mut interior_len = Vec::with_capacity(scopes.len());
        let mut loop_back = vec![false; graph.links().len()];

        for scope in &scopes {
            let forward = reach(graph, scope.entry, scope.exit, Direction::Forward);
            let backward = reach(graph, scope.exit, scope.entry, Direction::Backward);

            let inside: Vec<bool> = (0..n).map(|i| forward[i] && backward[i]).collect();
            interior_len.push(inside.iter().filter(|&&b| b).count());

            // Only the exit and the interior may feed back into the entry;
            // anything else reachable from the entry closes an ordinary cycle.
            for &link_id in graph.incoming(scope.entry) {
                let link = &graph.links()[link_id.slot()];
                if link.from_node == scope.exit || inside[link.from_node.slot()] {
                    loop_back[link_id.slot()] = true;
                }
            }
            interior.push(inside);
        }

        Self {
            scopes,
            interior,
            interior_len,
            loop_back,
        }
    }

    pub(crate) fn is_loop_back(&self, link: LinkId) -> bool {
        self.loop_back[link.slot()]
    }

    pub(crate) fn contains(&self, scope: usize, node: NodeId) -> bool {
        self.interior[scope][node.slot()]
    }

    /// Interior nodes of the `scope`-th pair, in declaration order.
    pub(crate) fn interior_nodes(&self, scope: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.interior[scope]
            .iter()
            .enumerate()
            .filter(|(_, inside)| **inside)
            .map(|(i, _)| NodeId::from_index(i as u32))
    }

    pub(crate) fn scopes(&self) -> &[ScopePair] {
        &self.scopes
    }

    /// Endpoints to use for ordering, or None for links that impose none.
    ///
    /// A link entering a region from outside constrains the region's entry
    /// instead of the interior node, and a link leaving a region constrains
    /// the exit. The outermost crossed region wins so nested interiors keep
    /// their private column space too.
    pub(crate) fn ordering_edge(&self, graph: &Graph, link: LinkId) -> Option<(NodeId, NodeId)> {
        if self.is_loop_back(link) {
            return None;
        }
        let l = &graph.links()[link.slot()];
        let (u, v) = (l.from_node, l.to_node);

        let entering = self.outermost(|s, pair| {
            self.contains(s, v) && !self.contains(s, u) && u != pair.entry
        });
        let leaving = self.outermost(|s, pair| {
            self.contains(s, u) && !self.contains(s, v) && v != pair.exit
        });

        let source = leaving.map_or(u, |s| self.scopes[s].exit);
        let target = entering.map_or(v, |s| self.scopes[s].entry);
        (source != target).then_some((source, target))
    }

    fn outermost(&self, matches: impl Fn(usize, &ScopePair) -> bool) -> Option<usize> {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(s, pair)| matches(*s, pair))
            .max_by(|(a, _), (b, _)| {
                self.interior_len[*a]
                    .cmp(&self.interior_len[*b])
                    // earlier declaration wins ties
                    .then_with(|| b.cmp(a))
            })
            .map(|(s, _)| s)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

/// Nodes reachable from `start` without stepping onto `stop` (or back onto
/// `start`). Neither endpoint is marked.
fn reach(graph: &Graph, start: NodeId, stop: NodeId, direction: Direction) -> Vec<bool> {
    let mut seen = vec![false; graph.nodes().len()];
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        let links = match direction {
            Direction::Forward => graph.outgoing(node),
            Direction::Backward => graph.incoming(node),
        };
        for &link_id in links {
            let link = &graph.links()[link_id.slot()];
            let next = match direction {
                Direction::Forward => link.to_node,
                Direction::Backward => link.from_node,
            };
            if next == start || next == stop || seen[next.slot()] {
                continue;
            }
            seen[next.slot()] = true;
            stack.push(next);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use nw_graph::{GraphBuilder, ScopeKind, SocketType};

    fn op(b: &mut GraphBuilder, label: &str) -> NodeId {
        let n = b.add_op("math", label);
        b.add_input(n, "A", SocketType::Float);
        b.add_input(n, "B", SocketType::Float);
        b.add_output(n, "Result", SocketType::Float);
        n
    }

    #[test]
    fn interior_excludes_outside_consumers() {
        let mut b = GraphBuilder::new("repeat");
        let pair = b.add_scope(ScopeKind::Repeat, "Repeat");
        let entry_out = b.add_output(pair.entry, "Value", SocketType::Float);
        let exit_in = b.add_input(pair.exit, "Value", SocketType::Float);
        let step = op(&mut b, "Step");
        let after = op(&mut b, "After");
        let exit_out = b.add_output(pair.exit, "Value", SocketType::Float);

        b.link(entry_out, b.input(step, "A").unwrap());
        b.link(b.output(step, "Result").unwrap(), exit_in);
        b.link(exit_out, b.input(after, "A").unwrap());
        let graph = b.build().unwrap();

        let regions = Regions::compute(&graph);
        assert!(regions.contains(0, step));
        assert!(!regions.contains(0, after));
        assert!(!regions.contains(0, pair.entry));
        assert!(!regions.contains(0, pair.exit));
        assert_eq!(regions.interior_nodes(0).collect::<Vec<_>>(), vec![step]);
    }

    #[test]
    fn exit_to_entry_link_is_loop_back() {
        let mut b = GraphBuilder::new("feedback");
        let pair = b.add_scope(ScopeKind::Repeat, "Repeat");
        let entry_in = b.add_input(pair.entry, "State", SocketType::Any);
        let exit_out = b.add_output(pair.exit, "State", SocketType::Any);
        let back = b.link(exit_out, entry_in);
        let graph = b.build().unwrap();

        let regions = Regions::compute(&graph);
        assert!(regions.is_loop_back(back));
        assert_eq!(regions.ordering_edge(&graph, back), None);
    }

    #[test]
    fn only_interior_and_exit_feed_back() {
        let mut b = GraphBuilder::new("feedback_sources");
        let pair = b.add_scope(ScopeKind::Repeat, "Repeat");
        let entry_in = b.add_input(pair.entry, "State", SocketType::Any);
        let entry_out = b.add_output(pair.entry, "State", SocketType::Any);
        let exit_in = b.add_input(pair.exit, "State", SocketType::Any);
        let step = op(&mut b, "Step");
        let dangling = op(&mut b, "Dangling");

        b.link(entry_out, b.input(step, "A").unwrap());
        b.link(b.output(step, "Result").unwrap(), exit_in);
        b.link(entry_out, b.input(dangling, "A").unwrap());
        let back = b.link(b.output(dangling, "Result").unwrap(), entry_in);
        let graph = b.build().unwrap();

        let regions = Regions::compute(&graph);
        assert!(regions.contains(0, step));
        assert!(!regions.contains(0, dangling));
        assert!(!regions.is_loop_back(back));
    }

    #[test]
    fn crossing_links_attach_to_boundary() {
        let mut b = GraphBuilder::new("crossing");
        let outside = op(&mut b, "Outside");
        let pair = b.add_scope(ScopeKind::Closure, "Closure");
        let entry_out = b.add_output(pair.entry, "Value", SocketType::Float);
        let exit_in = b.add_input(pair.exit, "Value", SocketType::Float);
        let inner = op(&mut b, "Inner");
        let consumer = op(&mut b, "Consumer");

        b.link(entry_out, b.input(inner, "A").unwrap());
        let into = b.link(b.output(outside, "Result").unwrap(), b.input(inner, "B").unwrap());
        b.link(b.output(inner, "Result").unwrap(), exit_in);
        let out_of = b.link(
            b.output(inner, "Result").unwrap(),
            b.input(consumer, "A").unwrap(),
        );
        let graph = b.build().unwrap();

        let regions = Regions::compute(&graph);
        assert_eq!(regions.ordering_edge(&graph, into), Some((outside, pair.entry)));
        assert_eq!(regions.ordering_edge(&graph, out_of), Some((pair.exit, consumer)));
    }
}
