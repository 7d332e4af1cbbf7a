//! Column assignment (horizontal flow).
//!
//! A node's column is the length of the longest chain of ordering edges
//! ending at it. Ordering edges are the graph's links as rewritten by
//! `Regions::ordering_edge`.

use nw_core::NodeId;
use nw_graph::Graph;

use crate::error::{LayoutError, LayoutResult};
use crate::regions::Regions;

/// Predecessor lists of the ordering DAG, indexed by node slot, each in
/// link declaration order.
pub(crate) fn ordering_predecessors(graph: &Graph, regions: &Regions) -> Vec<Vec<NodeId>> {
    let mut preds = vec![Vec::new(); graph.nodes().len()];
    for link in graph.links() {
        if let Some((source, target)) = regions.ordering_edge(graph, link.id) {
            if !preds[target.slot()].contains(&source) {
                preds[target.slot()].push(source);
            }
        }
    }
    preds
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Longest-path columns for every node, indexed by node slot.
///
/// Walks predecessors depth-first with an explicit stack so deep chains do
/// not exhaust the call stack; an in-progress predecessor means a cycle,
/// reported in link direction.
pub(crate) fn assign_columns(graph: &Graph, preds: &[Vec<NodeId>]) -> LayoutResult<Vec<u32>> {
    let n = graph.nodes().len();
    let mut column = vec![0u32; n];
    let mut mark = vec![Mark::Unvisited; n];

    for root in 0..n {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        // (node slot, index of the next predecessor to inspect)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        mark[root] = Mark::InProgress;

        while let Some(top) = stack.last_mut() {
            let v = top.0;
            if let Some(&p) = preds[v].get(top.1) {
                top.1 += 1;
                let p = p.slot();
                match mark[p] {
                    Mark::Done => {}
                    Mark::Unvisited => {
                        mark[p] = Mark::InProgress;
                        stack.push((p, 0));
                    }
                    Mark::InProgress => {
                        return Err(cycle_error(graph, &stack, p));
                    }
                }
            } else {
                column[v] = preds[v]
                    .iter()
                    .map(|p| column[p.slot()] + 1)
                    .max()
                    .unwrap_or(0);
                mark[v] = Mark::Done;
                stack.pop();
            }
        }
    }

    Ok(column)
}

/// Each stack entry is a predecessor of the one below it, so the cycle in
/// link direction runs from `p` down the stack back to `p`.
fn cycle_error(graph: &Graph, stack: &[(usize, usize)], p: usize) -> LayoutError {
    let start = stack.iter().position(|&(v, _)| v == p).unwrap_or(0);
    let label = |slot: usize| graph.nodes()[slot].label.clone();

    let mut cycle = vec![label(p)];
    cycle.extend(stack[start + 1..].iter().rev().map(|&(v, _)| label(v)));
    cycle.push(label(p));

    LayoutError::StructuralCycle {
        graph: graph.name().to_string(),
        cycle,
    }
}
