//! Row assignment (vertical ordering within columns).
//!
//! Iterated barycenter heuristic: each node's key is the mean row of its
//! neighbors in the adjacent column, swept left-to-right then right-to-left.
//! Stops when a pass changes nothing or the budget runs out, and keeps the
//! ordering with the fewest crossings seen. Ties go to declaration order.

use std::cmp::Ordering;

use nw_core::NodeId;
use nw_graph::Graph;

use crate::regions::Regions;

/// Final node order per column.
#[derive(Debug, Clone)]
pub(crate) struct RowOrder {
    pub columns: Vec<Vec<NodeId>>,
    pub crossings: usize,
    pub passes: usize,
}

struct Neighbors {
    preds: Vec<Vec<NodeId>>,
    succs: Vec<Vec<NodeId>>,
}

impl Neighbors {
    fn of(graph: &Graph, regions: &Regions) -> Self {
        let n = graph.nodes().len();
        let mut preds = vec![Vec::new(); n];
        let mut succs = vec![Vec::new(); n];
        for link in graph.links() {
            if regions.is_loop_back(link.id) {
                continue;
            }
            preds[link.to_node.slot()].push(link.from_node);
            succs[link.from_node.slot()].push(link.to_node);
        }
        Self { preds, succs }
    }
}

pub(crate) fn order_rows(
    graph: &Graph,
    columns: &[u32],
    regions: &Regions,
    max_passes: usize,
) -> RowOrder {
    let column_count = columns.iter().max().map_or(0, |&c| c as usize + 1);
    let mut order: Vec<Vec<NodeId>> = vec![Vec::new(); column_count];
    for node in graph.nodes() {
        order[columns[node.id.slot()] as usize].push(node.id);
    }

    let neighbors = Neighbors::of(graph, regions);
    let mut pos = vec![0usize; columns.len()];
    for col in &order {
        refresh_positions(col, &mut pos);
    }

    let mut best = order.clone();
    let mut best_crossings = total_crossings(&order, columns, &neighbors.succs, &pos);
    let mut passes = 0;

    if column_count > 1 {
        for _ in 0..max_passes {
            passes += 1;
            let before = order.clone();

            for c in 1..column_count {
                sweep(&mut order, c, c - 1, &neighbors.preds, columns, &mut pos);
            }
            for c in (0..column_count - 1).rev() {
                sweep(&mut order, c, c + 1, &neighbors.succs, columns, &mut pos);
            }

            let crossings = total_crossings(&order, columns, &neighbors.succs, &pos);
            if crossings < best_crossings {
                best_crossings = crossings;
                best = order.clone();
            }
            if order == before {
                break;
            }
        }
    }

    RowOrder {
        columns: best,
        crossings: best_crossings,
        passes,
    }
}

fn refresh_positions(col: &[NodeId], pos: &mut [usize]) {
    for (row, node) in col.iter().enumerate() {
        pos[node.slot()] = row;
    }
}

/// Reorder column `c` by barycenters against column `reference`.
fn sweep(
    order: &mut [Vec<NodeId>],
    c: usize,
    reference: usize,
    adjacency: &[Vec<NodeId>],
    columns: &[u32],
    pos: &mut [usize],
) {
    let mut keyed: Vec<(f64, NodeId)> = order[c]
        .iter()
        .map(|&v| (barycenter(v, reference, adjacency, columns, pos), v))
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    order[c] = keyed.into_iter().map(|(_, v)| v).collect();
    refresh_positions(&order[c], pos);
}

/// Mean row of `v`'s neighbors in the reference column. Falls back to all
/// neighbors for long links, then to the node's current row.
fn barycenter(
    v: NodeId,
    reference: usize,
    adjacency: &[Vec<NodeId>],
    columns: &[u32],
    pos: &[usize],
) -> f64 {
    let all = &adjacency[v.slot()];
    let adjacent: Vec<usize> = all
        .iter()
        .filter(|u| columns[u.slot()] as usize == reference)
        .map(|u| pos[u.slot()])
        .collect();

    let rows: Vec<usize> = if adjacent.is_empty() {
        all.iter().map(|u| pos[u.slot()]).collect()
    } else {
        adjacent
    };

    if rows.is_empty() {
        pos[v.slot()] as f64
    } else {
        rows.iter().sum::<usize>() as f64 / rows.len() as f64
    }
}

/// Crossings between links joining adjacent columns.
fn total_crossings(
    order: &[Vec<NodeId>],
    columns: &[u32],
    succs: &[Vec<NodeId>],
    pos: &[usize],
) -> usize {
    let mut total = 0;
    for (c, col) in order.iter().enumerate() {
        let edges: Vec<(usize, usize)> = col
            .iter()
            .flat_map(|u| {
                succs[u.slot()]
                    .iter()
                    .filter(|v| columns[v.slot()] as usize == c + 1)
                    .map(|v| (pos[u.slot()], pos[v.slot()]))
            })
            .collect();

        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (a1, b1) = edges[i];
                let (a2, b2) = edges[j];
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    total += 1;
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{assign_columns, ordering_predecessors};
    use nw_graph::{GraphBuilder, SocketType};

    fn op(b: &mut GraphBuilder, label: &str) -> NodeId {
        let n = b.add_op("math", label);
        b.add_input(n, "A", SocketType::Float);
        b.add_output(n, "Result", SocketType::Float);
        n
    }

    fn rows_of(graph: &Graph) -> RowOrder {
        let regions = Regions::compute(graph);
        let preds = ordering_predecessors(graph, &regions);
        let columns = assign_columns(graph, &preds).unwrap();
        order_rows(graph, &columns, &regions, 8)
    }

    #[test]
    fn crossing_pair_is_untangled() {
        // a -> y, x -> b with b declared before y: initial order crosses.
        let mut bld = GraphBuilder::new("untangle");
        let a = op(&mut bld, "a");
        let x = op(&mut bld, "x");
        let b = op(&mut bld, "b");
        let y = op(&mut bld, "y");
        bld.connect(a, "Result", y, "A").unwrap();
        bld.connect(x, "Result", b, "A").unwrap();
        let graph = bld.build().unwrap();

        let rows = rows_of(&graph);
        assert_eq!(rows.crossings, 0);
        assert_eq!(rows.columns[0], vec![a, x]);
        assert_eq!(rows.columns[1], vec![y, b]);
    }

    #[test]
    fn independent_chains_keep_declaration_order() {
        let mut bld = GraphBuilder::new("chains");
        let a = op(&mut bld, "a");
        let b = op(&mut bld, "b");
        let x = op(&mut bld, "x");
        let y = op(&mut bld, "y");
        bld.connect(a, "Result", b, "A").unwrap();
        bld.connect(x, "Result", y, "A").unwrap();
        let graph = bld.build().unwrap();

        let rows = rows_of(&graph);
        assert_eq!(rows.columns, vec![vec![a, x], vec![b, y]]);
        assert_eq!(rows.crossings, 0);
        assert_eq!(rows.passes, 1);
    }

    #[test]
    fn single_column_needs_no_passes() {
        let mut bld = GraphBuilder::new("flat");
        op(&mut bld, "a");
        op(&mut bld, "b");
        let graph = bld.build().unwrap();

        let rows = rows_of(&graph);
        assert_eq!(rows.passes, 0);
        assert_eq!(rows.columns.len(), 1);
    }
}
