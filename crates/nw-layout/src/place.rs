//! Coordinate assignment: (column, row) slots to editor-space rectangles.

use nw_core::{NodeId, Rect};
use nw_graph::{Graph, Node, Placement};

use crate::config::LayoutConfig;

/// Visual size of a node. Reroutes have zero width.
pub(crate) fn node_size(node: &Node, config: &LayoutConfig) -> (f64, f64) {
    if node.kind.is_reroute() {
        return (0.0, config.reroute_size);
    }
    let sockets = (node.inputs.len() + node.outputs.len()).max(1);
    (
        config.node_width,
        config.header_height + config.socket_height * sockets as f64,
    )
}

/// Left edge of every column. A column is as wide as its widest node, so a
/// column of reroutes only advances by `reroute_gap`.
pub(crate) fn column_offsets(graph: &Graph, rows: &[Vec<NodeId>], config: &LayoutConfig) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(rows.len());
    let mut x = 0.0;
    for col in rows {
        offsets.push(x);
        let width = col
            .iter()
            .map(|id| node_size(&graph.nodes()[id.slot()], config).0)
            .fold(0.0_f64, f64::max);
        x += if width > 0.0 {
            width + config.column_gap
        } else {
            config.reroute_gap
        };
    }
    offsets
}

/// Write a placement for every node. Rows stack downward from y = 0.
pub(crate) fn assign_coordinates(graph: &mut Graph, rows: &[Vec<NodeId>], config: &LayoutConfig) {
    let offsets = column_offsets(graph, rows, config);

    for (c, col) in rows.iter().enumerate() {
        let mut y = 0.0;
        for (r, &id) in col.iter().enumerate() {
            let (width, height) = node_size(&graph.nodes()[id.slot()], config);
            graph.set_placement(
                id,
                Placement {
                    column: c as u32,
                    row: r as u32,
                    rect: Rect::new(offsets[c], y, width, height),
                },
            );
            y += height + config.row_gap;
        }
    }
}
