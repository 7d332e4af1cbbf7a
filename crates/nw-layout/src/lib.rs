//! nw-layout: automatic left-to-right layout for nodeweave graphs.
//!
//! The engine runs in five steps:
//! 1. Scope regions and loop-back links are identified.
//! 2. Columns are assigned by longest path over ordering edges.
//! 3. Rows are ordered by barycenter sweeps to reduce link crossings.
//! 4. Slots are turned into rectangles from node sizes.
//! 5. Frame boxes are derived bottom-up from their contents.
//!
//! Identical graphs always receive identical placements.

mod columns;
pub mod config;
pub mod error;
mod frames;
mod place;
mod regions;
mod rows;

pub use config::LayoutConfig;
pub use error::{LayoutError, LayoutResult};

use nw_core::timing::{self, Timer};
use nw_graph::Graph;

/// Summary of one layout run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutReport {
    /// Number of columns used.
    pub columns: usize,
    /// Link crossings between adjacent columns in the kept ordering.
    pub crossings: usize,
    /// Barycenter passes performed.
    pub passes: usize,
}

/// Lay out `graph` in place, overwriting any previous placements.
///
/// Fails without touching the graph when ordinary links form a cycle or the
/// frame hierarchy loops.
pub fn layout(graph: &mut Graph, config: &LayoutConfig) -> LayoutResult<LayoutReport> {
    let timer = Timer::start(&timing::LAYOUT);

    let regions = regions::Regions::compute(graph);
    let preds = columns::ordering_predecessors(graph, &regions);
    let column_of = columns::assign_columns(graph, &preds)?;
    let frame_order = frames::bottom_up_order(graph)?;
    let rows = rows::order_rows(graph, &column_of, &regions, config.crossing_passes);

    graph.clear_layout();
    place::assign_coordinates(graph, &rows.columns, config);
    frames::derive_bounds(graph, &frame_order, config.frame_padding);

    for (s, scope) in regions.scopes().iter().enumerate() {
        let span = regions
            .interior_nodes(s)
            .map(|n| column_of[n.slot()])
            .fold(None, |acc: Option<(u32, u32)>, c| match acc {
                Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
                None => Some((c, c)),
            });
        tracing::trace!(
            graph = graph.name(),
            scope = scope.kind.as_str(),
            entry = column_of[scope.entry.slot()],
            exit = column_of[scope.exit.slot()],
            interior = ?span,
            "scope region"
        );
    }

    let report = LayoutReport {
        columns: rows.columns.len(),
        crossings: rows.crossings,
        passes: rows.passes,
    };
    tracing::debug!(
        name = graph.name(),
        nodes = graph.nodes().len(),
        links = graph.links().len(),
        columns = report.columns,
        crossings = report.crossings,
        passes = report.passes,
        "laid out graph"
    );

    timer.finish(graph.name());
    Ok(report)
}
