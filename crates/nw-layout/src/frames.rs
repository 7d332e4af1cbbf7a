//! Frame bounds, derived bottom-up from laid-out members.

use std::collections::HashSet;

use nw_core::{FrameId, Rect};
use nw_graph::Graph;

use crate::error::{LayoutError, LayoutResult};

/// Frames ordered children-before-parents.
///
/// Walks each frame's parent chain with a visited set; meeting a frame twice
/// on one walk means the parent relation has a cycle.
pub(crate) fn bottom_up_order(graph: &Graph) -> LayoutResult<Vec<FrameId>> {
    let frames = graph.frames();
    let mut depth = Vec::with_capacity(frames.len());

    for frame in frames {
        let mut seen: HashSet<FrameId> = HashSet::new();
        let mut chain = vec![frame.id];
        seen.insert(frame.id);
        let mut current = frame.parent;
        while let Some(parent) = current {
            chain.push(parent);
            if !seen.insert(parent) {
                // Report only the loop, not the frames leading into it.
                let start = chain.iter().position(|&f| f == parent).unwrap_or(0);
                return Err(LayoutError::FrameCycle {
                    graph: graph.name().to_string(),
                    chain: chain[start..]
                        .iter()
                        .map(|f| frames[f.slot()].label.clone())
                        .collect(),
                });
            }
            current = frames[parent.slot()].parent;
        }
        depth.push((chain.len() - 1, frame.id));
    }

    // Deepest first; declaration order among equals.
    depth.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(depth.into_iter().map(|(_, id)| id).collect())
}

/// Each frame's box is the union of its nodes' and child frames' boxes,
/// grown by `padding`. Frames with nothing inside get no box.
pub(crate) fn derive_bounds(graph: &mut Graph, order: &[FrameId], padding: f64) {
    for &frame in order {
        let nodes = graph
            .frame_nodes(frame)
            .filter_map(|n| graph.nodes()[n.slot()].placement.map(|p| p.rect));
        let children = graph
            .child_frames(frame)
            .filter_map(|f| graph.frames()[f.slot()].bounds);

        let union = nodes
            .chain(children)
            .reduce(|acc, r| acc.union(&r))
            .map(|r: Rect| r.padded(padding));

        graph.set_frame_bounds(frame, union);
    }
}
