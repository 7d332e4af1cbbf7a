//! nw-core: stable foundation for nodeweave.
//!
//! Contains:
//! - ids (stable compact IDs for graph objects)
//! - geom (layout-space points and rectangles)
//! - timing (opt-in phase timers)

pub mod geom;
pub mod ids;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use geom::{Point, Rect};
pub use ids::*;
