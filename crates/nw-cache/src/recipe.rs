//! Named builder routines.

use std::sync::Arc;

use nw_graph::{Graph, GraphBuilder, Interface};

use crate::cache::ArtifactCache;
use crate::error::CacheResult;

/// Something that knows how to build one named graph.
///
/// Implementors describe the graph's name and interface and fill in a
/// builder; the cache decides whether `populate` runs at all.
pub trait GraphRecipe {
    /// Logical name the graph is cached under.
    fn name(&self) -> &str;

    /// Interface the caller expects the graph to expose.
    fn interface(&self) -> Interface;

    /// Declare the graph's nodes and links. Dependencies are requested
    /// through `cache`.
    fn populate(&self, graph: &mut GraphBuilder, cache: &mut ArtifactCache) -> CacheResult<()>;
}

/// A builder body bound to its name and interface. See [`register`].
pub struct Registered<F> {
    name: String,
    interface: Interface,
    body: F,
}

/// Wrap a plain builder function so each call goes through the cache.
///
/// ```
/// use nw_cache::{register, ArtifactCache};
/// use nw_graph::{Interface, SocketType};
///
/// let line = register(
///     "line",
///     Interface::new().output("Curve", SocketType::Geometry),
///     |graph, _cache| {
///         let out = graph.add_group_output();
///         let node = graph.add_op("curve_line", "Line");
///         let curve = graph.add_output(node, "Curve", SocketType::Geometry);
///         graph.link(curve, graph.input(out, "Curve")?);
///         Ok(())
///     },
/// );
///
/// let mut cache = ArtifactCache::new();
/// let first = line.call(&mut cache).unwrap();
/// let second = line.call(&mut cache).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub fn register<F>(name: impl Into<String>, interface: Interface, body: F) -> Registered<F>
where
    F: Fn(&mut GraphBuilder, &mut ArtifactCache) -> CacheResult<()>,
{
    Registered {
        name: name.into(),
        interface,
        body,
    }
}

impl<F> Registered<F>
where
    F: Fn(&mut GraphBuilder, &mut ArtifactCache) -> CacheResult<()>,
{
    /// Fetch or build the graph. Exactly `cache.get_or_build(name,
    /// interface, body)`.
    pub fn call(&self, cache: &mut ArtifactCache) -> CacheResult<Arc<Graph>> {
        cache.get_or_build(&self.name, &self.interface, &self.body)
    }
}

impl<F> GraphRecipe for Registered<F>
where
    F: Fn(&mut GraphBuilder, &mut ArtifactCache) -> CacheResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interface(&self) -> Interface {
        self.interface.clone()
    }

    fn populate(&self, graph: &mut GraphBuilder, cache: &mut ArtifactCache) -> CacheResult<()> {
        (self.body)(graph, cache)
    }
}
