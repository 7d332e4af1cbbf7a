//! Idempotent, name-keyed graph cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use nw_core::timing::{self, Timer};
use nw_graph::{Graph, GraphBuilder, Interface, InterfaceSignature};
use nw_layout::LayoutConfig;

use crate::error::{CacheError, CacheResult};
use crate::recipe::GraphRecipe;

/// One built graph and the signature of its interface.
#[derive(Debug, Clone)]
struct CacheEntry {
    graph: Arc<Graph>,
    signature: InterfaceSignature,
    builds: u32,
}

/// Request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// First builds of a name.
    pub misses: u64,
    /// Builds replacing an entry whose interface changed.
    pub rebuilds: u64,
}

/// Laid-out graphs keyed by logical name.
///
/// A request returns the stored graph while the caller's interface matches
/// the stored graph's interface, and builds (or rebuilds) it otherwise. Builder
/// bodies get the cache back so they can request the graphs they depend on.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: BTreeMap<String, CacheEntry>,
    in_progress: Vec<String>,
    layout: LayoutConfig,
    stats: CacheStats,
}

impl ArtifactCache {
    /// Empty cache using the default layout configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache laying out every graph with `layout`.
    pub fn with_layout(layout: LayoutConfig) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Return the graph stored under `name`, building it first if it is
    /// missing or its interface differs from `interface`.
    ///
    /// `build` receives a fresh builder with `interface` already declared,
    /// plus this cache. The entry is only replaced once the new graph has
    /// been populated, validated and laid out; on any error the previous
    /// entry stays in place.
    pub fn get_or_build<F>(
        &mut self,
        name: &str,
        interface: &Interface,
        build: F,
    ) -> CacheResult<Arc<Graph>>
    where
        F: FnOnce(&mut GraphBuilder, &mut ArtifactCache) -> CacheResult<()>,
    {
        if let Some(start) = self.in_progress.iter().position(|n| n == name) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(name.to_string());
            tracing::warn!(name, chain = %chain.join(" -> "), "build cycle");
            return Err(CacheError::BuildCycle { chain });
        }

        let signature = interface.signature();
        let previous = match self.entries.get(name) {
            Some(entry) if entry.signature == signature => {
                self.stats.hits += 1;
                tracing::trace!(name, "cache hit");
                return Ok(Arc::clone(&entry.graph));
            }
            Some(entry) => {
                tracing::debug!(
                    name,
                    old = %entry.signature,
                    new = %signature,
                    "interface changed, rebuilding"
                );
                Some(entry.builds)
            }
            None => None,
        };

        let graph = match self.build_fresh(name, interface, build) {
            Ok(graph) => graph,
            Err(err) => {
                tracing::debug!(name, error = %err, "build failed");
                return Err(err);
            }
        };

        match previous {
            Some(_) => self.stats.rebuilds += 1,
            None => self.stats.misses += 1,
        }
        let builds = previous.unwrap_or(0) + 1;

        // Later requests are judged against the interface the graph ended up
        // with, which the body may have replaced.
        let built = graph.interface().signature();
        if built != signature {
            tracing::debug!(
                name,
                declared = %signature,
                built = %built,
                "builder replaced its interface"
            );
        }
        let graph = Arc::new(graph);
        self.entries.insert(
            name.to_string(),
            CacheEntry {
                graph: Arc::clone(&graph),
                signature: built,
                builds,
            },
        );
        Ok(graph)
    }

    /// Populate, validate and lay out a new graph without touching entries.
    fn build_fresh<F>(&mut self, name: &str, interface: &Interface, build: F) -> CacheResult<Graph>
    where
        F: FnOnce(&mut GraphBuilder, &mut ArtifactCache) -> CacheResult<()>,
    {
        let mut builder = GraphBuilder::new(name);
        builder.set_interface(interface.clone());

        self.in_progress.push(name.to_string());
        let timer = Timer::start(&timing::BUILD);
        let populated = build(&mut builder, self);
        timer.finish(name);
        self.in_progress.pop();
        populated?;

        let mut graph = builder.build()?;
        let report = nw_layout::layout(&mut graph, &self.layout)?;

        tracing::debug!(
            name,
            nodes = graph.nodes().len(),
            links = graph.links().len(),
            columns = report.columns,
            crossings = report.crossings,
            "built graph"
        );
        Ok(graph)
    }

    /// `get_or_build` driven by a recipe.
    pub fn request<R: GraphRecipe + ?Sized>(&mut self, recipe: &R) -> CacheResult<Arc<Graph>> {
        let interface = recipe.interface();
        self.get_or_build(recipe.name(), &interface, |graph, cache| {
            recipe.populate(graph, cache)
        })
    }

    /// The stored graph, if any, regardless of interface.
    pub fn get(&self, name: &str) -> Option<Arc<Graph>> {
        self.entries.get(name).map(|e| Arc::clone(&e.graph))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// How many times `name` has been built (0 if never).
    pub fn build_count(&self, name: &str) -> u32 {
        self.entries.get(name).map_or(0, |e| e.builds)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Names currently being built, outermost first.
    pub fn in_progress(&self) -> &[String] {
        &self.in_progress
    }

    /// Drop the entry for `name` so the next request builds it again.
    /// Returns whether an entry was removed.
    pub fn invalidate(&mut self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            tracing::debug!(name, "invalidated");
        }
        removed
    }
}
