//! Integration tests for the artifact cache and registration wrapper.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::Arc;

use nw_cache::{register, ArtifactCache, CacheError, CacheResult, GraphRecipe};
use nw_graph::{Graph, GraphBuilder, GraphError, Interface, SocketType};
use nw_layout::LayoutConfig;
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn geometry_io() -> Interface {
    Interface::new()
        .input("Geometry", SocketType::Geometry)
        .output("Geometry", SocketType::Geometry)
}

/// Group Input -> <tag> -> Group Output.
fn passthrough(graph: &mut GraphBuilder, tag: &str) -> CacheResult<()> {
    let input = graph.add_group_input();
    let output = graph.add_group_output();
    let node = graph.add_op(tag, tag);
    graph.add_input(node, "Geometry", SocketType::Geometry);
    graph.add_output(node, "Geometry", SocketType::Geometry);
    graph.connect(input, "Geometry", node, "Geometry")?;
    graph.connect(node, "Geometry", output, "Geometry")?;
    Ok(())
}

/// Uses the named utility graph as a group node.
fn uses_utility(graph: &mut GraphBuilder, cache: &mut ArtifactCache) -> CacheResult<()> {
    let utility = cache.get_or_build("smooth", &geometry_io(), |g, _| passthrough(g, "smooth"))?;
    let input = graph.add_group_input();
    let output = graph.add_group_output();
    let group = graph.add_group(&utility, "Smooth");
    graph.connect(input, "Geometry", group, "Geometry")?;
    graph.connect(group, "Geometry", output, "Geometry")?;
    Ok(())
}

#[test]
fn repeated_calls_build_once() {
    init_tracing();
    let builds = Cell::new(0);
    let offset = register("offset", geometry_io(), |graph, _| {
        builds.set(builds.get() + 1);
        passthrough(graph, "set_position")
    });

    let mut cache = ArtifactCache::new();
    let first = offset.call(&mut cache).unwrap();
    let second = offset.call(&mut cache).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.get(), 1);
    assert_eq!(cache.build_count("offset"), 1);
    assert!(first.is_laid_out());
}

#[test]
fn shared_dependency_is_one_instance() {
    init_tracing();
    let mut cache = ArtifactCache::new();

    let left = cache.get_or_build("left", &geometry_io(), uses_utility).unwrap();
    let right = cache.get_or_build("right", &geometry_io(), uses_utility).unwrap();
    assert!(!Arc::ptr_eq(&left, &right));

    let smooth = cache.get("smooth").unwrap();
    assert_eq!(cache.build_count("smooth"), 1);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().hits, 1);

    let again = cache
        .get_or_build("smooth", &geometry_io(), |_, _| {
            panic!("utility must not be rebuilt")
        })
        .unwrap();
    assert!(Arc::ptr_eq(&smooth, &again));
}

#[test]
fn changed_interface_triggers_rebuild() {
    init_tracing();
    let mut cache = ArtifactCache::new();
    let old = cache
        .get_or_build("profile", &geometry_io(), |g, _| passthrough(g, "profile"))
        .unwrap();

    let widened = geometry_io().input("Radius", SocketType::Float);
    let new = cache
        .get_or_build("profile", &widened, |g, _| passthrough(g, "profile"))
        .unwrap();

    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.interface(), &widened);
    assert_eq!(cache.build_count("profile"), 2);
    assert_eq!(cache.stats().rebuilds, 1);

    let same = cache
        .get_or_build("profile", &widened, |_, _| panic!("entry is current"))
        .unwrap();
    assert!(Arc::ptr_eq(&new, &same));
}

#[test]
fn renamed_interface_socket_is_stale() {
    let mut cache = ArtifactCache::new();
    let a = Interface::new().output("Curve", SocketType::Geometry);
    let b = Interface::new().output("Mesh", SocketType::Geometry);
    let first = cache.get_or_build("shape", &a, |_, _| Ok(())).unwrap();
    let second = cache.get_or_build("shape", &b, |_, _| Ok(())).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

fn curve_io() -> Interface {
    Interface::new().output("Curve", SocketType::Geometry)
}

fn mesh_io() -> Interface {
    Interface::new().output("Mesh", SocketType::Geometry)
}

/// Declares a different interface than the one it was asked for.
fn switches_to_mesh(graph: &mut GraphBuilder, _cache: &mut ArtifactCache) -> CacheResult<()> {
    graph.set_interface(mesh_io());
    let output = graph.add_group_output();
    let grid = graph.add_op("mesh_grid", "Grid");
    graph.add_output(grid, "Mesh", SocketType::Geometry);
    graph.connect(grid, "Mesh", output, "Mesh")?;
    Ok(())
}

#[test]
fn staleness_is_judged_against_the_built_interface() {
    init_tracing();
    let mut cache = ArtifactCache::new();

    let first = cache.get_or_build("shape", &curve_io(), switches_to_mesh).unwrap();
    assert_eq!(first.interface(), &mesh_io());

    // The stored graph exposes Mesh, so asking for Curve again is stale.
    let second = cache.get_or_build("shape", &curve_io(), switches_to_mesh).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(cache.build_count("shape"), 2);

    let hit = cache
        .get_or_build("shape", &mesh_io(), |_, _| panic!("Mesh graph is current"))
        .unwrap();
    assert!(Arc::ptr_eq(&second, &hit));
}

fn build_a(graph: &mut GraphBuilder, cache: &mut ArtifactCache) -> CacheResult<()> {
    cache.get_or_build("B", &Interface::new(), build_b)?;
    graph.add_op("noop", "A");
    Ok(())
}

fn build_b(graph: &mut GraphBuilder, cache: &mut ArtifactCache) -> CacheResult<()> {
    cache.get_or_build("A", &Interface::new(), build_a)?;
    graph.add_op("noop", "B");
    Ok(())
}

#[test]
fn mutual_recursion_is_a_build_cycle() {
    init_tracing();
    let mut cache = ArtifactCache::new();
    let err = cache.get_or_build("A", &Interface::new(), build_a).unwrap_err();

    assert_eq!(
        err,
        CacheError::BuildCycle {
            chain: vec!["A".into(), "B".into(), "A".into()],
        }
    );
    assert_eq!(err.to_string(), "Build cycle: A -> B -> A");
    assert!(cache.in_progress().is_empty());
    assert!(cache.is_empty());
}

#[test]
fn self_reference_is_caught() {
    let looped = register("looped", Interface::new(), |_, cache| {
        cache.get_or_build("looped", &Interface::new(), |_, _| Ok(()))?;
        Ok(())
    });
    let mut cache = ArtifactCache::new();
    let err = looped.call(&mut cache).unwrap_err();
    assert!(matches!(err, CacheError::BuildCycle { ref chain } if chain.len() == 2));
}

#[test]
fn failed_rebuild_keeps_previous_entry() {
    init_tracing();
    let mut cache = ArtifactCache::new();
    let good = cache
        .get_or_build("sweep", &geometry_io(), |g, _| passthrough(g, "sweep"))
        .unwrap();

    let changed = geometry_io().input("Twist", SocketType::Float);
    let err = cache
        .get_or_build("sweep", &changed, |_, _| {
            Err(CacheError::builder("sweep", "profile missing"))
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Builder for 'sweep' failed: profile missing");

    assert!(Arc::ptr_eq(&good, &cache.get("sweep").unwrap()));
    assert_eq!(cache.build_count("sweep"), 1);
    assert!(cache.in_progress().is_empty());

    // Still a hit for the interface it was built with.
    let hit = cache
        .get_or_build("sweep", &geometry_io(), |_, _| panic!("still cached"))
        .unwrap();
    assert!(Arc::ptr_eq(&good, &hit));
}

#[test]
fn validation_and_layout_errors_propagate() {
    let mut cache = ArtifactCache::new();

    let err = cache
        .get_or_build("double", &Interface::new(), |g, _| {
            let a = g.add_op("value", "a");
            let out = g.add_output(a, "Value", SocketType::Float);
            let b = g.add_op("math", "b");
            let input = g.add_input(b, "A", SocketType::Float);
            g.link(out, input);
            g.link(out, input);
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CacheError::Graph(GraphError::InputAlreadyLinked { .. })
    ));

    let err = cache
        .get_or_build("loop", &Interface::new(), |g, _| {
            let x = g.add_op("math", "x");
            let y = g.add_op("math", "y");
            for n in [x, y] {
                g.add_input(n, "A", SocketType::Float);
                g.add_output(n, "Result", SocketType::Float);
            }
            g.connect(x, "Result", y, "A")?;
            g.connect(y, "Result", x, "A")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, CacheError::Layout(_)));
    assert!(cache.is_empty());
}

#[test]
fn cache_uses_its_layout_config() {
    let config = LayoutConfig {
        node_width: 300.0,
        column_gap: 10.0,
        ..LayoutConfig::default()
    };
    let mut cache = ArtifactCache::with_layout(config);
    let graph = cache
        .get_or_build("wide", &geometry_io(), |g, _| passthrough(g, "wide"))
        .unwrap();

    let node = graph.find_node("wide").unwrap();
    let rect = graph.node(node).unwrap().placement.unwrap().rect;
    assert_eq!(rect.x, 310.0);
    assert_eq!(rect.width, 300.0);
}

struct Ring {
    segments: usize,
}

impl GraphRecipe for Ring {
    fn name(&self) -> &str {
        "ring"
    }

    fn interface(&self) -> Interface {
        Interface::new().output("Geometry", SocketType::Geometry)
    }

    fn populate(&self, graph: &mut GraphBuilder, _cache: &mut ArtifactCache) -> CacheResult<()> {
        let output = graph.add_group_output();
        let circle = graph.add_op("curve_circle", "Circle");
        graph.add_output(circle, "Curve", SocketType::Geometry);
        let mut prev = (circle, "Curve");
        for i in 0..self.segments {
            let r = graph.add_reroute(format!("Reroute {i}"));
            graph.connect(prev.0, prev.1, r, "Input")?;
            prev = (r, "Output");
        }
        graph.connect(prev.0, prev.1, output, "Geometry")?;
        Ok(())
    }
}

#[test]
fn recipe_request_matches_get_or_build() {
    init_tracing();
    let mut cache = ArtifactCache::new();
    let ring = Ring { segments: 2 };
    let first = cache.request(&ring).unwrap();
    let second = cache.request(&ring as &dyn GraphRecipe).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "ring");
    assert_eq!(first.nodes().len(), 4);

    let output = first.find_node("Group Output").unwrap();
    assert_eq!(first.node(output).unwrap().placement.unwrap().column, 3);
}

#[test]
fn registered_wrapper_is_a_recipe() {
    let wrapped = register("wrapped", geometry_io(), |g, _| passthrough(g, "wrapped"));
    assert_eq!(wrapped.name(), "wrapped");

    let mut cache = ArtifactCache::new();
    let via_request = cache.request(&wrapped).unwrap();
    let via_call = wrapped.call(&mut cache).unwrap();
    assert!(Arc::ptr_eq(&via_request, &via_call));
}

proptest! {
    #[test]
    fn dependents_share_one_utility_build(order in prop::collection::vec(0usize..6, 1..24)) {
        let mut cache = ArtifactCache::new();
        let mut received: Vec<Arc<Graph>> = Vec::new();

        for &i in &order {
            cache
                .get_or_build(&format!("dependent_{i}"), &geometry_io(), |graph, cache| {
                    let utility = cache
                        .get_or_build("smooth", &geometry_io(), |g, _| passthrough(g, "smooth"))?;
                    let group = graph.add_group(&utility, "Smooth");
                    let input = graph.add_group_input();
                    graph.connect(input, "Geometry", group, "Geometry")?;
                    received.push(utility);
                    Ok(())
                })
                .unwrap();
        }

        let distinct: BTreeSet<_> = order.iter().collect();
        prop_assert_eq!(cache.build_count("smooth"), 1);
        prop_assert_eq!(received.len(), distinct.len());
        for utility in &received {
            prop_assert!(Arc::ptr_eq(utility, &received[0]));
        }
        for i in &distinct {
            prop_assert_eq!(cache.build_count(&format!("dependent_{i}")), 1);
        }
        prop_assert_eq!(cache.stats().misses as usize, distinct.len() + 1);
        prop_assert_eq!(
            cache.stats().hits as usize,
            (order.len() - distinct.len()) + (distinct.len() - 1)
        );
    }
}
