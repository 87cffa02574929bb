use std::cell::Cell;
use std::rc::Rc;

use reqroute::config::{Config, RouteConfig};
use reqroute::geometry::{Point, Rect};
use reqroute::layout::{DependencyGraph, LayoutEngine};
use reqroute::route::RouteState;
use reqroute::scene::{ConnectorId, NodeId, Scene, Side};

const NODE_W: f32 = 120.0;
const NODE_H: f32 = 70.0;

fn grid_scene(cols: usize, rows: usize, spacing: f32) -> (Scene, Vec<NodeId>) {
    let mut scene = Scene::new();
    let mut ids = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let uid = format!("n{}_{}", col, row);
            let id = scene.add_node(
                uid,
                Rect::new(col as f32 * spacing, row as f32 * spacing, NODE_W, NODE_H),
            );
            ids.push(id);
        }
    }
    (scene, ids)
}

fn connect_lr(scene: &mut Scene, from: NodeId, to: NodeId) -> ConnectorId {
    let out = scene.add_anchor(from, Side::Right).unwrap();
    let inp = scene.add_anchor(to, Side::Left).unwrap();
    scene.connect(out, inp).unwrap()
}

#[test]
fn routed_waypoints_stay_out_of_blocked_cells() {
    let (mut scene, ids) = grid_scene(3, 1, 300.0);
    let connector = connect_lr(&mut scene, ids[0], ids[2]);
    let config = RouteConfig::default();

    let state = scene.refresh_route(connector, &config).unwrap();
    assert_eq!(state, RouteState::Routed);
    let route = scene
        .connector(connector)
        .unwrap()
        .current_route()
        .unwrap()
        .clone();
    assert!(!route.fallback, "open diagram should not need the fallback");

    // Free-cell centers never land strictly inside an obstacle, so no
    // waypoint may either.
    let middle = scene.node(ids[1]).unwrap().world_bounds();
    for point in &route.points {
        let inside = point.x > middle.x
            && point.x < middle.right()
            && point.y > middle.y
            && point.y < middle.bottom();
        assert!(!inside, "waypoint {point:?} inside obstacle {middle:?}");
    }
}

#[test]
fn moving_an_endpoint_reroutes_near_the_new_position() {
    let (mut scene, ids) = grid_scene(2, 1, 400.0);
    let connector = connect_lr(&mut scene, ids[0], ids[1]);
    let config = RouteConfig::default();

    assert_eq!(
        scene.refresh_route(connector, &config).unwrap(),
        RouteState::Routed
    );
    let before = scene
        .connector(connector)
        .unwrap()
        .current_route()
        .unwrap()
        .points
        .clone();

    let old = scene.node(ids[1]).unwrap().position();
    scene
        .move_node(ids[1], Point::new(old.x + 50.0, old.y))
        .unwrap();
    assert_eq!(
        scene.connector(connector).unwrap().state(),
        RouteState::Stale
    );

    assert_eq!(
        scene.refresh_route(connector, &config).unwrap(),
        RouteState::Routed
    );
    let after = scene
        .connector(connector)
        .unwrap()
        .current_route()
        .unwrap()
        .points
        .clone();

    let end_before = *before.last().unwrap();
    let end_after = *after.last().unwrap();
    assert!(
        (end_after.x - (end_before.x + 50.0)).abs() <= config.cell_size,
        "route end {end_after:?} did not follow the moved node"
    );
}

#[test]
fn unreachable_destination_degrades_to_a_straight_line() {
    let mut scene = Scene::new();
    let a = scene.add_node("a", Rect::new(0.0, 0.0, NODE_W, NODE_H));
    let b = scene.add_node("b", Rect::new(600.0, 0.0, NODE_W, NODE_H));
    // Box the destination in completely.
    scene.add_node("wall_l", Rect::new(520.0, -400.0, 30.0, 900.0));
    scene.add_node("wall_r", Rect::new(770.0, -400.0, 30.0, 900.0));
    scene.add_node("wall_t", Rect::new(520.0, -400.0, 280.0, 30.0));
    scene.add_node("wall_b", Rect::new(520.0, 470.0, 280.0, 30.0));

    let connector = connect_lr(&mut scene, a, b);
    let config = RouteConfig::default();
    let state = scene.refresh_route(connector, &config).unwrap();
    assert_eq!(state, RouteState::Routed);

    let route = scene.connector(connector).unwrap().current_route().unwrap();
    assert!(route.fallback);
    assert_eq!(route.points.len(), 2);
}

#[test]
fn chain_distances_and_layered_positions_agree() {
    let mut scene = Scene::new();
    let ids: Vec<NodeId> = (1..=4)
        .map(|i| {
            scene.add_node(
                format!("r{i}"),
                Rect::new(i as f32 * 50.0, 0.0, NODE_W, NODE_H),
            )
        })
        .collect();
    for pair in ids.windows(2) {
        scene.add_downstream(pair[0], pair[1]).unwrap();
    }
    // A sibling branch off r2.
    let side = scene.add_node("side", Rect::new(900.0, 0.0, NODE_W, NODE_H));
    scene.add_downstream(ids[1], side).unwrap();
    let mut all = ids.clone();
    all.push(side);

    let graph = DependencyGraph::build(&scene, &all);
    assert_eq!(graph.distance("r1"), Some(1));
    assert_eq!(graph.distance("r2"), Some(2));
    assert_eq!(graph.distance("r3"), Some(3));
    assert_eq!(graph.distance("side"), Some(3));

    let engine = LayoutEngine::new(&Config::default());
    let animation = engine.layout_diagram(&scene, &all).unwrap();
    let to_of = |id: NodeId| {
        animation
            .targets()
            .iter()
            .find(|t| t.node == id)
            .map(|t| t.to)
            .unwrap()
    };

    // Depth maps to strictly increasing y.
    assert!(to_of(ids[1]).y > to_of(ids[0]).y);
    assert!(to_of(ids[2]).y > to_of(ids[1]).y);
    assert!(to_of(ids[3]).y > to_of(ids[2]).y);
    // Same-depth nodes keep distinct horizontal slots.
    assert_eq!(to_of(side).y, to_of(ids[2]).y);
    assert!((to_of(side).x - to_of(ids[2]).x).abs() > NODE_W / 2.0);
}

#[test]
fn layout_animation_settles_routes_and_fires_once() {
    let (mut scene, ids) = grid_scene(2, 2, 350.0);
    scene.add_downstream(ids[0], ids[1]).unwrap();
    scene.add_downstream(ids[0], ids[2]).unwrap();
    scene.add_downstream(ids[1], ids[3]).unwrap();
    let connector = connect_lr(&mut scene, ids[0], ids[1]);
    let route_config = RouteConfig::default();
    scene.refresh_route(connector, &route_config).unwrap();

    let engine = LayoutEngine::new(&Config::default());
    let mut animation = engine.layout_diagram(&scene, &ids).unwrap();
    let fired = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&fired);
    animation.on_finished(move || counter.set(counter.get() + 1));

    let mut frames = 0;
    while !animation.tick(&mut scene, 16.0).unwrap() {
        frames += 1;
        assert!(frames < 1000, "animation never settled");
    }
    // Extra ticks after completion change nothing.
    animation.tick(&mut scene, 16.0).unwrap();
    assert_eq!(fired.get(), 1);

    // Motion invalidated the cached route; one refresh restores it.
    assert_eq!(
        scene.connector(connector).unwrap().state(),
        RouteState::Stale
    );
    assert_eq!(
        scene.refresh_route(connector, &route_config).unwrap(),
        RouteState::Routed
    );
}

#[test]
fn second_route_prefers_an_uncongested_lane() {
    let (mut scene, ids) = grid_scene(2, 1, 500.0);
    let first = connect_lr(&mut scene, ids[0], ids[1]);
    let second = connect_lr(&mut scene, ids[0], ids[1]);
    let config = RouteConfig::default();

    scene.refresh_route(first, &config).unwrap();
    scene.refresh_route(second, &config).unwrap();

    let points_a = &scene.connector(first).unwrap().current_route().unwrap().points;
    let points_b = &scene
        .connector(second)
        .unwrap()
        .current_route()
        .unwrap()
        .points;
    let shared = points_b
        .iter()
        .filter(|p| {
            points_a
                .iter()
                .any(|q| p.distance_to(*q) < config.cell_size / 2.0)
        })
        .count();
    // Endpoints land close together by construction; the interior of the
    // two routes should mostly diverge.
    assert!(
        shared * 2 <= points_b.len(),
        "{} of {} waypoints overlap the first route",
        shared,
        points_b.len()
    );
}
