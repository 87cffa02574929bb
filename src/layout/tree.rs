use std::collections::{BTreeMap, VecDeque};

use crate::config::TreeLayoutConfig;
use crate::geometry::Point;

use super::graph::{DependencyGraph, ROOT};

/// Tidy tree positions for every node reachable from the root, keyed by
/// uid. The synthetic root is excluded from the result.
///
/// The spanning tree is taken breadth-first (first-discovered parent
/// wins), then each subtree is placed inside its own horizontal span so
/// siblings never overlap and parents sit centered over their children.
/// Horizontal spread scales with the logarithm of the vertex count while
/// vertical spread stays linear in depth, keeping wide diagrams from
/// growing unboundedly sideways.
pub fn compute_layout(
    graph: &DependencyGraph,
    config: &TreeLayoutConfig,
) -> BTreeMap<String, Point> {
    let n = graph.vertex_count();
    let mut tree: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut depth = vec![0usize; n];
    let mut visited = vec![false; n];
    visited[ROOT] = true;
    let mut queue = VecDeque::from([ROOT]);
    let mut reachable = 0usize;
    while let Some(vertex) = queue.pop_front() {
        for &child in graph.children(vertex) {
            if !visited[child] {
                visited[child] = true;
                depth[child] = depth[vertex] + 1;
                tree[vertex].push(child);
                queue.push_back(child);
                reachable += 1;
            }
        }
    }

    let mut spans = vec![0.0f32; n];
    subtree_span(ROOT, &tree, config.sibling_gap, &mut spans);
    let mut unit_x = vec![0.0f32; n];
    place(ROOT, 0.0, &tree, &spans, config.sibling_gap, &mut unit_x);

    let h_spread = config.h_scale * (reachable.max(2) as f32).ln();
    let mut positions = BTreeMap::new();
    for vertex in 1..n {
        if !visited[vertex] {
            continue;
        }
        if let Some(uid) = graph.uid(vertex) {
            positions.insert(
                uid.to_owned(),
                Point::new(
                    unit_x[vertex] * h_spread,
                    (depth[vertex] - 1) as f32 * config.v_scale,
                ),
            );
        }
    }
    positions
}

/// Width of a subtree in abstract units; a leaf occupies one unit.
fn subtree_span(vertex: usize, tree: &[Vec<usize>], gap: f32, spans: &mut [f32]) -> f32 {
    let children = &tree[vertex];
    if children.is_empty() {
        spans[vertex] = 1.0;
        return 1.0;
    }
    let mut total = gap * (children.len() - 1) as f32;
    for &child in children {
        total += subtree_span(child, tree, gap, spans);
    }
    spans[vertex] = total;
    total
}

fn place(
    vertex: usize,
    left: f32,
    tree: &[Vec<usize>],
    spans: &[f32],
    gap: f32,
    unit_x: &mut [f32],
) {
    let children = &tree[vertex];
    if children.is_empty() {
        unit_x[vertex] = left + spans[vertex] / 2.0;
        return;
    }
    let mut cursor = left;
    for &child in children {
        place(child, cursor, tree, spans, gap, unit_x);
        cursor += spans[child] + gap;
    }
    let first = unit_x[children[0]];
    let last = unit_x[children[children.len() - 1]];
    unit_x[vertex] = (first + last) / 2.0;
}
