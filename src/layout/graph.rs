use std::collections::HashMap;

use log::warn;

use crate::scene::{NodeId, Scene};

/// Vertex index of the synthetic root every layout hangs from.
pub const ROOT: usize = 0;

/// Directed dependency graph over a set of scene nodes.
///
/// Vertex 0 is synthetic: every node with no upstream inside the set is
/// attached to it, so the graph always has a single entry point even when
/// the selection contains several independent chains. Downstream ids that
/// resolve to nothing in the set are skipped, not errors; diagrams under
/// edit routinely hold dangling references.
#[derive(Debug)]
pub struct DependencyGraph {
    uids: Vec<String>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    distances: Vec<usize>,
}

impl DependencyGraph {
    pub fn build(scene: &Scene, nodes: &[NodeId]) -> Self {
        let mut uids = vec![String::new()];
        let mut index = HashMap::new();
        let mut members = Vec::new();
        for &id in nodes {
            let Ok(node) = scene.node(id) else {
                warn!("layout skipping dead node handle {:?}", id);
                continue;
            };
            index.insert(node.uid().to_owned(), uids.len());
            uids.push(node.uid().to_owned());
            members.push(id);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); uids.len()];
        for &id in &members {
            let node = match scene.node(id) {
                Ok(node) => node,
                Err(_) => continue,
            };
            let vertex = index[node.uid()];
            let in_set = |uid: &String| index.contains_key(uid);
            if !node.upstream().iter().any(in_set) {
                children[ROOT].push(vertex);
            }
            for downstream in node.downstream() {
                match index.get(downstream) {
                    Some(&target) => {
                        if !children[vertex].contains(&target) {
                            children[vertex].push(target);
                        }
                    }
                    None => warn!(
                        "node {} references missing downstream {}, skipping edge",
                        node.uid(),
                        downstream
                    ),
                }
            }
        }

        let distances = relax_distances(&children);
        Self {
            uids,
            index,
            children,
            distances,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.uids.len()
    }

    /// Uid of a vertex; `None` for the synthetic root.
    pub fn uid(&self, vertex: usize) -> Option<&str> {
        if vertex == ROOT {
            None
        } else {
            self.uids.get(vertex).map(String::as_str)
        }
    }

    pub fn children(&self, vertex: usize) -> &[usize] {
        &self.children[vertex]
    }

    /// Shortest edge distance from the synthetic root, or `None` when the
    /// uid is absent or unreachable.
    pub fn distance(&self, uid: &str) -> Option<usize> {
        let vertex = *self.index.get(uid)?;
        let distance = self.distances[vertex];
        (distance != usize::MAX).then_some(distance)
    }

    /// Uids ordered by root distance, ties broken by uid; unreachable
    /// vertices sort last.
    pub fn order_by_distance(&self) -> Vec<&str> {
        let mut order: Vec<usize> = (1..self.uids.len()).collect();
        order.sort_by_key(|&vertex| (self.distances[vertex], &self.uids[vertex]));
        order.iter().map(|&vertex| self.uids[vertex].as_str()).collect()
    }
}

/// Shortest distances from the root by bounded relaxation. Tolerates
/// cycles: after `|V| - 1` passes every shortest simple path has settled
/// and further passes cannot improve anything.
fn relax_distances(children: &[Vec<usize>]) -> Vec<usize> {
    let n = children.len();
    let mut distances = vec![usize::MAX; n];
    distances[ROOT] = 0;
    for _ in 1..n.max(2) {
        let mut changed = false;
        for (vertex, targets) in children.iter().enumerate() {
            if distances[vertex] == usize::MAX {
                continue;
            }
            let candidate = distances[vertex] + 1;
            for &target in targets {
                if candidate < distances[target] {
                    distances[target] = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    distances
}
