//! Dependency-tree auto-layout.
//!
//! Layout runs in three stages: the selected nodes are lifted into a
//! dependency graph under a synthetic root, tidy tree positions are
//! computed for the spanning tree, and the moves are wrapped in a timed
//! animation the consumer drives frame by frame.

mod animate;
mod graph;
mod tree;

pub use animate::{LayoutAnimation, LayoutTarget};
pub use graph::{DependencyGraph, ROOT};
pub use tree::compute_layout;

use crate::config::{AnimationConfig, Config, TreeLayoutConfig};
use crate::error::SceneError;
use crate::geometry::{Point, Rect};
use crate::scene::{NodeId, Scene};

/// Entry point for diagram auto-layout.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    tree: TreeLayoutConfig,
    animation: AnimationConfig,
}

impl LayoutEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            tree: config.tree.clone(),
            animation: config.animation.clone(),
        }
    }

    /// Compute tidy positions for `nodes` and return the animation that
    /// carries them there. The new arrangement is recentered over the
    /// current content so the diagram stays under the viewport instead of
    /// jumping to the coordinate origin.
    pub fn layout_diagram(
        &self,
        scene: &Scene,
        nodes: &[NodeId],
    ) -> Result<LayoutAnimation, SceneError> {
        let graph = DependencyGraph::build(scene, nodes);
        let positions = compute_layout(&graph, &self.tree);

        let mut current: Option<Rect> = None;
        let mut planned: Option<Rect> = None;
        let mut moves: Vec<(NodeId, Point, Point)> = Vec::new();
        for &id in nodes {
            let node = scene.node(id)?;
            let Some(&to) = positions.get(node.uid()) else {
                continue;
            };
            let bounds = node.world_bounds();
            let target_bounds = Rect::new(to.x, to.y, bounds.width, bounds.height);
            current = Some(match current {
                Some(rect) => rect.union(&bounds),
                None => bounds,
            });
            planned = Some(match planned {
                Some(rect) => rect.union(&target_bounds),
                None => target_bounds,
            });
            moves.push((id, node.position(), to));
        }

        let offset = match (current, planned) {
            (Some(current), Some(planned)) => {
                let from = current.center();
                let to = planned.center();
                Point::new(from.x - to.x, from.y - to.y)
            }
            _ => Point::new(0.0, 0.0),
        };

        let targets = moves
            .into_iter()
            .map(|(node, from, to)| LayoutTarget {
                node,
                from,
                to: Point::new(to.x + offset.x, to.y + offset.y),
            })
            .collect();
        Ok(LayoutAnimation::new(targets, &self.animation))
    }
}
