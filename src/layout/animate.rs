use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::AnimationConfig;
use crate::error::SceneError;
use crate::geometry::Point;
use crate::scene::{NodeId, Scene};

/// One node's journey through a layout animation.
#[derive(Debug, Clone, Copy)]
pub struct LayoutTarget {
    pub node: NodeId,
    pub from: Point,
    pub to: Point,
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// A running layout transition. Driven by the consumer's frame clock
/// through `tick`; every frame moves the nodes through the scene so
/// connector routes go stale and re-route against the live positions.
///
/// The completion callback fires exactly once, when the last target
/// settles. The counter is decremented per settled target and compared
/// against one, so the firing frame owns the transition unambiguously.
pub struct LayoutAnimation {
    targets: Vec<LayoutTarget>,
    duration_ms: f32,
    elapsed_ms: f32,
    remaining: AtomicUsize,
    settled: Vec<bool>,
    on_finished: Option<Box<dyn FnMut()>>,
}

impl LayoutAnimation {
    pub(crate) fn new(targets: Vec<LayoutTarget>, config: &AnimationConfig) -> Self {
        let remaining = AtomicUsize::new(targets.len());
        let settled = vec![false; targets.len()];
        Self {
            targets,
            duration_ms: config.duration_ms.max(0.0),
            elapsed_ms: 0.0,
            remaining,
            settled,
            on_finished: None,
        }
    }

    pub fn targets(&self) -> &[LayoutTarget] {
        &self.targets
    }

    pub fn on_finished(&mut self, callback: impl FnMut() + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }

    /// Advance by `dt_ms` and apply interpolated positions. Returns true
    /// once every target has settled at its destination.
    pub fn tick(&mut self, scene: &mut Scene, dt_ms: f32) -> Result<bool, SceneError> {
        if self.targets.is_empty() {
            if let Some(mut callback) = self.on_finished.take() {
                callback();
            }
            return Ok(true);
        }
        if self.is_finished() {
            return Ok(true);
        }

        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        };
        let eased = ease_out_cubic(t);

        for (slot, target) in self.targets.iter().enumerate() {
            if self.settled[slot] {
                continue;
            }
            let position = if t >= 1.0 {
                target.to
            } else {
                target.from.lerp(target.to, eased)
            };
            scene.move_node(target.node, position)?;
            if t >= 1.0 {
                self.settled[slot] = true;
                if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1
                    && let Some(callback) = self.on_finished.as_mut()
                {
                    callback();
                }
            }
        }
        Ok(self.is_finished())
    }
}
