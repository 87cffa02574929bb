use serde::{Deserialize, Serialize};

use crate::route::DiagonalPolicy;

/// Default occupancy cell size in logical units.
const DEFAULT_CELL_SIZE: f32 = 25.0;
/// Search budget for one pathfinding request.
const DEFAULT_MAX_STEPS: usize = 20_000;
/// Extra cost for stepping onto a cell already carrying a route.
const DEFAULT_TRAFFIC_COST: u32 = 4;
/// Cap on fixed-point passes when expanding search bounds.
const DEFAULT_BOUNDS_PASSES: usize = 8;

/// Horizontal tree spacing multiplier (scaled by ln of the vertex count).
const DEFAULT_H_SCALE: f32 = 380.0;
/// Vertical tree spacing per depth layer.
const DEFAULT_V_SCALE: f32 = 480.0;
/// Gap between sibling subtrees in layout units.
const DEFAULT_SIBLING_GAP: f32 = 1.0;

/// Layout transition length in milliseconds.
const DEFAULT_ANIMATION_MS: f32 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub cell_size: f32,
    pub max_steps: usize,
    pub traffic_cost: u32,
    pub bounds_passes: usize,
    pub diagonal: DiagonalPolicy,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
            traffic_cost: DEFAULT_TRAFFIC_COST,
            bounds_passes: DEFAULT_BOUNDS_PASSES,
            diagonal: DiagonalPolicy::WhenNoObstacle,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLayoutConfig {
    /// Horizontal spread; effective spacing is `h_scale * ln(vertex count)`,
    /// so it grows sub-linearly as diagrams get larger.
    pub h_scale: f32,
    /// Vertical spread; effective spacing is `v_scale * depth`, linear in
    /// layer depth.
    pub v_scale: f32,
    pub sibling_gap: f32,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            h_scale: DEFAULT_H_SCALE,
            v_scale: DEFAULT_V_SCALE,
            sibling_gap: DEFAULT_SIBLING_GAP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_ANIMATION_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub route: RouteConfig,
    pub tree: TreeLayoutConfig,
    pub animation: AnimationConfig,
}

impl Config {
    /// Parse configuration overrides from a JSON5 document. Missing fields
    /// keep their defaults.
    pub fn from_json5(source: &str) -> Result<Self, json5::Error> {
        json5::from_str(source)
    }

    /// Serialize the full configuration, e.g. for a settings file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
