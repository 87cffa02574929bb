//! Obstacle-avoiding orthogonal connection routing.
//!
//! A routing request is self-contained: the scene region between the two
//! endpoints is converted into an ephemeral occupancy grid, a shortest
//! path is searched over it, and the cell path is translated back into
//! continuous waypoints. Nothing here is persisted between requests.

mod connector;
mod finder;
mod grid;

pub use connector::{Connector, Endpoint, arrowhead, render_segments};
pub use finder::{DiagonalPolicy, find_path};
pub use grid::{Cell, CellCoord, OccupancyGrid, build_search_bounds};

use crate::geometry::{Point, Rect};

/// Routing state of a connector.
///
/// `Unrouted` until both endpoints are bound; endpoint movement drops a
/// `Routed` connector back to `Stale` without recomputing. The consumer
/// re-triggers computation on its next paint or query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Unrouted,
    Routing,
    Routed,
    Stale,
}

/// A computed polyline between two endpoints, tagged with the search
/// region it was computed against and the endpoint revision it saw.
#[derive(Debug, Clone)]
pub struct Route {
    pub points: Vec<Point>,
    pub bounds: Rect,
    pub(crate) revision: u64,
    /// True when no free path existed and the route degraded to a
    /// straight line between the endpoints.
    pub fallback: bool,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Drop interior waypoints that are collinear with their neighbors, so a
/// long straight run over many cells becomes a single segment.
pub fn compress_path(points: &[Point]) -> Vec<Point> {
    let (first, rest) = match points.split_first() {
        Some(split) => split,
        None => return Vec::new(),
    };
    let mut out = vec![*first];
    let mut anchor = *first;
    for window in rest.windows(2) {
        let (cur, next) = (window[0], window[1]);
        let cross =
            (cur.x - anchor.x) * (next.y - cur.y) - (cur.y - anchor.y) * (next.x - cur.x);
        if cross.abs() > f32::EPSILON {
            out.push(cur);
            anchor = cur;
        }
    }
    if let Some(last) = rest.last() {
        out.push(*last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_collapses_straight_runs() {
        let points: Vec<Point> = (0..6).map(|i| Point::new(i as f32 * 25.0, 0.0)).collect();
        let compressed = compress_path(&points);
        assert_eq!(compressed, vec![Point::new(0.0, 0.0), Point::new(125.0, 0.0)]);
    }

    #[test]
    fn compress_keeps_corners() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(100.0, 100.0),
        ];
        let compressed = compress_path(&points);
        assert_eq!(
            compressed,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
            ]
        );
    }
}
