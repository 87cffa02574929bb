use crate::geometry::Point;
use crate::scene::{Anchor, NodeId};

use super::{Route, RouteState};

/// One end of a connector: a live anchor on a node, or a free point while
/// the user is mid-drag.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Anchor(Anchor),
    Free(Point),
}

impl Endpoint {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Endpoint::Anchor(anchor) => Some(anchor.node),
            Endpoint::Free(_) => None,
        }
    }
}

/// A routed connection between two endpoints. Owns its cached route;
/// recomputation is triggered by the consumer, never implicitly.
#[derive(Debug)]
pub struct Connector {
    source: Option<Endpoint>,
    dest: Option<Endpoint>,
    state: RouteState,
    revision: u64,
    route: Option<Route>,
}

impl Connector {
    pub(crate) fn new() -> Self {
        Self {
            source: None,
            dest: None,
            state: RouteState::Unrouted,
            revision: 0,
            route: None,
        }
    }

    /// Bind both endpoints. Moves `Unrouted -> Routing`; any previously
    /// cached route no longer applies. Endpoint compatibility is checked
    /// by the scene before this is reached.
    pub(crate) fn bind(&mut self, source: Endpoint, dest: Endpoint) {
        self.source = Some(source);
        self.dest = Some(dest);
        self.revision += 1;
        self.route = None;
        self.state = RouteState::Routing;
    }

    pub fn source(&self) -> Option<Endpoint> {
        self.source
    }

    pub fn dest(&self) -> Option<Endpoint> {
        self.dest
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Manually flag the cached route as out of date.
    pub fn invalidate(&mut self) {
        if self.state == RouteState::Routed {
            self.state = RouteState::Stale;
        }
    }

    pub fn needs_route(&self) -> bool {
        self.source.is_some()
            && self.dest.is_some()
            && matches!(self.state, RouteState::Routing | RouteState::Stale)
    }

    pub(crate) fn touches(&self, node: NodeId) -> bool {
        self.source.map(|e| e.node() == Some(node)).unwrap_or(false)
            || self.dest.map(|e| e.node() == Some(node)).unwrap_or(false)
    }

    /// Movement notification from an endpoint's owning node. Bumps the
    /// revision so in-flight results for the old position are rejected.
    pub(crate) fn endpoint_moved(&mut self) {
        self.revision += 1;
        if self.state == RouteState::Routed {
            self.state = RouteState::Stale;
        }
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn begin_routing(&mut self) {
        self.state = RouteState::Routing;
    }

    /// Store a computed route. Last-request-wins: a result computed
    /// against an older endpoint revision is dropped and the connector
    /// stays `Stale` for the next cycle to retry.
    pub(crate) fn apply_route(&mut self, route: Route) -> bool {
        if route.revision != self.revision {
            self.state = RouteState::Stale;
            return false;
        }
        self.route = Some(route);
        self.state = RouteState::Routed;
        true
    }
}

/// Straight-line segments through a route's waypoints, ready to draw.
/// Collinear runs of cells collapse to a single segment.
pub fn render_segments(route: &Route) -> Vec<(Point, Point)> {
    let compressed = super::compress_path(&route.points);
    compressed.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Triangular arrowhead placed at the route's midpoint, oriented along
/// the tangent direction there. Returns `[tip, left, right]`.
pub fn arrowhead(route: &Route, size: f32) -> Option<[Point; 3]> {
    if route.points.len() < 2 {
        return None;
    }
    // Walk outward from the middle segment until one has usable length;
    // compressed routes can contain coincident waypoints.
    let mid = (route.points.len() - 1) / 2;
    let mut segment = None;
    for offset in 0..route.points.len() - 1 {
        for candidate in [mid.saturating_sub(offset), mid + offset] {
            if candidate + 1 >= route.points.len() {
                continue;
            }
            let a = route.points[candidate];
            let b = route.points[candidate + 1];
            if a.distance_to(b) > f32::EPSILON {
                segment = Some((a, b));
                break;
            }
        }
        if segment.is_some() {
            break;
        }
    }
    let (a, b) = segment?;

    let length = a.distance_to(b);
    let dir = Point::new((b.x - a.x) / length, (b.y - a.y) / length);
    let center = a.lerp(b, 0.5);
    let half = size / 2.0;
    let tip = Point::new(center.x + dir.x * half, center.y + dir.y * half);
    let base = Point::new(center.x - dir.x * half, center.y - dir.y * half);
    let perp = Point::new(-dir.y, dir.x);
    let left = Point::new(base.x + perp.x * half, base.y + perp.y * half);
    let right = Point::new(base.x - perp.x * half, base.y - perp.y * half);
    Some([tip, left, right])
}
