use std::collections::HashMap;

use crate::config::RouteConfig;
use crate::error::SceneError;
use crate::geometry::{Point, Rect, Transform};
use crate::route::{
    Connector, Endpoint, OccupancyGrid, Route, RouteState, build_search_bounds, find_path,
};

/// Handle into the scene's node arena. Plain index, no ownership:
/// node/connector back-references are expressed through these instead of
/// pointers so the object graph stays cycle-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Handle into the scene's connector arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Connection role of an anchor, derived from its side: flows enter a
/// node at the top/left and leave at the bottom/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Input,
    Output,
}

impl Side {
    pub fn kind(self) -> AnchorKind {
        match self {
            Side::Top | Side::Left => AnchorKind::Input,
            Side::Bottom | Side::Right => AnchorKind::Output,
        }
    }

    fn slot(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }
}

/// A connectable point on a node: owning node, side, and position within
/// that side's anchor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub node: NodeId,
    pub side: Side,
    pub index: usize,
}

/// A requirement-like diagram element: stable string id, placed bounds,
/// per-side anchors, and string-id traceability references.
#[derive(Debug, Clone)]
pub struct SceneNode {
    uid: String,
    local_bounds: Rect,
    transform: Transform,
    anchor_counts: [usize; 4],
    upstream: Vec<String>,
    downstream: Vec<String>,
}

impl SceneNode {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn position(&self) -> Point {
        self.transform.translate
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn world_bounds(&self) -> Rect {
        self.local_bounds.translated(self.transform.translate)
    }

    pub fn upstream(&self) -> &[String] {
        &self.upstream
    }

    pub fn downstream(&self) -> &[String] {
        &self.downstream
    }
}

/// Flat-arena scene holding nodes and connectors. Removal tombstones the
/// slot so existing handles stay stable.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<SceneNode>>,
    connectors: Vec<Option<Connector>>,
    uid_index: HashMap<String, NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with world-space bounds.
    pub fn add_node(&mut self, uid: impl Into<String>, bounds: Rect) -> NodeId {
        let uid = uid.into();
        let id = NodeId(self.nodes.len());
        self.uid_index.insert(uid.clone(), id);
        self.nodes.push(Some(SceneNode {
            uid,
            local_bounds: Rect::new(0.0, 0.0, bounds.width, bounds.height),
            transform: Transform::new(Point::new(bounds.x, bounds.y)),
            anchor_counts: [0; 4],
            upstream: Vec::new(),
            downstream: Vec::new(),
        }));
        id
    }

    /// Remove a node, every connector bound to it, and every reference to
    /// it in other nodes' upstream/downstream lists.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        let uid = self.node(id)?.uid.clone();
        for slot in &mut self.connectors {
            let touches = slot.as_ref().map(|c| c.touches(id)).unwrap_or(false);
            if touches {
                *slot = None;
            }
        }
        for slot in self.nodes.iter_mut().flatten() {
            slot.upstream.retain(|entry| entry != &uid);
            slot.downstream.retain(|entry| entry != &uid);
        }
        self.uid_index.remove(&uid);
        self.nodes[id.0] = None;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(SceneError::DeadNodeHandle(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(SceneError::DeadNodeHandle(id.0))
    }

    pub fn find_node(&self, uid: &str) -> Option<NodeId> {
        self.uid_index.get(uid).copied()
    }

    /// Resolve a uid, failing when no live node carries it.
    pub fn require_node(&self, uid: &str) -> Result<NodeId, SceneError> {
        self.find_node(uid)
            .ok_or_else(|| SceneError::UnknownNode(uid.to_owned()))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| NodeId(idx)))
            .collect()
    }

    /// Record `to` as downstream of `from`. The reverse reference is
    /// inserted in the same operation: the symmetry invariant holds on
    /// every mutation, not just when read back.
    pub fn add_downstream(&mut self, from: NodeId, to: NodeId) -> Result<(), SceneError> {
        let to_uid = self.node(to)?.uid.clone();
        let from_uid = self.node(from)?.uid.clone();
        let from_node = self.node_mut(from)?;
        if !from_node.downstream.contains(&to_uid) {
            from_node.downstream.push(to_uid);
        }
        let to_node = self.node_mut(to)?;
        if !to_node.upstream.contains(&from_uid) {
            to_node.upstream.push(from_uid);
        }
        Ok(())
    }

    pub fn add_upstream(&mut self, of: NodeId, upstream: NodeId) -> Result<(), SceneError> {
        self.add_downstream(upstream, of)
    }

    pub fn remove_downstream(&mut self, from: NodeId, to: NodeId) -> Result<(), SceneError> {
        let to_uid = self.node(to)?.uid.clone();
        let from_uid = self.node(from)?.uid.clone();
        self.node_mut(from)?.downstream.retain(|uid| uid != &to_uid);
        self.node_mut(to)?.upstream.retain(|uid| uid != &from_uid);
        Ok(())
    }

    /// Create a new anchor slot on `side`, returning its handle.
    pub fn add_anchor(&mut self, node: NodeId, side: Side) -> Result<Anchor, SceneError> {
        let counts = &mut self.node_mut(node)?.anchor_counts;
        let index = counts[side.slot()];
        counts[side.slot()] += 1;
        Ok(Anchor { node, side, index })
    }

    pub fn anchor_count(&self, node: NodeId, side: Side) -> Result<usize, SceneError> {
        Ok(self.node(node)?.anchor_counts[side.slot()])
    }

    /// World position of an anchor: anchors spread evenly along their
    /// side, positioned through the node's transform.
    pub fn anchor_point(&self, anchor: &Anchor) -> Result<Point, SceneError> {
        let node = self.node(anchor.node)?;
        let count = node.anchor_counts[anchor.side.slot()];
        if anchor.index >= count {
            return Err(SceneError::UnknownAnchor {
                side: anchor.side,
                index: anchor.index,
            });
        }
        let bounds = node.local_bounds;
        let fraction = (anchor.index + 1) as f32 / (count + 1) as f32;
        let local = match anchor.side {
            Side::Top => Point::new(bounds.width * fraction, 0.0),
            Side::Bottom => Point::new(bounds.width * fraction, bounds.height),
            Side::Left => Point::new(0.0, bounds.height * fraction),
            Side::Right => Point::new(bounds.width, bounds.height * fraction),
        };
        Ok(node.transform.local_to_world(local))
    }

    /// Connect two anchors. Endpoint compatibility is a precondition of
    /// creation: an output must feed an input, so two anchors of the
    /// same kind are rejected here, not inside the router.
    pub fn connect(&mut self, source: Anchor, dest: Anchor) -> Result<ConnectorId, SceneError> {
        let id = self.add_connector();
        match self.bind_connector(id, Endpoint::Anchor(source), Endpoint::Anchor(dest)) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.connectors.pop();
                Err(err)
            }
        }
    }

    /// Add an unbound connector, e.g. for a drag in progress with one
    /// free endpoint; bind it through `bind_connector`.
    pub fn add_connector(&mut self) -> ConnectorId {
        let id = ConnectorId(self.connectors.len());
        self.connectors.push(Some(Connector::new()));
        id
    }

    /// Bind or rebind a connector's endpoints. Anchor endpoints are
    /// validated and the same compatibility rule as `connect` applies;
    /// free endpoints pair with anything.
    pub fn bind_connector(
        &mut self,
        id: ConnectorId,
        source: Endpoint,
        dest: Endpoint,
    ) -> Result<(), SceneError> {
        if let Endpoint::Anchor(anchor) = source {
            self.anchor_point(&anchor)?;
        }
        if let Endpoint::Anchor(anchor) = dest {
            self.anchor_point(&anchor)?;
        }
        if let (Endpoint::Anchor(a), Endpoint::Anchor(b)) = (source, dest)
            && a.side.kind() == b.side.kind()
        {
            return Err(SceneError::IncompatibleAnchors(a.side.kind()));
        }
        self.connector_mut(id)?.bind(source, dest);
        Ok(())
    }

    /// Remove a single connection, tombstoning its slot. Anchor slots on
    /// the endpoint nodes are stable identifiers and stay allocated, so
    /// other connectors keep their anchor indices.
    pub fn remove_connector(&mut self, id: ConnectorId) -> Result<(), SceneError> {
        self.connector(id)?;
        self.connectors[id.0] = None;
        Ok(())
    }

    pub fn connector(&self, id: ConnectorId) -> Result<&Connector, SceneError> {
        self.connectors
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(SceneError::DeadConnectorHandle(id.0))
    }

    pub fn connector_mut(&mut self, id: ConnectorId) -> Result<&mut Connector, SceneError> {
        self.connectors
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(SceneError::DeadConnectorHandle(id.0))
    }

    pub fn connector_ids(&self) -> Vec<ConnectorId> {
        self.connectors
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| ConnectorId(idx)))
            .collect()
    }

    /// Move a node. Every connector with an endpoint on it is notified,
    /// dropping cached routes to `Stale` for the next refresh cycle.
    pub fn move_node(&mut self, id: NodeId, to: Point) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = Transform::new(to);
        for slot in self.connectors.iter_mut().flatten() {
            if slot.touches(id) {
                slot.endpoint_moved();
            }
        }
        Ok(())
    }

    /// Nodes whose bounds intersect `rect`; the scene query the grid
    /// model is populated from.
    pub fn items_in_region(&self, rect: Rect) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                slot.as_ref()
                    .filter(|node| node.world_bounds().intersects(&rect))
                    .map(|_| NodeId(idx))
            })
            .collect()
    }

    fn resolve_endpoint(&self, endpoint: Endpoint) -> Result<Point, SceneError> {
        match endpoint {
            Endpoint::Anchor(anchor) => self.anchor_point(&anchor),
            Endpoint::Free(point) => Ok(point),
        }
    }

    /// Recompute a connector's route if it needs one. Builds a private
    /// occupancy grid around the endpoints, runs the path search, and
    /// caches the result. An unreachable destination degrades to a
    /// straight-line fallback rather than failing.
    pub fn refresh_route(
        &mut self,
        id: ConnectorId,
        config: &RouteConfig,
    ) -> Result<RouteState, SceneError> {
        let (source, dest, revision) = {
            let connector = self.connector(id)?;
            if !connector.needs_route() {
                return Ok(connector.state());
            }
            (
                connector.source().ok_or(SceneError::UnboundEndpoint)?,
                connector.dest().ok_or(SceneError::UnboundEndpoint)?,
                connector.revision(),
            )
        };
        let src_point = self.resolve_endpoint(source)?;
        let dst_point = self.resolve_endpoint(dest)?;
        self.connector_mut(id)?.begin_routing();

        // The endpoint-owning nodes never block their own connector.
        let ignored = [source.node(), dest.node()];
        let obstacles: Vec<Rect> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                slot.as_ref()
                    .filter(|_| !ignored.contains(&Some(NodeId(idx))))
                    .map(|node| node.world_bounds())
            })
            .collect();
        let bounds = build_search_bounds(
            src_point,
            dst_point,
            &obstacles,
            config.cell_size,
            config.bounds_passes,
        );

        // Existing routes of other connectors become soft-cost cells.
        let existing: Vec<Vec<Point>> = self
            .connectors
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                if idx == id.0 {
                    return None;
                }
                slot.as_ref()
                    .and_then(|c| c.current_route())
                    .map(|route| route.points.clone())
            })
            .collect();
        let traffic: Vec<&[Point]> = existing.iter().map(|points| points.as_slice()).collect();

        let grid_obstacles: Vec<Rect> = self
            .items_in_region(bounds)
            .into_iter()
            .filter(|id| !ignored.contains(&Some(*id)))
            .filter_map(|id| self.node(id).ok().map(|node| node.world_bounds()))
            .collect();
        let mut grid =
            OccupancyGrid::generate(bounds, config.cell_size, &grid_obstacles, &traffic);
        let start = grid.cell_near(src_point);
        let end = grid.cell_near(dst_point);
        let cells = find_path(&mut grid, start, end, config);

        let (points, fallback) = if cells.is_empty() {
            (vec![src_point, dst_point], true)
        } else {
            let mut points: Vec<Point> = cells.iter().map(|&cell| grid.point_at(cell)).collect();
            if let Some(last) = points.last().copied()
                && last.distance_to(dst_point) > f32::EPSILON
            {
                points.push(dst_point);
            }
            // Waypoints stay cell-dense; later requests consume them
            // per cell when marking traffic.
            (points, false)
        };

        let route = Route {
            points,
            bounds,
            revision,
            fallback,
        };
        self.connector_mut(id)?.apply_route(route);
        Ok(self.connector(id)?.state())
    }
}
