//! Connection routing and tree auto-layout for requirement traceability
//! diagrams.
//!
//! The crate has two cores. The routing core turns the area between a
//! connector's endpoints into an occupancy grid and searches an
//! obstacle-avoiding polyline over it, with soft costs steering new
//! routes away from existing ones. The layout core lifts a node
//! selection into a dependency graph, computes tidy tree positions and
//! animates the nodes there, invalidating routes as they move.
//!
//! Everything operates on the framework-neutral [`Scene`] model; no
//! rendering toolkit types appear in the API.

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod route;
pub mod scene;

pub use config::Config;
pub use error::SceneError;
pub use geometry::{Point, Rect, Transform};
pub use layout::{LayoutAnimation, LayoutEngine};
pub use route::{DiagonalPolicy, Route, RouteState};
pub use scene::{Anchor, AnchorKind, ConnectorId, NodeId, Scene, Side};
