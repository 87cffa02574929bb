use thiserror::Error;

use crate::scene::AnchorKind;

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("no node with id {0:?}")]
    UnknownNode(String),
    #[error("node handle {0} refers to a removed slot")]
    DeadNodeHandle(usize),
    #[error("connector handle {0} refers to a removed slot")]
    DeadConnectorHandle(usize),
    #[error("cannot connect two {0:?} anchors")]
    IncompatibleAnchors(AnchorKind),
    #[error("anchor index {index} out of range for side {side:?}")]
    UnknownAnchor {
        side: crate::scene::Side,
        index: usize,
    },
    #[error("connector endpoints are not both bound")]
    UnboundEndpoint,
}
