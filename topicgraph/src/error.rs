//! Explorer error types.
//!
//! One enum for the whole pipeline: prompt building, completion transport, response
//! repair/parse, and per-node discovery guards.

use thiserror::Error;

use crate::model::NodeId;

/// Error returned by prompt building, parsing, and discovery.
///
/// `InvalidInput`, `NodeNotFound`, `AlreadyInProgress` and `SessionAlreadyStarted` are
/// raised before any completion request is sent. `Transport` and `MalformedResponse`
/// are raised after the target node's `loading` flag has been cleared.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The user query was empty or whitespace-only.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The completion collaborator failed (network, HTTP status, credentials, no choices).
    #[error("transport error: {0}")]
    Transport(String),

    /// The completion could not be repaired into a JSON object.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A discovery for this node is already in flight.
    #[error("discovery already in progress for node {0}")]
    AlreadyInProgress(NodeId),

    /// No node with this id exists in the session tree.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The session already has a root (or is creating one).
    #[error("session already started")]
    SessionAlreadyStarted,
}

impl ExplorerError {
    /// True for errors rejected before any side effect (no loading flag touched, no request sent).
    pub fn is_rejected_early(&self) -> bool {
        matches!(
            self,
            ExplorerError::InvalidInput(_)
                | ExplorerError::AlreadyInProgress(_)
                | ExplorerError::NodeNotFound(_)
                | ExplorerError::SessionAlreadyStarted
        )
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(e: serde_json::Error) -> Self {
        ExplorerError::MalformedResponse(e.to_string())
    }
}
