//! Protocol-level event types (type + payload).

use serde::Serialize;
use serde_json::Value;

/// Wire shape for one graph notification. The envelope (session_id, event_id) is
/// applied separately.
///
/// `id` in payload is always a node id. `parent` is the node that received children.
/// `DiscoveryFailed` has `id: None` when the failed discovery was the root query.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    RootCreated { id: String, title: String },
    LoadingChanged { id: Option<String>, loading: bool },
    ChildrenAppended {
        parent: String,
        children: Vec<String>,
    },
    VisibilityChanged { id: String, visible: bool },
    DiscoveryFailed { id: Option<String>, error: String },
    Snapshot { tree: Value },
}

impl ProtocolEvent {
    /// Serializes this event to a JSON object (type + payload only; no envelope).
    ///
    /// Use crate-level [`crate::to_json`] when you need envelope fields injected.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
