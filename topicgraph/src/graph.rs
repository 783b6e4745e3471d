//! Session tree and its mutation notifications.
//!
//! [`SessionGraph`] owns the root and applies every mutation the explorer performs:
//! loading transitions, child appends, visibility and search filtering. Each mutation
//! queues a [`GraphEvent`]; [`crate::ExplorerSession`] drains and publishes them.

use serde::Serialize;
use stream_event::ProtocolEvent;

use crate::error::ExplorerError;
use crate::model::{GraphNode, NodeId};

/// Mutation notification for renderers. `None` ids refer to the root query before the
/// root exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GraphEvent {
    RootCreated { id: NodeId, title: String },
    LoadingChanged { id: Option<NodeId>, loading: bool },
    ChildrenAppended { parent: NodeId, children: Vec<NodeId> },
    VisibilityChanged { id: NodeId, visible: bool },
    DiscoveryFailed { id: Option<NodeId>, error: String },
}

impl GraphEvent {
    /// Wire shape for the stream-event protocol.
    pub fn to_protocol(&self) -> ProtocolEvent {
        match self {
            GraphEvent::RootCreated { id, title } => ProtocolEvent::RootCreated {
                id: id.to_string(),
                title: title.clone(),
            },
            GraphEvent::LoadingChanged { id, loading } => ProtocolEvent::LoadingChanged {
                id: id.as_ref().map(NodeId::to_string),
                loading: *loading,
            },
            GraphEvent::ChildrenAppended { parent, children } => {
                ProtocolEvent::ChildrenAppended {
                    parent: parent.to_string(),
                    children: children.iter().map(NodeId::to_string).collect(),
                }
            }
            GraphEvent::VisibilityChanged { id, visible } => ProtocolEvent::VisibilityChanged {
                id: id.to_string(),
                visible: *visible,
            },
            GraphEvent::DiscoveryFailed { id, error } => ProtocolEvent::DiscoveryFailed {
                id: id.as_ref().map(NodeId::to_string),
                error: error.clone(),
            },
        }
    }
}

/// The in-memory tree of one session.
///
/// The root is installed once and only extended afterwards. Nodes are never removed.
#[derive(Debug, Default)]
pub struct SessionGraph {
    root: Option<GraphNode>,
    root_loading: bool,
    pending: Vec<GraphEvent>,
}

impl SessionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&GraphNode> {
        self.root.as_ref()
    }

    /// True while the initial query is in flight.
    pub fn root_loading(&self) -> bool {
        self.root_loading
    }

    pub fn find(&self, id: &NodeId) -> Option<&GraphNode> {
        self.root.as_ref()?.find(id)
    }

    /// Child-index path lookup; `[]` is the root.
    pub fn node_at_path(&self, path: &[usize]) -> Option<&GraphNode> {
        self.root.as_ref()?.at_path(path)
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map(GraphNode::count).unwrap_or(0)
    }

    pub(crate) fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn begin_root(&mut self) -> Result<(), ExplorerError> {
        if self.root.is_some() || self.root_loading {
            return Err(ExplorerError::SessionAlreadyStarted);
        }
        self.root_loading = true;
        self.pending.push(GraphEvent::LoadingChanged {
            id: None,
            loading: true,
        });
        Ok(())
    }

    /// Clears the root loading flag without installing a root.
    pub(crate) fn abort_root(&mut self) {
        if self.root_loading {
            self.root_loading = false;
            self.pending.push(GraphEvent::LoadingChanged {
                id: None,
                loading: false,
            });
        }
    }

    pub(crate) fn install_root(&mut self, node: GraphNode) -> NodeId {
        let id = node.id.clone();
        let title = node.title.clone();
        self.root_loading = false;
        self.root = Some(node);
        self.pending.push(GraphEvent::RootCreated {
            id: id.clone(),
            title,
        });
        self.pending.push(GraphEvent::LoadingChanged {
            id: None,
            loading: false,
        });
        id
    }

    /// Marks `id` as loading. Rejects unknown nodes and nodes already loading.
    pub(crate) fn begin_discovery(&mut self, id: &NodeId) -> Result<(), ExplorerError> {
        let node = self
            .root
            .as_mut()
            .and_then(|r| r.find_mut(id))
            .ok_or_else(|| ExplorerError::NodeNotFound(id.clone()))?;
        if node.loading {
            return Err(ExplorerError::AlreadyInProgress(id.clone()));
        }
        node.loading = true;
        self.pending.push(GraphEvent::LoadingChanged {
            id: Some(id.clone()),
            loading: true,
        });
        Ok(())
    }

    /// Ends a discovery on `id`: appends `children` when given, then clears `loading`.
    ///
    /// Returns the ids of the appended children. No-op when the node is not loading, so the
    /// flag is cleared exactly once.
    pub(crate) fn finish_discovery(
        &mut self,
        id: &NodeId,
        children: Option<Vec<GraphNode>>,
    ) -> Vec<NodeId> {
        let Some(node) = self.root.as_mut().and_then(|r| r.find_mut(id)) else {
            return Vec::new();
        };
        if !node.loading {
            return Vec::new();
        }
        let added: Vec<NodeId> = match children {
            Some(children) => {
                let ids = children.iter().map(|c| c.id.clone()).collect();
                node.children.extend(children);
                ids
            }
            None => Vec::new(),
        };
        node.loading = false;
        if !added.is_empty() {
            self.pending.push(GraphEvent::ChildrenAppended {
                parent: id.clone(),
                children: added.clone(),
            });
        }
        self.pending.push(GraphEvent::LoadingChanged {
            id: Some(id.clone()),
            loading: false,
        });
        added
    }

    pub(crate) fn record_failure(&mut self, id: Option<NodeId>, error: &ExplorerError) {
        self.pending.push(GraphEvent::DiscoveryFailed {
            id,
            error: error.to_string(),
        });
    }

    /// Shows or hides a node. Returns whether the flag changed.
    pub fn set_visible(&mut self, id: &NodeId, visible: bool) -> Result<bool, ExplorerError> {
        let node = self
            .root
            .as_mut()
            .and_then(|r| r.find_mut(id))
            .ok_or_else(|| ExplorerError::NodeNotFound(id.clone()))?;
        if node.visible == visible {
            return Ok(false);
        }
        node.visible = visible;
        self.pending.push(GraphEvent::VisibilityChanged {
            id: id.clone(),
            visible,
        });
        Ok(true)
    }

    /// Search filter: keeps nodes whose title or description contains `text`
    /// (case-insensitive) and their ancestors visible, hides the rest. Blank text shows
    /// every node. Returns the number of nodes whose visibility changed.
    pub fn apply_filter(&mut self, text: &str) -> usize {
        let needle = text.trim().to_lowercase();
        let Some(root) = self.root.as_mut() else {
            return 0;
        };
        let mut changes = Vec::new();
        filter_node(root, &needle, &mut changes);
        let n = changes.len();
        self.pending.extend(changes);
        n
    }
}

/// Returns whether `node` stays visible under `needle`.
fn filter_node(node: &mut GraphNode, needle: &str, changes: &mut Vec<GraphEvent>) -> bool {
    let self_match = needle.is_empty()
        || node.title.to_lowercase().contains(needle)
        || node.description.to_lowercase().contains(needle);
    let mut any_child = false;
    for child in &mut node.children {
        any_child |= filter_node(child, needle, changes);
    }
    let visible = self_match || any_child;
    if node.visible != visible {
        node.visible = visible;
        changes.push(GraphEvent::VisibilityChanged {
            id: node.id.clone(),
            visible,
        });
    }
    visible
}
