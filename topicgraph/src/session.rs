//! Shared session state: the [`SessionGraph`] behind a lock plus a broadcast of its
//! [`GraphEvent`]s.
//!
//! The lock is held only for synchronous mutations and never across an `.await`, so a
//! discovery's "append children + clear loading" is observed as one step.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::error::ExplorerError;
use crate::graph::{GraphEvent, SessionGraph};
use crate::model::{GraphNode, NodeId};

const EVENT_CAPACITY: usize = 256;

/// One exploration session. Share it with `Arc`.
pub struct ExplorerSession {
    id: String,
    graph: Mutex<SessionGraph>,
    events: broadcast::Sender<GraphEvent>,
}

impl ExplorerSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            graph: Mutex::new(SessionGraph::new()),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Receives every mutation notification published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// Read-only access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&SessionGraph) -> R) -> R {
        f(&self.lock())
    }

    /// Clone of the current tree.
    pub fn snapshot(&self) -> Option<GraphNode> {
        self.read(|g| g.root().cloned())
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.read(|g| g.root().map(|r| r.id.clone()))
    }

    pub fn set_visible(&self, id: &NodeId, visible: bool) -> Result<bool, ExplorerError> {
        self.update(|g| g.set_visible(id, visible))
    }

    /// See [`SessionGraph::apply_filter`].
    pub fn apply_filter(&self, text: &str) -> usize {
        self.update(|g| g.apply_filter(text))
    }

    /// Applies `f` under the lock, then publishes the events it queued.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionGraph) -> R) -> R {
        let mut graph = self.lock();
        let out = f(&mut graph);
        for event in graph.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, SessionGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ExplorerSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_publishes_queued_events() {
        let session = ExplorerSession::new();
        let mut rx = session.subscribe();
        let root = session.update(|g| {
            g.begin_root().unwrap();
            g.install_root(GraphNode::new("Tides"))
        });

        assert!(matches!(
            rx.try_recv().unwrap(),
            GraphEvent::LoadingChanged { id: None, loading: true }
        ));
        assert!(matches!(rx.try_recv().unwrap(), GraphEvent::RootCreated { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            GraphEvent::LoadingChanged { id: None, loading: false }
        ));

        assert!(session.set_visible(&root, false).unwrap());
        assert_eq!(
            rx.try_recv().unwrap(),
            GraphEvent::VisibilityChanged {
                id: root.clone(),
                visible: false
            }
        );
        assert_eq!(session.root_id(), Some(root));
    }

    #[test]
    fn snapshot_is_detached_copy() {
        let session = ExplorerSession::new();
        assert!(session.snapshot().is_none());
        session.update(|g| {
            g.begin_root().unwrap();
            g.install_root(GraphNode::new("A"))
        });
        let snap = session.snapshot().unwrap();
        session.apply_filter("zzz");
        assert!(snap.visible);
        assert!(!session.snapshot().unwrap().visible);
    }
}
