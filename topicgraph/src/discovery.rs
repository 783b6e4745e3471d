//! Discovery: prompt → completion → sanitize → parse → graft.
//!
//! Per node the state machine is `Idle -> Loading -> {Merged, Failed}`. The loading flag
//! is the only guard between discoveries: a second discovery on a loading node is
//! rejected, other nodes are independent. A [`LoadingGuard`] clears the flag when a
//! discovery fails or its future is dropped, so `loading` always ends `false` and
//! `children` change only on success. On failure the flag is cleared before
//! `DiscoveryFailed` is published, so a subscriber may retry as soon as it sees the event.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::ExplorerError;
use crate::llm::LlmClient;
use crate::model::{GraphNode, NodeId};
use crate::parse::parse;
use crate::prompt::PromptBuilder;
use crate::sanitize::sanitize;
use crate::session::ExplorerSession;

/// Runs discoveries against one session. Cheap to clone.
#[derive(Clone)]
pub struct DiscoveryOrchestrator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
    session: Arc<ExplorerSession>,
}

impl DiscoveryOrchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptBuilder) -> Self {
        Self::with_session(llm, prompts, Arc::new(ExplorerSession::new()))
    }

    pub fn with_session(
        llm: Arc<dyn LlmClient>,
        prompts: PromptBuilder,
        session: Arc<ExplorerSession>,
    ) -> Self {
        Self {
            llm,
            prompts,
            session,
        }
    }

    pub fn session(&self) -> &Arc<ExplorerSession> {
        &self.session
    }

    /// Root-level discovery from the initial query. The parsed node becomes the root; an
    /// empty model title falls back to the query.
    pub async fn start(&self, query: &str) -> Result<NodeId, ExplorerError> {
        let prompt = self.prompts.build(query)?;
        let span = info_span!("discover", node_id = "root");
        async move {
            self.session.update(|g| g.begin_root())?;
            let guard = LoadingGuard::root(&self.session);

            let mut root = match self.fetch_subtree(&prompt).await {
                Ok(node) => node,
                Err(e) => return Err(guard.fail(e)),
            };
            if root.title.trim().is_empty() {
                root.title = query.trim().to_string();
            }
            let children = root.children.len();
            let id = guard.install_root(root);
            info!(root = %id, children, "session started");
            Ok(id)
        }
        .instrument(span)
        .await
    }

    /// Requests children for `node_id` and appends them after existing children.
    ///
    /// Returns the ids of the appended nodes. Rejects blank prompts, unknown nodes and
    /// nodes already loading before any request is sent.
    pub async fn discover(
        &self,
        node_id: &NodeId,
        user_prompt: &str,
    ) -> Result<Vec<NodeId>, ExplorerError> {
        let prompt = self.prompts.build(user_prompt)?;
        let span = info_span!("discover", node_id = %node_id);
        async move {
            self.session.update(|g| g.begin_discovery(node_id))?;
            let guard = LoadingGuard::node(&self.session, node_id.clone());

            let subtree = match self.fetch_subtree(&prompt).await {
                Ok(node) => node,
                Err(e) => return Err(guard.fail(e)),
            };
            let added = guard.merge_children(subtree.children);
            info!(added = added.len(), "discovery merged");
            Ok(added)
        }
        .instrument(span)
        .await
    }

    /// [`discover`](Self::discover) using the node's own title as the prompt.
    pub async fn discover_with_default_prompt(
        &self,
        node_id: &NodeId,
    ) -> Result<Vec<NodeId>, ExplorerError> {
        let title = self
            .session
            .read(|g| g.find(node_id).map(|n| n.title.clone()))
            .ok_or_else(|| ExplorerError::NodeNotFound(node_id.clone()))?;
        self.discover(node_id, &title).await
    }

    async fn fetch_subtree(&self, prompt: &str) -> Result<GraphNode, ExplorerError> {
        let response = self.llm.invoke(prompt).await?;
        debug!(
            chars = response.content.len(),
            usage = ?response.usage,
            "completion received"
        );
        let cleaned = sanitize(&response.content);
        parse(&cleaned)
    }
}

enum Target {
    Root,
    Node(NodeId),
}

/// Clears the target's loading flag on drop unless the discovery merged.
struct LoadingGuard<'a> {
    session: &'a ExplorerSession,
    target: Target,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn root(session: &'a ExplorerSession) -> Self {
        Self {
            session,
            target: Target::Root,
            armed: true,
        }
    }

    fn node(session: &'a ExplorerSession, id: NodeId) -> Self {
        Self {
            session,
            target: Target::Node(id),
            armed: true,
        }
    }

    fn install_root(mut self, root: GraphNode) -> NodeId {
        self.armed = false;
        self.session.update(|g| g.install_root(root))
    }

    fn merge_children(mut self, children: Vec<GraphNode>) -> Vec<NodeId> {
        self.armed = false;
        match &self.target {
            Target::Node(id) => self
                .session
                .update(|g| g.finish_discovery(id, Some(children))),
            Target::Root => Vec::new(),
        }
    }

    /// Clears `loading`, then publishes the failure, in one update.
    fn fail(mut self, error: ExplorerError) -> ExplorerError {
        self.armed = false;
        warn!(error = %error, "discovery failed");
        self.session.update(|g| match &self.target {
            Target::Root => {
                g.abort_root();
                g.record_failure(None, &error);
            }
            Target::Node(id) => {
                g.finish_discovery(id, None);
                g.record_failure(Some(id.clone()), &error);
            }
        });
        error
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("discovery cancelled; clearing loading");
        match &self.target {
            Target::Root => self.session.update(|g| g.abort_root()),
            Target::Node(id) => {
                self.session.update(|g| g.finish_discovery(id, None));
            }
        }
    }
}
