//! Executes REPL commands against a [`DiscoveryOrchestrator`].

use thiserror::Error;
use topicgraph::{DiscoveryOrchestrator, ExplorerError, GraphNode, NodeId};

use crate::command::{NodePath, ReplCommand, HELP};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no node at {0}")]
    NoSuchPath(NodePath),
    #[error("nothing explored yet")]
    NotStarted,
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
}

impl RunError {
    /// Follow-up line for errors where the request was sent and failed; rejected commands
    /// changed nothing and get none.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunError::Explorer(e) if !e.is_rejected_early() => {
                Some("nothing changed; run the same command to retry")
            }
            _ => None,
        }
    }
}

/// What the caller should print after a command.
#[derive(Debug)]
pub enum Reply {
    Message(String),
    /// Print the current tree.
    Tree,
    /// Print the current tree as JSON.
    Json(Option<GraphNode>),
    Quit,
}

/// Runs one command. Discovery errors are returned, not printed.
pub async fn execute(
    explorer: &DiscoveryOrchestrator,
    cmd: ReplCommand,
) -> Result<Reply, RunError> {
    match cmd {
        ReplCommand::Expand { path, prompt } => {
            let id = resolve(explorer, &path)?;
            let added = match prompt {
                Some(p) => explorer.discover(&id, &p).await?,
                None => explorer.discover_with_default_prompt(&id).await?,
            };
            if added.is_empty() {
                Ok(Reply::Message(format!("no new children for {}", path)))
            } else {
                Ok(Reply::Tree)
            }
        }
        ReplCommand::Hide(path) => set_visible(explorer, &path, false),
        ReplCommand::Show(path) => set_visible(explorer, &path, true),
        ReplCommand::Search(text) => {
            let changed = explorer.session().apply_filter(&text);
            if text.trim().is_empty() {
                tracing::debug!(changed, "filter cleared");
            } else {
                tracing::debug!(changed, filter = %text, "filter applied");
            }
            Ok(Reply::Tree)
        }
        ReplCommand::Open(path) => {
            let link = with_node(explorer, &path, |n| n.link().map(str::to_string))?;
            Ok(Reply::Message(
                link.unwrap_or_else(|| format!("{} has no link", path)),
            ))
        }
        ReplCommand::Prompts(path) => {
            let prompts = with_node(explorer, &path, |n| n.prompts.clone())?;
            if prompts.is_empty() {
                return Ok(Reply::Message(format!("{} has no suggested prompts", path)));
            }
            let lines: Vec<String> = prompts
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{}. {}", i + 1, p))
                .collect();
            Ok(Reply::Message(lines.join("\n")))
        }
        ReplCommand::Tree => Ok(Reply::Tree),
        ReplCommand::Json => Ok(Reply::Json(explorer.session().snapshot())),
        ReplCommand::Help => Ok(Reply::Message(HELP.to_string())),
        ReplCommand::Quit => Ok(Reply::Quit),
    }
}

fn set_visible(
    explorer: &DiscoveryOrchestrator,
    path: &NodePath,
    visible: bool,
) -> Result<Reply, RunError> {
    let id = resolve(explorer, path)?;
    if explorer.session().set_visible(&id, visible)? {
        Ok(Reply::Tree)
    } else {
        let state = if visible { "visible" } else { "hidden" };
        Ok(Reply::Message(format!("{} is already {}", path, state)))
    }
}

fn resolve(explorer: &DiscoveryOrchestrator, path: &NodePath) -> Result<NodeId, RunError> {
    with_node(explorer, path, |n| n.id.clone())
}

fn with_node<R>(
    explorer: &DiscoveryOrchestrator,
    path: &NodePath,
    f: impl FnOnce(&GraphNode) -> R,
) -> Result<R, RunError> {
    explorer.session().read(|g| {
        if g.root().is_none() {
            return Err(RunError::NotStarted);
        }
        g.node_at_path(path.indices())
            .map(f)
            .ok_or_else(|| RunError::NoSuchPath(path.clone()))
    })
}
