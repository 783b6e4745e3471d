//! Canonical node tree: [`GraphNode`] and its process-local [`NodeId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-local node identifier. Generated at parse time, never taken from model output.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One topic in the explorer tree.
///
/// `visible` is a presentation flag independent of existence; nodes are never removed.
/// `loading` is transient and is not serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub title: String,
    /// Free text; may contain markdown.
    pub description: String,
    /// Reference link; empty means none.
    pub url: String,
    /// Ordered, first-discovered-first.
    pub children: Vec<GraphNode>,
    /// Suggested standalone follow-up prompts.
    #[serde(default)]
    pub prompts: Vec<String>,
    pub visible: bool,
    #[serde(skip)]
    pub loading: bool,
}

impl GraphNode {
    /// New visible, idle node with a fresh id and the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            title: title.into(),
            description: String::new(),
            url: String::new(),
            children: Vec::new(),
            prompts: Vec::new(),
            visible: true,
            loading: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_child(mut self, child: GraphNode) -> Self {
        self.children.push(child);
        self
    }

    /// The reference link, or `None` when there is no link affordance.
    pub fn link(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Finds a node by id in this subtree (depth-first, pre-order).
    pub fn find(&self, id: &NodeId) -> Option<&GraphNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut GraphNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Follows child indices from this node: `[]` is this node, `[1, 0]` is the first child
    /// of the second child.
    pub fn at_path(&self, path: &[usize]) -> Option<&GraphNode> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get(i)?.at_path(rest),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(GraphNode::count).sum::<usize>()
    }

    /// Visits every node of this subtree in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a GraphNode)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }

    /// All ids in this subtree, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.count());
        self.walk(&mut |n| out.push(n.id.clone()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphNode {
        GraphNode::new("root")
            .with_child(GraphNode::new("a").with_child(GraphNode::new("a1")))
            .with_child(GraphNode::new("b"))
    }

    #[test]
    fn new_node_defaults() {
        let n = GraphNode::new("x");
        assert!(n.visible);
        assert!(!n.loading);
        assert!(n.children.is_empty());
        assert!(!n.id.as_str().is_empty());
        assert_eq!(n.link(), None);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let tree = sample();
        let mut ids = tree.ids();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn find_and_path_lookup() {
        let tree = sample();
        let a1 = tree.at_path(&[0, 0]).unwrap();
        assert_eq!(a1.title, "a1");
        assert_eq!(tree.find(&a1.id).unwrap().title, "a1");
        assert!(tree.at_path(&[5]).is_none());
        assert_eq!(tree.at_path(&[]).unwrap().title, "root");
        assert_eq!(tree.count(), 4);
    }

    #[test]
    fn link_ignores_blank_url() {
        assert_eq!(GraphNode::new("x").with_url("  ").link(), None);
        assert_eq!(
            GraphNode::new("x").with_url("https://example.org").link(),
            Some("https://example.org")
        );
    }

    #[test]
    fn loading_is_not_serialized() {
        let mut n = GraphNode::new("x");
        n.loading = true;
        let v = serde_json::to_value(&n).unwrap();
        assert!(v.get("loading").is_none());
        assert_eq!(v["title"], "x");
    }
}
