//! Plain-text tree rendering for the terminal.

use topicgraph::GraphNode;

use crate::command::NodePath;

/// Default max length of the description preview under each title. 0 means no preview.
pub const DEFAULT_DESCRIPTION_LEN: usize = 80;

#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Also print hidden nodes, marked `(hidden)`.
    pub show_hidden: bool,
    pub description_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            description_len: DEFAULT_DESCRIPTION_LEN,
        }
    }
}

/// Renders `root` one node per line, each prefixed with its path label.
///
/// Hidden nodes and their subtrees are skipped unless `show_hidden` is set; child indices
/// are positions in the full child list so labels stay stable under filtering.
pub fn render_tree(root: &GraphNode, opts: &RenderOptions) -> String {
    let mut out = String::new();
    render_node(root, &NodePath::root(), 0, opts, &mut out);
    out
}

fn render_node(
    node: &GraphNode,
    path: &NodePath,
    depth: usize,
    opts: &RenderOptions,
    out: &mut String,
) {
    if !node.visible && !opts.show_hidden {
        return;
    }
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}[{}] {}", indent, path, display_title(node)));
    if node.link().is_some() {
        out.push_str(" ↗");
    }
    if node.loading {
        out.push_str(" [loading]");
    }
    if !node.visible {
        out.push_str(" (hidden)");
    }
    out.push('\n');

    if opts.description_len > 0 {
        let first_line = node.description.lines().find(|l| !l.trim().is_empty());
        if let Some(line) = first_line {
            out.push_str(&format!(
                "{}    {}\n",
                indent,
                truncate_message(line.trim(), opts.description_len)
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        render_node(child, &path.child(i), depth + 1, opts, out);
    }
}

fn display_title(node: &GraphNode) -> &str {
    if node.title.trim().is_empty() {
        "(untitled)"
    } else {
        node.title.as_str()
    }
}

/// Truncates `s` to at most `max` chars. When truncated, appends `...` (total length = max).
/// Uses character boundaries for safe UTF-8 handling.
pub fn truncate_message(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    let suffix_len = 3;
    if max <= suffix_len {
        return s.chars().take(max).collect();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let content_max = max - suffix_len;
    format!("{}{}", s.chars().take(content_max).collect::<String>(), SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphNode {
        let mut hidden = GraphNode::new("Rip currents");
        hidden.visible = false;
        let mut loading = GraphNode::new("Neap tide");
        loading.loading = true;
        GraphNode::new("Oceans")
            .with_description("Salt water\ncovering most of the planet")
            .with_url("https://en.wikipedia.org/wiki/Ocean")
            .with_child(GraphNode::new("Tides").with_child(loading))
            .with_child(hidden)
            .with_child(GraphNode::new(""))
    }

    #[test]
    fn labels_follow_child_indices() {
        let text = render_tree(&sample(), &RenderOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[.] Oceans ↗");
        assert_eq!(lines[1], "    Salt water");
        assert_eq!(lines[2], "  [0] Tides");
        assert_eq!(lines[3], "    [0.0] Neap tide [loading]");
        assert_eq!(lines[4], "  [2] (untitled)");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn hidden_nodes_on_request() {
        let opts = RenderOptions {
            show_hidden: true,
            description_len: 0,
        };
        let text = render_tree(&sample(), &opts);
        assert!(text.contains("  [1] Rip currents (hidden)\n"));
        assert!(!text.contains("Salt water"));
    }

    #[test]
    fn truncate_message_unchanged_when_short() {
        assert_eq!(truncate_message("hello", 200), "hello");
        assert_eq!(truncate_message("hello", 5), "hello");
    }

    #[test]
    fn truncate_message_truncates_with_suffix() {
        let got = truncate_message(&"ü".repeat(250), 200);
        assert_eq!(got.chars().count(), 200);
        assert!(got.ends_with("..."));
    }
}
