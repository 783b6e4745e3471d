//! REPL command grammar.
//!
//! Nodes are addressed by child-index path: `.` is the root, `0` its first child, `0.2` the
//! third child of that child. The same labels are printed by [`crate::render`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs a node path, e.g. `{0} 0.1`")]
    MissingPath(&'static str),
    #[error("invalid node path: {0}")]
    BadPath(String),
}

/// Child-index path from the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut v = self.0.clone();
        v.push(index);
        Self(v)
    }
}

impl FromStr for NodePath {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "." || s.eq_ignore_ascii_case("root") {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| CommandError::BadPath(s.to_string()))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// One line of REPL input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// Discover children; without a prompt the node title is used.
    Expand {
        path: NodePath,
        prompt: Option<String>,
    },
    Hide(NodePath),
    Show(NodePath),
    /// Filter by title/description; empty text shows everything again.
    Search(String),
    Open(NodePath),
    Prompts(NodePath),
    Tree,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  expand <path> [prompt]  discover more children (default prompt: node title)
  hide <path>             hide a node
  show <path>             show a hidden node
  search [text]           keep matching nodes visible; no text clears the filter
  open <path>             print the node's link
  prompts <path>          list suggested follow-up prompts
  tree                    print the tree
  json                    print the tree as JSON
  help                    this text
  quit                    leave
paths: `.` is the root, `0.1` is the second child of the first child";

/// Parses one REPL line. Returns `None` for blank input.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    let verb = verb.trim_start_matches('/').to_lowercase();

    let cmd = match verb.as_str() {
        "expand" | "e" => {
            let (path, prompt) = match rest.split_once(char::is_whitespace) {
                Some((p, text)) => (p, Some(text.trim().to_string())),
                None => (rest, None),
            };
            ReplCommand::Expand {
                path: required_path("expand", path)?,
                prompt: prompt.filter(|p| !p.is_empty()),
            }
        }
        "hide" => ReplCommand::Hide(required_path("hide", rest)?),
        "show" => ReplCommand::Show(required_path("show", rest)?),
        "search" | "find" => ReplCommand::Search(rest.to_string()),
        "open" => ReplCommand::Open(required_path("open", rest)?),
        "prompts" => ReplCommand::Prompts(required_path("prompts", rest)?),
        "tree" | "ls" => ReplCommand::Tree,
        "json" => ReplCommand::Json,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        _ => return Err(CommandError::Unknown(verb)),
    };
    Ok(Some(cmd))
}

fn required_path(verb: &'static str, s: &str) -> Result<NodePath, CommandError> {
    if s.is_empty() {
        return Err(CommandError::MissingPath(verb));
    }
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_through_display() {
        let p: NodePath = "0.2.1".parse().unwrap();
        assert_eq!(p.indices(), &[0, 2, 1]);
        assert_eq!(p.to_string(), "0.2.1");
        assert_eq!(".".parse::<NodePath>().unwrap(), NodePath::root());
        assert_eq!(NodePath::root().child(3).to_string(), "3");
    }

    #[test]
    fn bad_paths_are_rejected() {
        assert_eq!(
            "0..1".parse::<NodePath>(),
            Err(CommandError::BadPath("0..1".to_string()))
        );
        assert!("a.b".parse::<NodePath>().is_err());
        assert!("-1".parse::<NodePath>().is_err());
    }

    #[test]
    fn expand_with_and_without_prompt() {
        assert_eq!(
            parse_command("expand 0.1").unwrap(),
            Some(ReplCommand::Expand {
                path: "0.1".parse().unwrap(),
                prompt: None
            })
        );
        assert_eq!(
            parse_command("  expand .   neap tides and the moon ").unwrap(),
            Some(ReplCommand::Expand {
                path: NodePath::root(),
                prompt: Some("neap tides and the moon".to_string())
            })
        );
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn verbs_and_aliases() {
        assert_eq!(parse_command("QUIT").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(parse_command("/exit").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(parse_command("tree").unwrap(), Some(ReplCommand::Tree));
        assert_eq!(
            parse_command("search moon phases").unwrap(),
            Some(ReplCommand::Search("moon phases".to_string()))
        );
        assert_eq!(
            parse_command("search").unwrap(),
            Some(ReplCommand::Search(String::new()))
        );
        assert_eq!(
            parse_command("hide 2").unwrap(),
            Some(ReplCommand::Hide("2".parse().unwrap()))
        );
    }

    #[test]
    fn missing_path_and_unknown_verb() {
        assert_eq!(
            parse_command("open"),
            Err(CommandError::MissingPath("open"))
        );
        assert_eq!(
            parse_command("fly 0"),
            Err(CommandError::Unknown("fly".to_string()))
        );
    }
}
