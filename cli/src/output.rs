//! Event output: NDJSON stream-event lines for `--json`, status lines otherwise.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use stream_event::{EnvelopeState, ProtocolEvent};
use thiserror::Error;
use tokio::sync::broadcast;
use topicgraph::{GraphEvent, GraphNode};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialize event: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write event: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes protocol events with the session envelope, one per line, to stdout or a file.
/// Clones share the same `event_id` sequence.
#[derive(Clone)]
pub struct JsonOutput {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    state: EnvelopeState,
    file: Option<PathBuf>,
    pretty: bool,
}

impl JsonOutput {
    pub fn new(session_id: impl Into<String>, file: Option<PathBuf>, pretty: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: EnvelopeState::new(session_id.into()),
                file,
                pretty,
            })),
        }
    }

    pub fn emit(&self, event: &ProtocolEvent) -> Result<(), OutputError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let value = stream_event::to_json(event, &mut inner.state)?;
        write_json_line(&value, inner.file.as_ref(), inner.pretty)
    }

    /// Emits a `snapshot` event carrying the whole tree.
    pub fn snapshot(&self, tree: Option<&GraphNode>) -> Result<(), OutputError> {
        let tree = match tree {
            Some(t) => serde_json::to_value(t)?,
            None => Value::Null,
        };
        self.emit(&ProtocolEvent::Snapshot { tree })
    }
}

/// Appends one JSON value (compact or pretty) plus newline to `file`, or prints it.
pub fn write_json_line(
    value: &Value,
    file: Option<&PathBuf>,
    pretty: bool,
) -> Result<(), OutputError> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match file {
        Some(path) => {
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            f.write_all(format!("{}\n", s).as_bytes())?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", s)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// One-line human description of an event, or `None` for events not worth a status line.
pub fn describe(event: &GraphEvent) -> Option<String> {
    match event {
        GraphEvent::LoadingChanged {
            id: None,
            loading: true,
        } => Some("exploring...".to_string()),
        GraphEvent::LoadingChanged {
            id: Some(id),
            loading: true,
        } => Some(format!("expanding {}...", id)),
        GraphEvent::ChildrenAppended { children, .. } => {
            Some(format!("+{} nodes", children.len()))
        }
        GraphEvent::DiscoveryFailed { error, .. } => Some(format!("discovery failed: {}", error)),
        _ => None,
    }
}

/// Where forwarded events go.
#[derive(Clone)]
pub enum EventSink {
    Json(JsonOutput),
    /// Status lines on stderr.
    Status,
}

/// Forwards session events to `sink` until every sender is dropped.
pub async fn forward_events(mut rx: broadcast::Receiver<GraphEvent>, sink: EventSink) {
    loop {
        match rx.recv().await {
            Ok(event) => match &sink {
                EventSink::Json(out) => {
                    if let Err(e) = out.emit(&event.to_protocol()) {
                        tracing::warn!(error = %e, "event output failed");
                    }
                }
                EventSink::Status => {
                    if let Some(line) = describe(&event) {
                        eprintln!("{}", line);
                    }
                }
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "event forwarder lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicgraph::NodeId;

    #[test]
    fn json_output_appends_enveloped_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let out = JsonOutput::new("sess-1", Some(path.clone()), false);

        let event = GraphEvent::VisibilityChanged {
            id: NodeId::from("n-1"),
            visible: false,
        };
        out.emit(&event.to_protocol()).unwrap();
        out.clone()
            .snapshot(Some(&GraphNode::new("Oceans")))
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "visibility_changed");
        assert_eq!(lines[0]["id"], "n-1");
        assert_eq!(lines[0]["session_id"], "sess-1");
        assert_eq!(lines[0]["event_id"], 1);
        assert_eq!(lines[1]["type"], "snapshot");
        assert_eq!(lines[1]["tree"]["title"], "Oceans");
        assert_eq!(lines[1]["event_id"], 2);
    }

    #[test]
    fn describe_skips_quiet_events() {
        assert_eq!(
            describe(&GraphEvent::LoadingChanged {
                id: None,
                loading: true
            })
            .as_deref(),
            Some("exploring...")
        );
        assert!(describe(&GraphEvent::LoadingChanged {
            id: None,
            loading: false
        })
        .is_none());
        assert_eq!(
            describe(&GraphEvent::ChildrenAppended {
                parent: NodeId::from("p"),
                children: vec![NodeId::from("a"), NodeId::from("b")],
            })
            .as_deref(),
            Some("+2 nodes")
        );
    }
}
