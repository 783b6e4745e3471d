//! Library side of the `topicgraph` binary: REPL command grammar, command execution,
//! tree rendering and event output. The binary wires these to stdin/stdout.

pub mod command;
pub mod output;
pub mod render;
pub mod run;

pub use command::{parse_command, CommandError, NodePath, ReplCommand};
pub use output::{forward_events, EventSink, JsonOutput, OutputError};
pub use render::{render_tree, truncate_message, RenderOptions};
pub use run::{execute, Reply, RunError};
