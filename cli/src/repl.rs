//! Interactive REPL: read a command, run it, print the result, repeat until EOF or `quit`.
//!
//! Until a root exists every line is taken as the topic to explore. Errors from a command
//! are printed to stderr and the loop continues.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use topicgraph::DiscoveryOrchestrator;

use cli::{execute, parse_command, render_tree, JsonOutput, RenderOptions, Reply, ReplCommand};

pub async fn run_repl_loop(
    explorer: &DiscoveryOrchestrator,
    json: Option<&JsonOutput>,
    render: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();

    loop {
        eprint!("> ");
        std::io::stderr().flush()?;

        let Some(line) = reader.next_line().await? else {
            break;
        };
        if explorer.session().root_id().is_none() {
            if line.trim().is_empty() {
                continue;
            }
            if matches!(parse_command(&line), Ok(Some(ReplCommand::Quit))) {
                break;
            }
            match explorer.start(line.trim()).await {
                Ok(_) => print_reply(explorer, Reply::Tree, json, render)?,
                Err(e) => eprintln!("error: {}", e),
            }
            continue;
        }
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match execute(explorer, cmd).await {
            Ok(Reply::Quit) => break,
            Ok(reply) => print_reply(explorer, reply, json, render)?,
            Err(e) => {
                eprintln!("error: {}", e);
                if let Some(hint) = e.hint() {
                    eprintln!("{}", hint);
                }
            }
        }
    }

    eprintln!("Bye.");
    Ok(())
}

/// Prints a command result. In `--json` mode trees go out as `snapshot` events.
pub fn print_reply(
    explorer: &DiscoveryOrchestrator,
    reply: Reply,
    json: Option<&JsonOutput>,
    render: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    match (reply, json) {
        (Reply::Message(text), _) => println!("{}", text),
        (Reply::Tree, Some(out)) => out.snapshot(explorer.session().snapshot().as_ref())?,
        (Reply::Tree, None) => match explorer.session().snapshot() {
            Some(root) => print!("{}", render_tree(&root, render)),
            None => println!("(empty)"),
        },
        (Reply::Json(tree), Some(out)) => out.snapshot(tree.as_ref())?,
        (Reply::Json(tree), None) => println!("{}", serde_json::to_string_pretty(&tree)?),
        (Reply::Quit, _) => {}
    }
    std::io::stdout().flush()?;
    Ok(())
}
