//! topicgraph CLI: explore a topic as a tree of model-suggested subtopics.
//!
//! One-shot: `topicgraph tides and the moon` prints the tree. `-i` opens a REPL to expand,
//! hide, search and inspect nodes. `--json` streams graph events as NDJSON instead.

mod log_format;
mod logging;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use topicgraph::{ChatOpenAI, DiscoveryOrchestrator, ExplorerConfig, PromptBuilder};

use cli::{forward_events, EventSink, JsonOutput, RenderOptions, Reply};

#[derive(Parser, Debug)]
#[command(name = "topicgraph")]
#[command(about = "Explore a topic as an expandable tree of subtopics")]
struct Args {
    /// Topic or question to explore
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,

    /// Minimum number of children requested per discovery
    #[arg(short = 'n', long, env = "TOPICGRAPH_MIN_CHILDREN", value_name = "N")]
    min_children: Option<u32>,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL", value_name = "MODEL")]
    model: Option<String>,

    /// Interactive REPL after the first discovery
    #[arg(short, long)]
    interactive: bool,

    /// Stream graph events as JSON lines (with session_id/event_id) instead of text
    #[arg(long)]
    json: bool,

    /// When using --json, write output to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// When using --json, pretty-print (multi-line). Default: compact, one line per event
    #[arg(long)]
    pretty: bool,

    /// Also print hidden nodes in the text tree
    #[arg(long)]
    show_hidden: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = config::load_and_apply("topicgraph", None);
    logging::init()?;
    match loaded {
        Ok(applied) => tracing::debug!(count = applied.len(), "configuration applied"),
        Err(e) => tracing::warn!(error = %e, "configuration not loaded"),
    }

    let args = Args::parse();
    let query = args.query.join(" ");
    if query.trim().is_empty() && !args.interactive {
        eprintln!("topicgraph: provide a topic as positional args, or use -i");
        std::process::exit(2);
    }

    let mut settings = ExplorerConfig::from_env()?;
    if let Some(n) = args.min_children {
        settings.min_children = n;
    }
    if let Some(model) = args.model.clone() {
        settings.model = model;
    }
    tracing::info!(
        model = %settings.model,
        api_base = %settings.api_base,
        min_children = settings.min_children,
        "starting"
    );

    let llm = Arc::new(ChatOpenAI::from_config(&settings));
    let explorer = DiscoveryOrchestrator::new(llm, PromptBuilder::new(settings.min_children));
    let session_id = explorer.session().id().to_string();

    let json = args
        .json
        .then(|| JsonOutput::new(session_id, args.file.clone(), args.pretty));
    let sink = match &json {
        Some(out) => EventSink::Json(out.clone()),
        None => EventSink::Status,
    };
    let pump = tokio::spawn(forward_events(explorer.session().subscribe(), sink));
    let render = RenderOptions {
        show_hidden: args.show_hidden,
        ..RenderOptions::default()
    };

    let mut failed = false;
    if !query.trim().is_empty() {
        match explorer.start(&query).await {
            Ok(_) if json.is_none() => {
                repl::print_reply(&explorer, Reply::Tree, None, &render)?;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {}", e);
                failed = true;
            }
        }
    }

    if args.interactive {
        if explorer.session().root_id().is_none() {
            eprintln!("type a topic to start, `help` for commands once it is explored");
        }
        repl::run_repl_loop(&explorer, json.as_ref(), &render).await?;
    }

    // Dropping the last session handle closes the event stream; the pump then drains.
    let tree = explorer.session().snapshot();
    drop(explorer);
    pump.await?;
    if let Some(out) = &json {
        out.snapshot(tree.as_ref())?;
    }

    if failed && !args.interactive {
        std::process::exit(1);
    }
    Ok(())
}
