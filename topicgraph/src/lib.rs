//! # topicgraph
//!
//! Topic exploration as an expandable node tree. A query goes to a language model with a
//! fixed JSON schema; the (untrusted, often malformed) completion is repaired, parsed into
//! a [`GraphNode`] tree and grafted into the session. Any node can be discovered again to
//! append more children.
//!
//! ## Pipeline
//!
//! [`build_prompt`] → [`LlmClient::invoke`] → [`sanitize`] → [`parse`] → merge into
//! [`ExplorerSession`], driven by [`DiscoveryOrchestrator`].
//!
//! ## Main modules
//!
//! - [`prompt`]: [`build_prompt`], [`PromptBuilder`].
//! - [`sanitize`]: first-`{`..last-`}` extraction and best-effort JSON repair.
//! - [`parse`]: lenient JSON → [`GraphNode`] with fresh [`NodeId`]s.
//! - [`graph`]: [`SessionGraph`] mutations and [`GraphEvent`] notifications.
//! - [`session`]: [`ExplorerSession`], the shared tree plus event broadcast.
//! - [`discovery`]: [`DiscoveryOrchestrator`] (`start`, `discover`).
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`].
//! - [`config`]: [`ExplorerConfig`] from the environment.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use topicgraph::{DiscoveryOrchestrator, MockLlm, PromptBuilder};
//!
//! # async fn run() -> Result<(), topicgraph::ExplorerError> {
//! let llm = Arc::new(MockLlm::new(r#"{"title":"Tides","children":[{"title":"Moon"}]}"#));
//! let explorer = DiscoveryOrchestrator::new(llm, PromptBuilder::new(3));
//! let root = explorer.start("tides").await?;
//! explorer.discover(&root, "tidal forces").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod llm;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod sanitize;
pub mod session;

pub use config::{ConfigError, ExplorerConfig};
pub use discovery::DiscoveryOrchestrator;
pub use error::ExplorerError;
pub use graph::{GraphEvent, SessionGraph};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use model::{GraphNode, NodeId};
pub use parse::parse;
pub use prompt::{build_prompt, PromptBuilder};
pub use sanitize::sanitize;
pub use session::ExplorerSession;
