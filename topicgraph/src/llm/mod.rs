//! Completion collaborator: a prompt in, raw assistant text out.
//!
//! The orchestrator depends only on [`LlmClient`]; it never sees the model, provider or
//! transport. Implementations: [`ChatOpenAI`] (OpenAI-compatible chat completions) and
//! [`MockLlm`] (scripted responses for tests).

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::ExplorerError;

/// Token usage for one completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Raw completion: unvalidated assistant text plus optional usage.
#[derive(Clone, Debug)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// Completion collaborator: sends one prompt, returns the assistant text.
///
/// Transport, HTTP status and credential failures are reported as
/// [`ExplorerError::Transport`]. Cancellation is dropping the returned future.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ExplorerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubLlm {
        content: String,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ExplorerError> {
            Ok(LlmResponse::text(format!("{}:{}", self.content, prompt)))
        }
    }

    #[tokio::test]
    async fn trait_object_invokes_implementation() {
        let llm: Box<dyn LlmClient> = Box::new(StubLlm {
            content: "echo".to_string(),
        });
        let resp = llm.invoke("hi").await.unwrap();
        assert_eq!(resp.content, "echo:hi");
        assert!(resp.usage.is_none());
    }
}
