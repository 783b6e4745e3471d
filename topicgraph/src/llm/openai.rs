//! OpenAI-compatible chat completions client implementing [`LlmClient`].
//!
//! Sends the discovery prompt as a single user message (non-streaming) and returns the
//! first choice's text. The endpoint base and bearer credential come from
//! [`ExplorerConfig`]; any OpenAI-compatible server works.

use async_trait::async_trait;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};

/// Chat completions client.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl ChatOpenAI {
    /// Client for `config.api_base` with `config.api_key` as bearer credential.
    pub fn from_config(config: &ExplorerConfig) -> Self {
        let mut openai = OpenAIConfig::new().with_api_base(config.api_base.clone());
        if let Some(ref key) = config.api_key {
            openai = openai.with_api_key(key.clone());
        }
        Self {
            client: Client::with_config(openai),
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: 1.0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ExplorerError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(prompt),
            )])
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .top_p(self.top_p)
            .build()
            .map_err(|e| ExplorerError::Transport(format!("request build failed: {}", e)))?;

        let url = self.chat_completions_url();
        debug!(
            url = %url,
            model = %self.model,
            prompt_chars = prompt.len(),
            temperature = self.temperature,
            max_tokens = self.max_tokens,
            "chat completion create"
        );
        trace!(url = %url, prompt = %prompt, "chat completion prompt");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ExplorerError::Transport(format!("OpenAI API error: {}", e)))?;

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ExplorerError::Transport("completion returned no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        trace!(url = %url, content = %content, "chat completion response");

        Ok(LlmResponse { content, usage })
    }
}
