//! Mock completion client for tests and demos.
//!
//! Returns scripted responses in order; when the script runs out, the last response
//! repeats. Records every prompt it receives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::ExplorerError;
use crate::llm::{LlmClient, LlmResponse};

type Scripted = Result<String, String>;

/// Scripted [`LlmClient`]. `Err` entries surface as [`ExplorerError::Transport`].
pub struct MockLlm {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Scripted>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockLlm {
    /// Always answers with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::from_script(vec![Ok(content.into())])
    }

    /// Answers with each entry once, in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(responses.into_iter().map(|s| Ok(s.into())).collect())
    }

    /// Always fails with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_script(vec![Err(message.into())])
    }

    /// Mixed script of successes and transport failures.
    pub fn from_script(script: Vec<Scripted>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ExplorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let scripted = match next {
            Some(s) => {
                *self.last.lock().unwrap_or_else(PoisonError::into_inner) = s.clone();
                s
            }
            None => self
                .last
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        };
        scripted
            .map(LlmResponse::text)
            .map_err(ExplorerError::Transport)
    }
}
