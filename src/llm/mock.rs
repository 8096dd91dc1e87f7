/// Scripted LLM used by tests and offline runs
use super::{ChatMessage, LLMProvider, LLMResponse, LLM};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replies are consumed in order; an exhausted script behaves like a
/// transport failure.
pub struct MockLLM {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    provider: LLMProvider,
}

impl MockLLM {
    /// `Err` entries are returned as transport errors
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            provider: LLMProvider::Gemini,
        }
    }

    /// Answers every prompt with an error
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    /// Last message of every chat call, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LLM for MockLLM {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        if let (Ok(mut prompts), Some(last)) = (self.prompts.lock(), messages.last()) {
            prompts.push(last.content.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| anyhow!("mock reply queue poisoned"))?
            .pop_front();

        match next {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                tokens_used: None,
            }),
            Some(Err(message)) => Err(anyhow!("Mock transport error: {}", message)),
            None => Err(anyhow!("Mock LLM has no scripted reply left")),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_type(&self) -> LLMProvider {
        self.provider
    }
}
