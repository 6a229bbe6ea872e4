//! Chat-completion backends.
//!
//! The scorer only sees [`ChatModel`]; which vendor answers is decided once
//! from [`LlmConfig`] when the ranking session is built.

mod gemini;
mod openai;

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::config::{LlmConfig, LlmProvider};
use crate::error::Result;

pub use gemini::GeminiChat;
pub use openai::OpenAiChat;

/// Role tag of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation
    System,
    /// End-user turn
    User,
    /// Model turn
    Assistant,
}

/// Individual message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (user, assistant, system)
    pub role: Role,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// A user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat/completion interface returning free text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends `messages` and returns the text of the first reply
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Builds the backend selected in the configuration
pub fn build_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    let model: Arc<dyn ChatModel> = match config.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiChat::new(config)?),
        LlmProvider::Gemini => Arc::new(GeminiChat::new(config)?),
    };
    log::info!("Using {} model {}", config.provider, config.model());
    Ok(model)
}
