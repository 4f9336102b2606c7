//! Hosted language-model responder.
//!
//! [`ChatModel`] abstracts a chat completion backend; [`OpenAiChatModel`]
//! is the production implementation. [`Assistant`] layers the support
//! persona, rolling conversation history, sentiment labelling and
//! conversation summaries on top of any backend.

mod assistant;
mod openai;
pub mod prompt;

pub use assistant::{Assistant, Sentiment, SentimentLabel};
pub use openai::OpenAiChatModel;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model.
    System,
    /// Customer message.
    User,
    /// Earlier model reply.
    Assistant,
}

/// One message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    /// Message author.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatTurn {
    /// A system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Completes the conversation in `turns` and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the model answers with no
    /// content.
    async fn complete(&self, turns: &[ChatTurn], max_tokens: u32, temperature: f32) -> Result<String>;

    /// Model identifier reported on replies.
    fn model_name(&self) -> &str;
}
