//! `OpenAI` chat completion backend.

use crate::error::{LlmError, Result};
use crate::llm::{ChatModel, ChatRole, ChatTurn};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

/// Chat model served by the `OpenAI` API.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatModel {
    /// Creates a client for `model` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] if the key is blank.
    pub fn new(api_key: &str, model: impl Into<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(LlmError::NotConfigured.into());
        }
        let config = OpenAIConfig::new().with_api_key(api_key);
        Ok(Self {
            client: Client::with_config(config),
            model: model.into(),
        })
    }
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn to_request_message(turn: &ChatTurn) -> ChatCompletionRequestMessage {
    let text = turn.content.clone();
    match turn.role {
        ChatRole::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(text),
            name: None,
        }),
        ChatRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(text),
            name: None,
        }),
        ChatRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
                ..Default::default()
            })
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, turns: &[ChatTurn], max_tokens: u32, temperature: f32) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(turns.iter().map(to_request_message).collect::<Vec<_>>())
            .max_completion_tokens(max_tokens)
            .temperature(temperature)
            .build()
            .map_err(LlmError::from)?;

        let response = self.client.chat().create(request).await.map_err(LlmError::from)?;
        tracing::debug!(model = %self.model, choices = response.choices.len(), "chat completion");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::EmptyResponse.into())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            OpenAiChatModel::new("  ", "gpt-3.5-turbo"),
            Err(crate::Error::Llm(LlmError::NotConfigured))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let model = OpenAiChatModel::new("sk-test-not-a-real-key", "gpt-3.5-turbo").unwrap();
        let debug = format!("{model:?}");
        assert!(debug.contains("gpt-3.5-turbo"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_request_message_roles() {
        let system = to_request_message(&ChatTurn::system("rules"));
        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));
        let user = to_request_message(&ChatTurn::user("hi"));
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
        let assistant = to_request_message(&ChatTurn::assistant("hello"));
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));
    }
}
