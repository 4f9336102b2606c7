//! Minimal Telegram Bot API client.

use crate::error::{Result, TelegramError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Bot API endpoint.
pub const API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Envelope around every Bot API result.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                description: self
                    .description
                    .unwrap_or_else(|| "request was not successful".to_string()),
            }
            .into()),
        }
    }
}

/// One incoming update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    pub update_id: i64,
    /// New message, if the update carries one.
    pub message: Option<Message>,
}

impl Update {
    /// `(chat_id, user_id, text)` for plain text messages.
    #[must_use]
    pub fn text_message(&self) -> Option<(i64, i64, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        let user_id = message.from.as_ref().map_or(message.chat.id, |user| user.id);
        Some((message.chat.id, user_id, text))
    }
}

/// Incoming message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    pub message_id: i64,
    /// Chat the message was sent in.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    pub from: Option<User>,
    /// Text body.
    pub text: Option<String>,
}

/// Chat reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,
}

/// Message sender.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,
    /// Public username.
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// HTTP client for one bot token.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Creates a client for `token`.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::MissingToken`] for a blank token, or a
    /// transport error if the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_base(token, API_BASE)
    }

    /// Creates a client against a custom API base URL.
    ///
    /// # Errors
    ///
    /// Same as [`TelegramClient::new`].
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TelegramError::MissingToken.into());
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .map_err(TelegramError::from)?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(TelegramError::from)?;
        let envelope: ApiResponse<T> = response.json().await.map_err(TelegramError::from)?;
        envelope.into_result()
    }

    /// Long-polls for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an API-level rejection.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &GetUpdates {
                    offset,
                    timeout: timeout_secs,
                    allowed_updates: &["message"],
                },
            )
            .await?;
        debug!(count = updates.len(), ?offset, "received updates");
        Ok(updates)
    }

    /// Sends `text` to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an API-level rejection.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _sent: Message = self.call("sendMessage", &SendMessage { chat_id, text }).await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

/// Offset for the next `getUpdates` call, past every update in `updates`.
#[must_use]
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|update| update.update_id + 1)
        .chain(current)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPDATES: &str = r#"{
        "ok": true,
        "result": [
            {"update_id": 100, "message": {"message_id": 1, "chat": {"id": 55}, "from": {"id": 7, "username": "ana"}, "text": "Where is my order?"}},
            {"update_id": 101, "message": {"message_id": 2, "chat": {"id": 55}, "from": {"id": 7}}},
            {"update_id": 102}
        ]
    }"#;

    #[test]
    fn test_decode_updates() {
        let envelope: ApiResponse<Vec<Update>> = serde_json::from_str(UPDATES).unwrap();
        let updates = envelope.into_result().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].text_message(), Some((55, 7, "Where is my order?")));
        assert_eq!(updates[1].text_message(), None);
        assert_eq!(updates[2].text_message(), None);
        assert_eq!(next_offset(None, &updates), Some(103));
    }

    #[test]
    fn test_api_error() {
        let envelope: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Telegram(TelegramError::Api { ref description }) if description == "Unauthorized"
        ));
    }

    #[test]
    fn test_next_offset_keeps_current_when_idle() {
        assert_eq!(next_offset(Some(42), &[]), Some(42));
        assert_eq!(next_offset(None, &[]), None);
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(
            TelegramClient::new("   "),
            Err(crate::Error::Telegram(TelegramError::MissingToken))
        ));
    }

    #[test]
    fn test_method_url_and_debug() {
        let client = TelegramClient::with_api_base("123:abc", "https://telegram.example/").unwrap();
        assert_eq!(client.method_url("getUpdates"), "https://telegram.example/bot123:abc/getUpdates");
        assert!(!format!("{client:?}").contains("123:abc"));
    }
}
