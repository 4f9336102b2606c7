//! Recorded conversation turns.

use crate::core::reply::{Reply, ReplySource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session identifier used when the caller supplies none.
pub const DEFAULT_SESSION: &str = "default";

/// One user message and the bot's reply, as stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Storage ID (None if not yet persisted).
    pub id: Option<i64>,
    /// Conversation/session identifier.
    pub session_id: String,
    /// What the user wrote.
    pub user_input: String,
    /// Detected intent.
    pub intent: String,
    /// Reply text.
    pub response: String,
    /// Match confidence.
    pub confidence: f64,
    /// Processing time in seconds.
    pub response_time: f64,
    /// Producer of the reply.
    pub source: ReplySource,
    /// When the exchange happened.
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    /// Builds an exchange from a reply.
    ///
    /// A missing or blank session falls back to [`DEFAULT_SESSION`].
    #[must_use]
    pub fn from_reply(session_id: Option<&str>, user_input: &str, reply: &Reply) -> Self {
        let session_id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_string();

        Self {
            id: None,
            session_id,
            user_input: user_input.to_string(),
            intent: reply.intent.clone(),
            response: reply.text.clone(),
            confidence: reply.confidence,
            response_time: reply.response_time,
            source: reply.source,
            created_at: reply.timestamp,
        }
    }
}
