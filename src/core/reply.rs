//! Bot replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the bot produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// Catalog keyword matcher.
    Keyword,
    /// Training-dialog matcher.
    Dataset,
    /// Hosted language model.
    LanguageModel,
    /// No intent matched.
    Fallback,
    /// Engine-generated reply (empty input, recording failure).
    System,
}

impl ReplySource {
    /// Stable string form, used in storage and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Dataset => "dataset",
            Self::LanguageModel => "language_model",
            Self::Fallback => "fallback",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(Self::Keyword),
            "dataset" => Ok(Self::Dataset),
            "language_model" => Ok(Self::LanguageModel),
            "fallback" => Ok(Self::Fallback),
            "system" => Ok(Self::System),
            other => Err(format!("unknown reply source: {other}")),
        }
    }
}

/// A single bot reply to a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Reply text shown to the user.
    pub text: String,
    /// Detected intent name.
    pub intent: String,
    /// Match confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Processing time in seconds.
    pub response_time: f64,
    /// When the reply was produced.
    pub timestamp: DateTime<Utc>,
    /// Producer of the reply.
    pub source: ReplySource,
    /// Model name for language-model replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Reply {
    /// Creates a reply stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, intent: impl Into<String>, confidence: f64, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            intent: intent.into(),
            confidence,
            response_time: 0.0,
            timestamp: Utc::now(),
            source,
            model: None,
        }
    }

    /// Sets the measured processing time.
    #[must_use]
    pub const fn with_response_time(mut self, seconds: f64) -> Self {
        self.response_time = seconds;
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trip_strings() {
        for source in [
            ReplySource::Keyword,
            ReplySource::Dataset,
            ReplySource::LanguageModel,
            ReplySource::Fallback,
            ReplySource::System,
        ] {
            assert_eq!(source.as_str().parse::<ReplySource>(), Ok(source));
        }
        assert!("bogus".parse::<ReplySource>().is_err());
    }

    #[test]
    fn test_reply_json_shape() {
        let reply = Reply::new("hi", "greeting", 0.5, ReplySource::Keyword).with_response_time(0.01);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["source"], "keyword");
        assert_eq!(json["intent"], "greeting");
        assert!(json.get("model").is_none());

        let json = serde_json::to_value(reply.with_model("gpt-3.5-turbo")).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
    }
}
