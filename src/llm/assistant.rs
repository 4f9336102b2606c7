//! Support persona with rolling history, sentiment and summaries.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ModelSettings;
use crate::core::{Exchange, Reply, ReplySource};
use crate::error::Result;
use crate::llm::prompt::{
    SENTIMENT_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT, SUPPORT_SYSTEM_PROMPT, build_transcript,
    build_user_prompt,
};
use crate::llm::{ChatModel, ChatTurn};

/// Intent recorded on language-model replies.
pub const LLM_INTENT: &str = "openai_response";

/// Confidence recorded on language-model replies.
pub const LLM_CONFIDENCE: f64 = 0.95;

const SENTIMENT_MAX_TOKENS: u32 = 10;
const SENTIMENT_TEMPERATURE: f32 = 0.1;
const SENTIMENT_CONFIDENCE: f64 = 0.8;
const UNKNOWN_SENTIMENT_CONFIDENCE: f64 = 0.5;

const SUMMARY_MAX_TOKENS: u32 = 100;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Summary text for an empty history.
pub const EMPTY_SUMMARY: &str = "No conversation to summarize.";

/// Summary text when the model call fails.
pub const FAILED_SUMMARY: &str = "Unable to generate summary.";

/// Sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Happy or satisfied.
    Positive,
    /// Upset or dissatisfied.
    Negative,
    /// Neither, or undetermined.
    Neutral,
}

impl SentimentLabel {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    fn parse(answer: &str) -> Option<Self> {
        let word = answer
            .trim()
            .trim_end_matches(['.', '!'])
            .to_lowercase();
        match word.as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of sentiment analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    /// Detected class.
    pub label: SentimentLabel,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl Sentiment {
    const fn unknown() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: UNKNOWN_SENTIMENT_CONFIDENCE,
        }
    }
}

/// Language-model support assistant.
///
/// Keeps the last `history_window` exchanges and replays them ahead of
/// each new message.
pub struct Assistant {
    model: Box<dyn ChatModel>,
    settings: ModelSettings,
    history: VecDeque<(String, String)>,
}

impl Assistant {
    /// Creates an assistant over `model`.
    #[must_use]
    pub fn new(model: Box<dyn ChatModel>, settings: ModelSettings) -> Self {
        Self {
            model,
            settings,
            history: VecDeque::new(),
        }
    }

    /// Model settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Remembered `(user, assistant)` pairs, oldest first.
    pub fn history(&self) -> impl Iterator<Item = (&str, &str)> {
        self.history.iter().map(|(u, a)| (u.as_str(), a.as_str()))
    }

    /// Forgets the conversation so far.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn support_turns(&self, message: &str, context: &str) -> Vec<ChatTurn> {
        let mut turns = Vec::with_capacity(self.history.len() * 2 + 2);
        turns.push(ChatTurn::system(SUPPORT_SYSTEM_PROMPT));
        for (user, assistant) in &self.history {
            turns.push(ChatTurn::user(user.as_str()));
            turns.push(ChatTurn::assistant(assistant.as_str()));
        }
        turns.push(ChatTurn::user(build_user_prompt(message, context)));
        turns
    }

    fn remember(&mut self, message: &str, answer: &str) {
        if self.settings.history_window == 0 {
            return;
        }
        while self.history.len() >= self.settings.history_window {
            self.history.pop_front();
        }
        self.history.push_back((message.to_string(), answer.to_string()));
    }

    /// Answers `message`, optionally grounded by `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails. History is left unchanged
    /// in that case.
    pub async fn respond(&mut self, message: &str, context: &str) -> Result<Reply> {
        let turns = self.support_turns(message, context);
        let text = self
            .model
            .complete(&turns, self.settings.max_tokens, self.settings.temperature)
            .await?;

        self.remember(message, &text);
        debug!(model = self.model.model_name(), history = self.history.len(), "assistant replied");

        Ok(Reply::new(text, LLM_INTENT, LLM_CONFIDENCE, ReplySource::LanguageModel)
            .with_model(self.model.model_name()))
    }

    /// Labels `text` as positive, negative or neutral.
    ///
    /// Falls back to neutral with low confidence when the model fails or
    /// answers with anything else.
    pub async fn analyze_sentiment(&self, text: &str) -> Sentiment {
        let turns = [ChatTurn::system(SENTIMENT_SYSTEM_PROMPT), ChatTurn::user(text)];
        match self
            .model
            .complete(&turns, SENTIMENT_MAX_TOKENS, SENTIMENT_TEMPERATURE)
            .await
        {
            Ok(answer) => SentimentLabel::parse(&answer).map_or_else(Sentiment::unknown, |label| Sentiment {
                label,
                confidence: SENTIMENT_CONFIDENCE,
            }),
            Err(e) => {
                warn!(error = %e, "sentiment analysis failed");
                Sentiment::unknown()
            }
        }
    }

    /// Summarizes `exchanges` in a few sentences.
    pub async fn summarize(&self, exchanges: &[Exchange]) -> String {
        if exchanges.is_empty() {
            return EMPTY_SUMMARY.to_string();
        }
        let turns = [
            ChatTurn::system(SUMMARY_SYSTEM_PROMPT),
            ChatTurn::user(build_transcript(exchanges)),
        ];
        match self
            .model
            .complete(&turns, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summary generation failed");
                FAILED_SUMMARY.to_string()
            }
        }
    }
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("model", &self.model.model_name())
            .field("settings", &self.settings)
            .field("history", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::ChatRole;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Replays canned answers and records every request.
    struct ScriptedModel {
        answers: Mutex<VecDeque<Option<String>>>,
        requests: Arc<Mutex<Vec<(Vec<ChatTurn>, u32)>>>,
    }

    impl ScriptedModel {
        fn new(answers: &[Option<&str>]) -> (Self, Arc<Mutex<Vec<(Vec<ChatTurn>, u32)>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let model = Self {
                answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
                requests: Arc::clone(&requests),
            };
            (model, requests)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, turns: &[ChatTurn], max_tokens: u32, _temperature: f32) -> Result<String> {
            self.requests.lock().unwrap().push((turns.to_vec(), max_tokens));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .flatten()
                .ok_or_else(|| LlmError::Request("scripted failure".to_string()).into())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn assistant(answers: &[Option<&str>], window: usize) -> (Assistant, Arc<Mutex<Vec<(Vec<ChatTurn>, u32)>>>) {
        let (model, requests) = ScriptedModel::new(answers);
        let settings = ModelSettings {
            history_window: window,
            ..ModelSettings::default()
        };
        (Assistant::new(Box::new(model), settings), requests)
    }

    #[tokio::test]
    async fn test_respond_builds_reply() {
        let (mut bot, requests) = assistant(&[Some("Your order ships tomorrow.")], 6);
        let reply = bot.respond("Where is my order?", "order #12345").await.unwrap();

        assert_eq!(reply.text, "Your order ships tomorrow.");
        assert_eq!(reply.intent, LLM_INTENT);
        assert!((reply.confidence - LLM_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(reply.source, ReplySource::LanguageModel);
        assert_eq!(reply.model.as_deref(), Some("scripted"));

        let requests = requests.lock().unwrap();
        let (turns, max_tokens) = &requests[0];
        assert_eq!(*max_tokens, 150);
        assert_eq!(turns[0].role, ChatRole::System);
        assert_eq!(turns[1].content, "Context: order #12345\nUser: Where is my order?");
    }

    #[tokio::test]
    async fn test_history_precedes_new_message_and_is_bounded() {
        let (mut bot, requests) = assistant(&[Some("a1"), Some("a2"), Some("a3")], 2);
        bot.respond("q1", "").await.unwrap();
        bot.respond("q2", "").await.unwrap();
        bot.respond("q3", "").await.unwrap();

        let requests = requests.lock().unwrap();
        let contents: Vec<&str> = requests[2].0.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents[1..], ["q1", "a1", "q2", "a2", "q3"]);

        let remembered: Vec<_> = bot.history().collect();
        assert_eq!(remembered, vec![("q2", "a2"), ("q3", "a3")]);

        bot.clear_history();
        assert_eq!(bot.history().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_respond_keeps_history() {
        let (mut bot, _) = assistant(&[Some("a1"), None], 6);
        bot.respond("q1", "").await.unwrap();
        assert!(bot.respond("q2", "").await.is_err());
        assert_eq!(bot.history().count(), 1);
    }

    #[tokio::test]
    async fn test_sentiment() {
        let (bot, requests) = assistant(&[Some("Negative."), Some("mixed"), None], 6);

        let sentiment = bot.analyze_sentiment("This is terrible").await;
        assert_eq!(sentiment.label, SentimentLabel::Negative);
        assert!((sentiment.confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(requests.lock().unwrap()[0].1, 10);

        let unclear = bot.analyze_sentiment("hmm").await;
        assert_eq!(unclear.label, SentimentLabel::Neutral);
        assert!((unclear.confidence - 0.5).abs() < f64::EPSILON);

        let failed = bot.analyze_sentiment("anything").await;
        assert_eq!(failed.label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn test_summarize() {
        let (bot, requests) = assistant(&[Some("Customer asked about a refund."), None], 6);
        assert_eq!(bot.summarize(&[]).await, EMPTY_SUMMARY);
        assert!(requests.lock().unwrap().is_empty());

        let reply = Reply::new("Refunds take 5-7 days.", "refund", 0.9, ReplySource::Keyword);
        let exchanges = vec![Exchange::from_reply(None, "Refund?", &reply)];
        assert_eq!(bot.summarize(&exchanges).await, "Customer asked about a refund.");
        assert!(requests.lock().unwrap()[0].0[1].content.starts_with("User: Refund?"));

        assert_eq!(bot.summarize(&exchanges).await, FAILED_SUMMARY);
    }
}
