//! Conversation analytics.
//!
//! Aggregates recorded exchanges and the failure counter into a report.

use crate::core::{Exchange, ReplySource};
use crate::error::Result;
use crate::storage::Storage;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of exchanges included in `recent_conversations`.
pub const RECENT_CONVERSATIONS: usize = 10;

/// Snapshot of bot usage.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    /// Answered plus failed messages.
    pub total_requests: usize,
    /// Messages answered and recorded.
    pub successful_responses: usize,
    /// Messages that could not be recorded.
    pub failed_responses: usize,
    /// Successful share of all requests, in percent.
    pub success_rate: f64,
    /// Mean response time in seconds.
    pub average_response_time: f64,
    /// Recorded exchanges per intent.
    pub intent_distribution: BTreeMap<String, usize>,
    /// Recorded exchanges per reply source.
    pub source_distribution: BTreeMap<String, usize>,
    /// Exchanges answered by the language model.
    pub language_model_requests: usize,
    /// Exchanges answered by the local matchers and fallback.
    pub local_requests: usize,
    /// Language-model share of recorded exchanges, in percent.
    pub language_model_share: f64,
    /// The latest exchanges, oldest first.
    pub recent_conversations: Vec<Exchange>,
}

impl AnalyticsReport {
    /// Builds a report from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if any storage query fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_storage<S: Storage + ?Sized>(storage: &S) -> Result<Self> {
        let successful_responses = storage.exchange_count()?;
        let failed_responses = storage.failure_count()?;
        let total_requests = successful_responses + failed_responses;

        let success_rate = if total_requests == 0 {
            0.0
        } else {
            successful_responses as f64 / total_requests as f64 * 100.0
        };

        let source_distribution = storage.source_distribution()?;
        let language_model_requests = source_distribution
            .get(ReplySource::LanguageModel.as_str())
            .copied()
            .unwrap_or(0);
        let local_requests = successful_responses.saturating_sub(language_model_requests);
        let language_model_share = if successful_responses == 0 {
            0.0
        } else {
            language_model_requests as f64 / successful_responses as f64 * 100.0
        };

        Ok(Self {
            total_requests,
            successful_responses,
            failed_responses,
            success_rate,
            average_response_time: storage.average_response_time()?,
            intent_distribution: storage.intent_distribution()?,
            source_distribution,
            language_model_requests,
            local_requests,
            language_model_share,
            recent_conversations: storage.recent_exchanges(RECENT_CONVERSATIONS)?,
        })
    }

    /// Success rate as `"{:.1}%"`.
    #[must_use]
    pub fn success_rate_display(&self) -> String {
        format!("{:.1}%", self.success_rate)
    }

    /// Language-model share as `"{:.1}%"`.
    #[must_use]
    pub fn language_model_share_display(&self) -> String {
        format!("{:.1}%", self.language_model_share)
    }

    /// Average response time as `"{:.2}s"`.
    #[must_use]
    pub fn average_response_time_display(&self) -> String {
        format!("{:.2}s", self.average_response_time)
    }

    /// Intents sorted by count, most frequent first (name breaks ties).
    #[must_use]
    pub fn top_intents(&self) -> Vec<(&str, usize)> {
        let mut intents: Vec<(&str, usize)> = self
            .intent_distribution
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        intents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Reply, ReplySource};
    use crate::storage::MemoryStorage;

    fn record(storage: &mut MemoryStorage, intent: &str, seconds: f64) {
        record_from(storage, intent, seconds, ReplySource::Dataset);
    }

    fn record_from(storage: &mut MemoryStorage, intent: &str, seconds: f64, source: ReplySource) {
        let reply = Reply::new("ok", intent, 0.9, source).with_response_time(seconds);
        storage
            .add_exchange(&Exchange::from_reply(None, "msg", &reply))
            .unwrap();
    }

    #[test]
    fn test_empty_report() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        let report = AnalyticsReport::from_storage(&storage).unwrap();
        assert_eq!(report.total_requests, 0);
        assert_eq!(report.success_rate_display(), "0.0%");
        assert_eq!(report.average_response_time_display(), "0.00s");
        assert_eq!(report.language_model_share_display(), "0.0%");
        assert!(report.source_distribution.is_empty());
        assert!(report.recent_conversations.is_empty());
    }

    #[test]
    fn test_report_counts() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        record(&mut storage, "greeting", 0.1);
        record(&mut storage, "greeting", 0.2);
        record(&mut storage, "returns", 0.3);
        storage.record_failure().unwrap();

        let report = AnalyticsReport::from_storage(&storage).unwrap();
        assert_eq!(report.total_requests, 4);
        assert_eq!(report.successful_responses, 3);
        assert_eq!(report.failed_responses, 1);
        assert_eq!(report.success_rate_display(), "75.0%");
        assert_eq!(report.average_response_time_display(), "0.20s");
        assert_eq!(report.top_intents(), vec![("greeting", 2), ("returns", 1)]);
    }

    #[test]
    fn test_language_model_usage() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        record_from(&mut storage, "openai_response", 0.8, ReplySource::LanguageModel);
        record_from(&mut storage, "shipping", 0.1, ReplySource::Keyword);
        record_from(&mut storage, "returns", 0.1, ReplySource::Dataset);
        record_from(&mut storage, "fallback", 0.1, ReplySource::Fallback);
        storage.record_failure().unwrap();

        let report = AnalyticsReport::from_storage(&storage).unwrap();
        assert_eq!(report.language_model_requests, 1);
        assert_eq!(report.local_requests, 3);
        assert_eq!(report.language_model_share_display(), "25.0%");
        assert_eq!(report.source_distribution["dataset"], 1);
        assert_eq!(report.source_distribution.len(), 4);
    }

    #[test]
    fn test_recent_conversations_capped() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        for _ in 0..15 {
            record(&mut storage, "greeting", 0.0);
        }
        let report = AnalyticsReport::from_storage(&storage).unwrap();
        assert_eq!(report.recent_conversations.len(), RECENT_CONVERSATIONS);
        assert_eq!(report.recent_conversations[0].id, Some(6));
    }
}
