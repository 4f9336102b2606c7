//! Intent matcher trait definition.
//!
//! Defines the interface for matching strategies, enabling pluggable
//! intent detection approaches.

use crate::core::ReplySource;
use serde::Serialize;

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentMatch {
    /// Matched intent name.
    pub intent: String,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Reply text chosen by the matcher, if it picks one itself.
    pub response: Option<String>,
    /// Which matcher produced this.
    pub source: ReplySource,
}

/// Trait for turning user input into an intent.
///
/// Implementations must be `Send + Sync` so a bot can be shared by a
/// long-running front end. Matching is deterministic for a given input.
///
/// # Examples
///
/// ```
/// use supportbot::core::IntentCatalog;
/// use supportbot::matching::{IntentMatcher, KeywordMatcher};
///
/// let matcher = KeywordMatcher::new(IntentCatalog::customer_support());
/// let found = matcher.match_intent("Where is my order?").unwrap();
/// assert_eq!(found.intent, "order_status");
/// ```
pub trait IntentMatcher: Send + Sync {
    /// Matches `input` against known intents.
    ///
    /// Returns `None` when nothing matches.
    fn match_intent(&self, input: &str) -> Option<IntentMatch>;

    /// Returns the name of the matching strategy.
    fn name(&self) -> &'static str;

    /// Returns a description of the matching strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
