//! Ordered composition of matchers.

use crate::matching::traits::{IntentMatch, IntentMatcher};

/// Tries matchers in order; the first to return a match wins.
#[derive(Default)]
pub struct MatcherChain {
    matchers: Vec<Box<dyn IntentMatcher>>,
}

impl MatcherChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a matcher to the end of the chain.
    #[must_use]
    pub fn with(mut self, matcher: Box<dyn IntentMatcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Names of the chained matchers, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Number of matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns true if the chain has no matchers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl std::fmt::Debug for MatcherChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherChain")
            .field("matchers", &self.names())
            .finish()
    }
}

impl IntentMatcher for MatcherChain {
    fn match_intent(&self, input: &str) -> Option<IntentMatch> {
        self.matchers.iter().find_map(|m| m.match_intent(input))
    }

    fn name(&self) -> &'static str {
        "layered"
    }

    fn description(&self) -> &'static str {
        "Runs matchers in order and keeps the first match"
    }
}
