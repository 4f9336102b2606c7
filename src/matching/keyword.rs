//! Keyword matcher over the intent catalog.

use crate::core::{IntentCatalog, ReplySource};
use crate::matching::traits::{IntentMatch, IntentMatcher};

/// Number of keyword hits that yields full confidence.
pub const FULL_CONFIDENCE_HITS: f64 = 3.0;

/// Scores every catalog intent by keyword hits.
///
/// Keywords match as substrings of the lowercased input. The highest score
/// wins; on a tie the earlier intent in the catalog keeps the match.
/// Confidence is `min(hits / 3, 1.0)`.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    catalog: IntentCatalog,
}

impl KeywordMatcher {
    /// Creates a matcher over `catalog`.
    #[must_use]
    pub const fn new(catalog: IntentCatalog) -> Self {
        Self { catalog }
    }
}

impl IntentMatcher for KeywordMatcher {
    #[allow(clippy::cast_precision_loss)]
    fn match_intent(&self, input: &str) -> Option<IntentMatch> {
        let lowered = input.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for intent in &self.catalog {
            let hits = intent.keyword_hits(&lowered);
            if hits > best.map_or(0, |(_, score)| score) {
                best = Some((intent.name.as_str(), hits));
            }
        }

        let (intent, hits) = best?;
        let confidence = (hits as f64 / FULL_CONFIDENCE_HITS).min(1.0);
        tracing::debug!(intent, hits, confidence, "keyword match");

        Some(IntentMatch {
            intent: intent.to_string(),
            confidence,
            response: None,
            source: ReplySource::Keyword,
        })
    }

    fn name(&self) -> &'static str {
        "keyword"
    }

    fn description(&self) -> &'static str {
        "Counts catalog keywords found in the message; most hits wins"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Intent;
    use test_case::test_case;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(IntentCatalog::customer_support())
    }

    #[test_case("How long does shipping take?", "shipping" ; "shipping question")]
    #[test_case("I want a refund", "returns" ; "refund request")]
    #[test_case("What payment methods do you accept?", "payment" ; "payment methods")]
    #[test_case("I forgot my password", "account" ; "password reset")]
    #[test_case("goodbye", "goodbye" ; "goodbye")]
    fn test_matches_intent(input: &str, expected: &str) {
        assert_eq!(matcher().match_intent(input).unwrap().intent, expected);
    }

    #[test]
    fn test_confidence_scales_with_hits() {
        // "order", "status", "where is my order" -> 3 hits
        let found = matcher().match_intent("Where is my order? Status please").unwrap();
        assert_eq!(found.intent, "order_status");
        assert!((found.confidence - 1.0).abs() < f64::EPSILON);

        let found = matcher().match_intent("refund").unwrap();
        assert!((found.confidence - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_match() {
        assert!(matcher().match_intent("xyzzy").is_none());
    }

    #[test]
    fn test_tie_keeps_earlier_intent() {
        let catalog = IntentCatalog::new(vec![
            Intent::new("first", &["alpha"], &["1"]),
            Intent::new("second", &["alpha"], &["2"]),
        ])
        .unwrap();
        let found = KeywordMatcher::new(catalog).match_intent("ALPHA").unwrap();
        assert_eq!(found.intent, "first");
        assert_eq!(found.source, ReplySource::Keyword);
        assert!(found.response.is_none());
    }
}
