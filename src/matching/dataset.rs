//! Matcher driven by training dialogs.

use crate::core::ReplySource;
use crate::dataset::{Dataset, generate_variations};
use crate::matching::traits::{IntentMatch, IntentMatcher};

/// Confidence when the message is contained in an example input.
pub const DIRECT_MATCH_CONFIDENCE: f64 = 0.9;

/// Confidence when the message is contained in a generated variation.
pub const VARIATION_MATCH_CONFIDENCE: f64 = 0.8;

/// Confidence contributed by each keyword hit.
pub const KEYWORD_STEP_CONFIDENCE: f64 = 0.2;

/// Ceiling for keyword-only confidence.
pub const KEYWORD_MAX_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone)]
struct Example {
    input: String,
    output: String,
    variations: Vec<String>,
}

#[derive(Debug, Clone)]
struct IntentExamples {
    intent: String,
    keywords: Vec<String>,
    examples: Vec<Example>,
}

/// Matches messages against dataset examples, variations and keywords.
///
/// For each intent (in dataset order) and each of its examples, three
/// candidates are scored: the message appearing inside the example input
/// (0.9), inside one of its variations (0.8), and keyword hits
/// (`min(0.7, 0.2 * hits)`). A candidate replaces the current best only when
/// strictly more confident. The reply is the winning example's output.
#[derive(Debug, Clone)]
pub struct DatasetMatcher {
    intents: Vec<IntentExamples>,
}

impl DatasetMatcher {
    /// Indexes `dataset`, lowercasing examples and precomputing variations.
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        let intents = dataset
            .intents()
            .into_iter()
            .map(|intent| IntentExamples {
                intent: intent.to_string(),
                keywords: dataset.keywords_for(intent).to_vec(),
                examples: dataset
                    .intent_examples(intent)
                    .into_iter()
                    .map(|d| Example {
                        input: d.input.to_lowercase(),
                        output: d.output.clone(),
                        variations: generate_variations(&d.input, &d.intent)
                            .iter()
                            .map(|v| v.to_lowercase())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { intents }
    }
}

impl IntentMatcher for DatasetMatcher {
    #[allow(clippy::cast_precision_loss)]
    fn match_intent(&self, input: &str) -> Option<IntentMatch> {
        let lowered = input.to_lowercase();
        let mut best: Option<(&str, f64, &str)> = None;

        for group in &self.intents {
            let hits = group
                .keywords
                .iter()
                .filter(|k| lowered.contains(k.as_str()))
                .count();
            let keyword_confidence = (hits as f64 * KEYWORD_STEP_CONFIDENCE).min(KEYWORD_MAX_CONFIDENCE);

            for example in &group.examples {
                let mut candidates = Vec::with_capacity(3);
                if example.input.contains(&lowered) {
                    candidates.push(DIRECT_MATCH_CONFIDENCE);
                }
                if example.variations.iter().any(|v| v.contains(&lowered)) {
                    candidates.push(VARIATION_MATCH_CONFIDENCE);
                }
                if hits > 0 {
                    candidates.push(keyword_confidence);
                }

                for confidence in candidates {
                    if best.is_none_or(|(_, current, _)| confidence > current) {
                        best = Some((group.intent.as_str(), confidence, example.output.as_str()));
                    }
                }
            }
        }

        let (intent, confidence, output) = best?;
        tracing::debug!(intent, confidence, "dataset match");

        Some(IntentMatch {
            intent: intent.to_string(),
            confidence,
            response: Some(output.to_string()),
            source: ReplySource::Dataset,
        })
    }

    fn name(&self) -> &'static str {
        "dataset"
    }

    fn description(&self) -> &'static str {
        "Matches against training dialogs, their variations and keyword map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dialog;

    fn matcher() -> DatasetMatcher {
        DatasetMatcher::new(&Dataset::builtin())
    }

    #[test]
    fn test_direct_match() {
        let found = matcher().match_intent("Return policy").unwrap();
        assert_eq!(found.intent, "returns");
        assert!((found.confidence - DIRECT_MATCH_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(
            found.response.as_deref(),
            Some("Returns are accepted within 30 days of purchase. Please keep your receipt and original packaging.")
        );
        assert_eq!(found.source, ReplySource::Dataset);
    }

    #[test]
    fn test_variation_match() {
        // only the generated "Check Order status" phrasing contains this
        let found = matcher().match_intent("check order status").unwrap();
        assert_eq!(found.intent, "order_status");
        assert!((found.confidence - VARIATION_MATCH_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(
            found.response.as_deref(),
            Some("To check your order status, please provide your order number.")
        );
    }

    #[test]
    fn test_keyword_match() {
        // "payment", "credit card", "invoice" -> 3 hits, 0.6
        let found = matcher()
            .match_intent("my credit card payment invoice looks odd")
            .unwrap();
        assert_eq!(found.intent, "payment");
        assert!((found.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_confidence_capped() {
        let dataset = Dataset::new(
            vec![Dialog::new("zzz", "ok", "hours")],
            vec![(
                "hours".to_string(),
                vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            )],
        );
        let found = DatasetMatcher::new(&dataset).match_intent("a b c d e").unwrap();
        assert!((found.confidence - KEYWORD_MAX_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_intent_wins_ties() {
        // "hi" is inside the greeting example "Hi" and also inside
        // "This is terrible"; greeting comes first.
        let found = matcher().match_intent("hi").unwrap();
        assert_eq!(found.intent, "greeting");
    }

    #[test]
    fn test_no_match() {
        assert!(matcher().match_intent("qwertyuiop asdf").is_none());
    }
}
