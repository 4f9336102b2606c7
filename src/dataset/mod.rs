//! Training dialogs for the dataset matcher.
//!
//! A dataset is an ordered list of `(input, output, intent)` dialogs plus a
//! keyword map. It drives [`crate::matching::DatasetMatcher`] and can be
//! expanded into an enhanced training set with generated phrase variations.

mod builtin;
mod variations;

pub use variations::generate_variations;

use crate::error::{IntentError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A training example: a user utterance, its reply, and its intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// Example user input.
    pub input: String,
    /// Reply for this input.
    pub output: String,
    /// Intent label.
    pub intent: String,
}

impl Dialog {
    /// Creates a dialog.
    #[must_use]
    pub fn new(input: &str, output: &str, intent: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
            intent: intent.to_string(),
        }
    }
}

/// Ordered training dialogs and per-intent keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    dialogs: Vec<Dialog>,
    keywords: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    Wrapped {
        dialogs: Vec<Dialog>,
        #[serde(default)]
        keywords: Option<BTreeMap<String, Vec<String>>>,
    },
    Bare(Vec<Dialog>),
}

/// One intent of an enhanced training set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingIntent {
    /// Intent name.
    pub name: String,
    /// Example inputs, originals followed by their variations.
    pub examples: Vec<String>,
    /// Reply paired with each example (same length as `examples`).
    pub responses: Vec<String>,
    /// Keywords from the dataset keyword map.
    pub keywords: Vec<String>,
}

/// Training set with generated variations.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSet {
    /// Intents in dataset order.
    pub intents: Vec<TrainingIntent>,
    /// Total examples across intents.
    pub total_examples: usize,
    /// Examples per intent.
    pub intent_distribution: BTreeMap<String, usize>,
    /// When the set was built.
    pub created_at: DateTime<Utc>,
}

/// Summary statistics over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetAnalysis {
    /// Number of dialogs.
    pub total_examples: usize,
    /// Dialogs per intent.
    pub intent_distribution: BTreeMap<String, usize>,
    /// Mean dialogs per intent (0 for an empty dataset).
    pub average_examples_per_intent: f64,
    /// Intent with the most dialogs (first in dataset order on ties).
    pub most_common_intent: Option<String>,
    /// Intent with the fewest dialogs (first in dataset order on ties).
    pub least_common_intent: Option<String>,
}

impl Dataset {
    /// Creates a dataset from dialogs and a keyword map.
    #[must_use]
    pub const fn new(dialogs: Vec<Dialog>, keywords: Vec<(String, Vec<String>)>) -> Self {
        Self { dialogs, keywords }
    }

    /// The built-in customer support dialogs.
    #[must_use]
    pub fn builtin() -> Self {
        let dialogs = builtin::SAMPLE_DIALOGS
            .iter()
            .map(|(input, output, intent)| Dialog::new(input, output, intent))
            .collect();
        Self::new(dialogs, builtin_keywords())
    }

    /// Parses a dataset from JSON.
    ///
    /// Accepts a bare array of dialogs or `{"dialogs": [...], "keywords": {...}}`.
    /// When `keywords` is omitted the built-in keyword map is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, any dialog has a blank
    /// input, output or intent, or the keyword map holds a blank keyword.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: DatasetDocument = serde_json::from_str(json).map_err(|e| IntentError::Parse {
            what: "dataset",
            reason: e.to_string(),
        })?;

        let (dialogs, keywords) = match doc {
            DatasetDocument::Bare(dialogs) => (dialogs, None),
            DatasetDocument::Wrapped { dialogs, keywords } => (dialogs, keywords),
        };

        if let Some(bad) = dialogs.iter().find(|d| {
            d.input.trim().is_empty() || d.output.trim().is_empty() || d.intent.trim().is_empty()
        }) {
            return Err(IntentError::InvalidIntent {
                name: bad.intent.clone(),
                reason: "dialog input, output and intent must not be blank".to_string(),
            }
            .into());
        }

        if let Some((intent, _)) = keywords
            .iter()
            .flatten()
            .find(|(_, words)| words.iter().any(|w| w.trim().is_empty()))
        {
            return Err(IntentError::InvalidIntent {
                name: intent.clone(),
                reason: "keywords must not be blank".to_string(),
            }
            .into());
        }

        let keywords = keywords.map_or_else(builtin_keywords, |map| {
            map.into_iter()
                .map(|(intent, words)| {
                    (intent, words.into_iter().map(|w| w.to_lowercase()).collect())
                })
                .collect()
        });

        Ok(Self::new(dialogs, keywords))
    }

    /// All dialogs in order.
    #[must_use]
    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }

    /// Number of dialogs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    /// Returns true if there are no dialogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Intent names in order of first appearance.
    #[must_use]
    pub fn intents(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for dialog in &self.dialogs {
            if !seen.contains(&dialog.intent.as_str()) {
                seen.push(&dialog.intent);
            }
        }
        seen
    }

    /// Dialogs labelled with `intent`.
    #[must_use]
    pub fn intent_examples(&self, intent: &str) -> Vec<&Dialog> {
        self.dialogs.iter().filter(|d| d.intent == intent).collect()
    }

    /// Keywords for `intent`, empty if the map has none.
    #[must_use]
    pub fn keywords_for(&self, intent: &str) -> &[String] {
        self.keywords
            .iter()
            .find(|(name, _)| name == intent)
            .map(|(_, words)| words.as_slice())
            .unwrap_or(&[])
    }

    /// Picks a random dialog, optionally restricted to one intent.
    pub fn random_example<R: Rng + ?Sized>(&self, intent: Option<&str>, rng: &mut R) -> Option<&Dialog> {
        match intent {
            Some(intent) => self.intent_examples(intent).choose(rng).copied(),
            None => self.dialogs.choose(rng),
        }
    }

    /// Expands every dialog with its phrase variations.
    #[must_use]
    pub fn enhanced_training_set(&self) -> TrainingSet {
        let mut intents: Vec<TrainingIntent> = Vec::new();

        for dialog in &self.dialogs {
            let position = intents.iter().position(|t| t.name == dialog.intent);
            let entry = if let Some(i) = position {
                &mut intents[i]
            } else {
                intents.push(TrainingIntent {
                    name: dialog.intent.clone(),
                    examples: Vec::new(),
                    responses: Vec::new(),
                    keywords: self.keywords_for(&dialog.intent).to_vec(),
                });
                let last = intents.len() - 1;
                &mut intents[last]
            };

            for variation in generate_variations(&dialog.input, &dialog.intent) {
                entry.examples.push(variation);
                entry.responses.push(dialog.output.clone());
            }
        }

        let intent_distribution: BTreeMap<String, usize> = intents
            .iter()
            .map(|t| (t.name.clone(), t.examples.len()))
            .collect();
        let total_examples = intent_distribution.values().sum();

        TrainingSet {
            intents,
            total_examples,
            intent_distribution,
            created_at: Utc::now(),
        }
    }

    /// Computes summary statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze(&self) -> DatasetAnalysis {
        let ordered: Vec<(&str, usize)> = self
            .intents()
            .into_iter()
            .map(|intent| (intent, self.intent_examples(intent).len()))
            .collect();

        let mut most: Option<(&str, usize)> = None;
        let mut least: Option<(&str, usize)> = None;
        for &(intent, count) in &ordered {
            if most.is_none_or(|(_, best)| count > best) {
                most = Some((intent, count));
            }
            if least.is_none_or(|(_, best)| count < best) {
                least = Some((intent, count));
            }
        }

        let average = if ordered.is_empty() {
            0.0
        } else {
            self.dialogs.len() as f64 / ordered.len() as f64
        };

        DatasetAnalysis {
            total_examples: self.dialogs.len(),
            intent_distribution: ordered
                .iter()
                .map(|(intent, count)| ((*intent).to_string(), *count))
                .collect(),
            average_examples_per_intent: average,
            most_common_intent: most.map(|(i, _)| i.to_string()),
            least_common_intent: least.map(|(i, _)| i.to_string()),
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_keywords() -> Vec<(String, Vec<String>)> {
    builtin::KEYWORD_MAP
        .iter()
        .map(|(intent, words)| {
            (
                (*intent).to_string(),
                words.iter().map(ToString::to_string).collect(),
            )
        })
        .collect()
}
