//! Intent matching strategies.
//!
//! This module provides a trait-based system for mapping a user message to
//! an intent. Multiple strategies are available:
//!
//! - **Keyword**: Counts catalog keywords found in the message
//! - **Dataset**: Matches against training dialogs and their variations
//! - **Layered**: Dataset first, then keyword (the default)

pub mod chain;
pub mod dataset;
pub mod keyword;
pub mod traits;

pub use chain::MatcherChain;
pub use dataset::DatasetMatcher;
pub use keyword::KeywordMatcher;
pub use traits::{IntentMatch, IntentMatcher};

use crate::core::IntentCatalog;
use crate::dataset::Dataset;
use crate::error::{IntentError, Result};

/// Name of the default matching strategy.
pub const DEFAULT_MATCHER: &str = "layered";

/// Creates the default matcher: dataset first, then keyword.
#[must_use]
pub fn default_matcher(catalog: &IntentCatalog, dataset: &Dataset) -> MatcherChain {
    MatcherChain::new()
        .with(Box::new(DatasetMatcher::new(dataset)))
        .with(Box::new(KeywordMatcher::new(catalog.clone())))
}

/// Creates a matcher chain by strategy name.
///
/// # Arguments
///
/// * `name` - Strategy name: "keyword", "dataset", or "layered".
/// * `catalog` - Intents for the keyword matcher.
/// * `dataset` - Dialogs for the dataset matcher.
///
/// # Errors
///
/// Returns [`IntentError::UnknownMatcher`] if the strategy name is not recognized.
pub fn create_matcher(name: &str, catalog: &IntentCatalog, dataset: &Dataset) -> Result<MatcherChain> {
    match name.to_lowercase().as_str() {
        "keyword" => Ok(MatcherChain::new().with(Box::new(KeywordMatcher::new(catalog.clone())))),
        "dataset" => Ok(MatcherChain::new().with(Box::new(DatasetMatcher::new(dataset)))),
        "layered" => Ok(default_matcher(catalog, dataset)),
        _ => Err(IntentError::UnknownMatcher {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Lists available matching strategy names.
#[must_use]
pub fn available_matchers() -> Vec<&'static str> {
    vec!["keyword", "dataset", "layered"]
}
