//! Bot identity and model settings.
//!
//! Runtime values (paths, keys, model name) arrive through the CLI and its
//! environment fallbacks; this module holds the typed defaults and loads
//! optional catalog and dataset overrides.

use crate::core::IntentCatalog;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::io::read_file;
use serde::Serialize;
use std::path::Path;

/// Default chat model name.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Name, description and version shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotProfile {
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Version string.
    pub version: String,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            name: "Customer Support Bot".to_string(),
            description: "AI-powered customer support assistant".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Chat completion parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSettings {
    /// Model identifier.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Number of past exchanges replayed as context.
    pub history_window: usize,
}

impl ModelSettings {
    /// Default settings for `model`.
    #[must_use]
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 150,
            temperature: 0.7,
            history_window: 6,
        }
    }
}

/// Loads an intent catalog from `path`, or the built-in catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn load_catalog(path: Option<&Path>) -> Result<IntentCatalog> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading intent catalog");
            IntentCatalog::from_json(&read_file(path)?)
        }
        None => Ok(IntentCatalog::customer_support()),
    }
}

/// Loads training dialogs from `path`, or the built-in dataset.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading dataset");
            Dataset::from_json(&read_file(path)?)
        }
        None => Ok(Dataset::builtin()),
    }
}
