//! JSON export of conversations and training data.

use crate::analytics::AnalyticsReport;
use crate::core::Exchange;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::io::write_json;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default file name for training set exports.
pub const DEFAULT_TRAINING_EXPORT: &str = "enhanced_training_data.json";

/// Everything written by a conversation export.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationExport {
    /// When the export was taken.
    pub export_timestamp: DateTime<Utc>,
    /// Analytics at export time.
    pub analytics: AnalyticsReport,
    /// Every recorded exchange, oldest first.
    pub conversations: Vec<Exchange>,
}

impl ConversationExport {
    /// Collects analytics and the full history from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage query fails.
    pub fn collect<S: Storage + ?Sized>(storage: &S) -> Result<Self> {
        Ok(Self {
            export_timestamp: Utc::now(),
            analytics: AnalyticsReport::from_storage(storage)?,
            conversations: storage.list_exchanges(None, None)?,
        })
    }
}

/// `conversations_YYYYMMDD_HHMMSS.json` for `now`.
#[must_use]
pub fn default_export_filename(now: DateTime<Utc>) -> String {
    format!("conversations_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Writes all conversations to `path` (or a timestamped default name).
///
/// Returns the path written.
///
/// # Errors
///
/// Returns an error if collection or writing fails.
pub fn export_conversations<S: Storage + ?Sized>(storage: &S, path: Option<&Path>) -> Result<PathBuf> {
    let export = ConversationExport::collect(storage)?;
    let path = path.map_or_else(
        || PathBuf::from(default_export_filename(export.export_timestamp)),
        Path::to_path_buf,
    );

    write_json(&path, &export)?;
    tracing::info!(
        path = %path.display(),
        conversations = export.conversations.len(),
        "exported conversations"
    );
    Ok(path)
}

/// Writes the enhanced training set of `dataset` to `path`.
///
/// Defaults to [`DEFAULT_TRAINING_EXPORT`]. Returns the path written.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn export_training_set(dataset: &Dataset, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_TRAINING_EXPORT), Path::to_path_buf);
    let set = dataset.enhanced_training_set();

    write_json(&path, &set)?;
    tracing::info!(path = %path.display(), examples = set.total_examples, "exported training set");
    Ok(path)
}
