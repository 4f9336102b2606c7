//! Storage trait definition.
//!
//! Defines the interface for persistent storage backends, enabling
//! pluggable storage implementations.

use crate::core::Exchange;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Trait for conversation storage backends.
///
/// Implementations record exchanges and the failure counter used by
/// analytics. Listing operations return exchanges in chronological order.
pub trait Storage: Send {
    /// Initializes storage (creates schema, runs migrations).
    ///
    /// Should be idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or migration fails.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Resets all stored state.
    ///
    /// Deletes exchanges and counters but preserves the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&mut self) -> Result<()>;

    // ==================== Exchange Operations ====================

    /// Records an exchange.
    ///
    /// Returns the assigned exchange ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange cannot be inserted.
    fn add_exchange(&mut self, exchange: &Exchange) -> Result<i64>;

    /// Retrieves an exchange by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_exchange(&self, id: i64) -> Result<Option<Exchange>>;

    /// Lists exchanges, oldest first.
    ///
    /// `session` restricts to one session; `limit` keeps only the most
    /// recent `limit` exchanges.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_exchanges(&self, session: Option<&str>, limit: Option<usize>) -> Result<Vec<Exchange>>;

    /// The most recent `limit` exchanges across sessions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn recent_exchanges(&self, limit: usize) -> Result<Vec<Exchange>> {
        self.list_exchanges(None, Some(limit))
    }

    /// Returns the number of recorded exchanges.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    fn exchange_count(&self) -> Result<usize>;

    /// Exchanges per intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn intent_distribution(&self) -> Result<BTreeMap<String, usize>>;

    /// Exchanges per reply source (`keyword`, `language_model`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn source_distribution(&self) -> Result<BTreeMap<String, usize>>;

    /// Mean response time in seconds (0 when empty).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn average_response_time(&self) -> Result<f64>;

    /// Deletes every exchange of a session.
    ///
    /// Returns the number of exchanges removed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn clear_session(&mut self, session: &str) -> Result<usize>;

    // ==================== Failure Counter ====================

    /// Counts one message that could not be answered or recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be updated.
    fn record_failure(&mut self) -> Result<()>;

    /// Number of recorded failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be read.
    fn failure_count(&self) -> Result<usize>;

    // ==================== Utility Operations ====================

    /// Gets storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StorageStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    /// Number of exchanges stored.
    pub exchange_count: usize,
    /// Number of distinct sessions.
    pub session_count: usize,
    /// Failure counter.
    pub failure_count: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
