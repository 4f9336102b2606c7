//! `SQLite` storage implementation.
//!
//! Provides persistent storage using `SQLite` with proper transaction
//! management and migration support.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::{Exchange, ReplySource};
use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{Storage, StorageStats};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Metadata key holding the failure counter.
const FAILURE_KEY: &str = "failed_responses";

const EXCHANGE_COLUMNS: &str = "id, session_id, user_input, intent, response, confidence, \
                                response_time, source, created_at";

/// SQLite-based storage implementation.
///
/// # Examples
///
/// ```no_run
/// use supportbot::storage::{SqliteStorage, Storage};
///
/// let mut storage = SqliteStorage::open(".supportbot/supportbot.db").unwrap();
/// storage.init().unwrap();
/// ```
pub struct SqliteStorage {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        // journal_mode returns a row, so it has to go through query_row
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn get_schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn row_to_exchange(row: &Row<'_>) -> rusqlite::Result<Exchange> {
        let source: String = row.get(7)?;
        let source = source
            .parse::<ReplySource>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, e.into()))?;
        let millis: i64 = row.get(8)?;

        Ok(Exchange {
            id: Some(row.get(0)?),
            session_id: row.get(1)?,
            user_input: row.get(2)?,
            intent: row.get(3)?,
            response: row.get(4)?,
            confidence: row.get(5)?,
            response_time: row.get(6)?,
            source,
            created_at: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
        })
    }
}

impl Storage for SqliteStorage {
    fn init(&mut self) -> Result<()> {
        let is_init: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;

        if is_init == 0 {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(StorageError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        } else if let Some(current) = self.get_schema_version()?
            && current < CURRENT_SCHEMA_VERSION
        {
            for migration in crate::storage::schema::get_migrations_from(current) {
                tracing::info!(
                    from = migration.from_version,
                    to = migration.to_version,
                    "migrating schema"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
            }
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn reset(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            DELETE FROM exchanges;
            DELETE FROM metadata;
        ",
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ==================== Exchange Operations ====================

    fn add_exchange(&mut self, exchange: &Exchange) -> Result<i64> {
        self.conn
            .execute(
                r"
            INSERT INTO exchanges (
                session_id, user_input, intent, response, confidence,
                response_time, source, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
                params![
                    exchange.session_id,
                    exchange.user_input,
                    exchange.intent,
                    exchange.response,
                    exchange.confidence,
                    exchange.response_time,
                    exchange.source.as_str(),
                    exchange.created_at.timestamp_millis(),
                ],
            )
            .map_err(StorageError::from)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_exchange(&self, id: i64) -> Result<Option<Exchange>> {
        let sql = format!("SELECT {EXCHANGE_COLUMNS} FROM exchanges WHERE id = ?");
        let exchange = self
            .conn
            .query_row(&sql, params![id], Self::row_to_exchange)
            .optional()
            .map_err(StorageError::from)?;

        Ok(exchange)
    }

    fn list_exchanges(&self, session: Option<&str>, limit: Option<usize>) -> Result<Vec<Exchange>> {
        // newest N first, then flipped back to chronological order
        let sql = format!(
            r"
            SELECT {EXCHANGE_COLUMNS} FROM (
                SELECT {EXCHANGE_COLUMNS} FROM exchanges
                WHERE (?1 IS NULL OR session_id = ?1)
                ORDER BY id DESC
                LIMIT ?2
            ) ORDER BY id ASC
        "
        );
        let limit = limit.map_or(-1, |l| l as i64);

        let mut stmt = self.conn.prepare(&sql).map_err(StorageError::from)?;
        let exchanges = stmt
            .query_map(params![session, limit], Self::row_to_exchange)
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        Ok(exchanges)
    }

    fn exchange_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM exchanges", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }

    fn intent_distribution(&self) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT intent, COUNT(*) FROM exchanges GROUP BY intent")
            .map_err(StorageError::from)?;

        let distribution = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(StorageError::from)?;

        Ok(distribution)
    }

    fn source_distribution(&self) -> Result<BTreeMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, COUNT(*) FROM exchanges GROUP BY source")
            .map_err(StorageError::from)?;

        let distribution = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(StorageError::from)?;

        Ok(distribution)
    }

    fn average_response_time(&self) -> Result<f64> {
        let average: f64 = self
            .conn
            .query_row(
                "SELECT COALESCE(AVG(response_time), 0.0) FROM exchanges",
                [],
                |row| row.get(0),
            )
            .map_err(StorageError::from)?;
        Ok(average)
    }

    fn clear_session(&mut self, session: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM exchanges WHERE session_id = ?", params![session])
            .map_err(StorageError::from)?;
        Ok(removed)
    }

    // ==================== Failure Counter ====================

    fn record_failure(&mut self) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .execute(
                r"
            INSERT INTO metadata (key, value, created_at, updated_at)
            VALUES (?1, '1', ?2, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = CAST(CAST(value AS INTEGER) + 1 AS TEXT),
                updated_at = excluded.updated_at
        ",
                params![FAILURE_KEY, now],
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn failure_count(&self) -> Result<usize> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?",
                params![FAILURE_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    // ==================== Utility Operations ====================

    fn stats(&self) -> Result<StorageStats> {
        let session_count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(DISTINCT session_id) FROM exchanges",
                [],
                |row| row.get(0),
            )
            .map_err(StorageError::from)?;

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(StorageStats {
            exchange_count: self.exchange_count()?,
            session_count: session_count as usize,
            failure_count: self.failure_count()?,
            schema_version: self.get_schema_version()?.unwrap_or(0),
            db_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Reply;

    fn setup() -> SqliteStorage {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage
    }

    fn exchange(session: &str, input: &str, intent: &str, seconds: f64) -> Exchange {
        let reply = Reply::new(format!("re: {input}"), intent, 0.5, ReplySource::Keyword)
            .with_response_time(seconds);
        Exchange::from_reply(Some(session), input, &reply)
    }

    #[test]
    fn test_init() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        assert!(!storage.is_initialized().unwrap());
        assert!(storage.init().is_ok());
        assert!(storage.is_initialized().unwrap());
    }

    #[test]
    fn test_init_idempotent() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.init().is_ok());
        assert!(storage.init().is_ok());
    }

    #[test]
    fn test_exchange_crud() {
        let mut storage = setup();

        let original = exchange("s1", "Where is my order?", "order_status", 0.01);
        let id = storage.add_exchange(&original).unwrap();
        assert!(id > 0);

        let loaded = storage.get_exchange(id).unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.session_id, "s1");
        assert_eq!(loaded.user_input, "Where is my order?");
        assert_eq!(loaded.intent, "order_status");
        assert_eq!(loaded.source, ReplySource::Keyword);
        assert_eq!(
            loaded.created_at.timestamp_millis(),
            original.created_at.timestamp_millis()
        );

        assert!(storage.get_exchange(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_exchanges_order_and_limit() {
        let mut storage = setup();
        for i in 0..5 {
            let session = if i % 2 == 0 { "even" } else { "odd" };
            storage
                .add_exchange(&exchange(session, &format!("m{i}"), "greeting", 0.0))
                .unwrap();
        }

        let all = storage.list_exchanges(None, None).unwrap();
        let inputs: Vec<_> = all.iter().map(|e| e.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["m0", "m1", "m2", "m3", "m4"]);

        let last_two = storage.recent_exchanges(2).unwrap();
        let inputs: Vec<_> = last_two.iter().map(|e| e.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["m3", "m4"]);

        let even = storage.list_exchanges(Some("even"), Some(2)).unwrap();
        let inputs: Vec<_> = even.iter().map(|e| e.user_input.as_str()).collect();
        assert_eq!(inputs, vec!["m2", "m4"]);
    }

    #[test]
    fn test_aggregates() {
        let mut storage = setup();
        assert!(storage.average_response_time().unwrap().abs() < f64::EPSILON);

        storage.add_exchange(&exchange("a", "hi", "greeting", 0.2)).unwrap();
        storage.add_exchange(&exchange("a", "hey", "greeting", 0.4)).unwrap();
        storage.add_exchange(&exchange("b", "refund", "returns", 0.6)).unwrap();

        assert_eq!(storage.exchange_count().unwrap(), 3);
        let distribution = storage.intent_distribution().unwrap();
        assert_eq!(distribution["greeting"], 2);
        assert_eq!(distribution["returns"], 1);
        assert!((storage.average_response_time().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_source_distribution() {
        let mut storage = setup();
        storage.add_exchange(&exchange("s1", "hi", "greeting", 0.1)).unwrap();
        storage.add_exchange(&exchange("s1", "bye", "goodbye", 0.1)).unwrap();
        let reply = Reply::new("Sure.", "openai_response", 0.95, ReplySource::LanguageModel);
        storage.add_exchange(&Exchange::from_reply(Some("s2"), "help", &reply)).unwrap();

        let sources = storage.source_distribution().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources["keyword"], 2);
        assert_eq!(sources["language_model"], 1);
    }

    #[test]
    fn test_failure_counter() {
        let mut storage = setup();
        assert_eq!(storage.failure_count().unwrap(), 0);
        storage.record_failure().unwrap();
        storage.record_failure().unwrap();
        assert_eq!(storage.failure_count().unwrap(), 2);
    }

    #[test]
    fn test_failure_timestamps_in_millis() {
        let mut storage = setup();
        let before = Utc::now().timestamp_millis();
        storage.record_failure().unwrap();
        let after = Utc::now().timestamp_millis();

        let (created, updated): (i64, i64) = storage
            .conn
            .query_row(
                "SELECT created_at, updated_at FROM metadata WHERE key = ?",
                params![FAILURE_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!((before..=after).contains(&created));
        assert!(updated >= created);
    }

    #[test]
    fn test_clear_session() {
        let mut storage = setup();
        storage.add_exchange(&exchange("a", "hi", "greeting", 0.0)).unwrap();
        storage.add_exchange(&exchange("b", "hi", "greeting", 0.0)).unwrap();

        assert_eq!(storage.clear_session("a").unwrap(), 1);
        assert_eq!(storage.clear_session("a").unwrap(), 0);
        assert_eq!(storage.exchange_count().unwrap(), 1);
    }

    #[test]
    fn test_reset() {
        let mut storage = setup();
        storage.add_exchange(&exchange("a", "hi", "greeting", 0.0)).unwrap();
        storage.record_failure().unwrap();

        storage.reset().unwrap();
        assert_eq!(storage.exchange_count().unwrap(), 0);
        assert_eq!(storage.failure_count().unwrap(), 0);
        assert!(storage.is_initialized().unwrap());
    }

    #[test]
    fn test_stats() {
        let mut storage = setup();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.exchange_count, 0);
        assert_eq!(stats.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(stats.db_size.is_none());

        storage.add_exchange(&exchange("a", "hi", "greeting", 0.0)).unwrap();
        storage.add_exchange(&exchange("b", "hi", "greeting", 0.0)).unwrap();
        storage.record_failure().unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.exchange_count, 2);
        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.failure_count, 1);
    }

    #[test]
    fn test_migrates_v1_schema() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage
            .conn
            .execute_batch(
                r"
            CREATE TABLE schema_info (key TEXT PRIMARY KEY, value TEXT NOT NULL);
            INSERT INTO schema_info (key, value) VALUES ('version', '1');
            CREATE TABLE exchanges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_input TEXT NOT NULL,
                intent TEXT NOT NULL,
                response TEXT NOT NULL,
                confidence REAL NOT NULL,
                response_time REAL NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE metadata (
                key TEXT PRIMARY KEY, value TEXT NOT NULL,
                created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL
            );
            INSERT INTO exchanges (user_input, intent, response, confidence, response_time, created_at)
            VALUES ('hi', 'greeting', 'Hello!', 0.33, 0.01, 0);
        ",
            )
            .unwrap();

        storage.init().unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let migrated = storage.get_exchange(1).unwrap().unwrap();
        assert_eq!(migrated.session_id, "default");
        assert_eq!(migrated.source, ReplySource::Keyword);
    }
}
