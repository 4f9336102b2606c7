//! Database schema definitions.
//!
//! Contains SQL schema and migration logic for the supportbot `SQLite` database.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Recorded conversation turns
CREATE TABLE IF NOT EXISTS exchanges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL DEFAULT 'default',
    user_input TEXT NOT NULL,
    intent TEXT NOT NULL,
    response TEXT NOT NULL,
    confidence REAL NOT NULL,
    response_time REAL NOT NULL,
    source TEXT NOT NULL DEFAULT 'keyword',
    created_at INTEGER NOT NULL  -- Unix milliseconds
);

CREATE INDEX IF NOT EXISTS idx_exchanges_session ON exchanges(session_id, id);
CREATE INDEX IF NOT EXISTS idx_exchanges_intent ON exchanges(intent);

-- Metadata key-value store (counters and settings)
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// Migrations from older schema versions.
pub struct Migration {
    /// Version this migration upgrades from.
    pub from_version: u32,
    /// Version this migration upgrades to.
    pub to_version: u32,
    /// SQL statements to execute.
    pub sql: &'static str,
}

/// v1 stored only keyword replies for a single conversation.
const MIGRATION_V1_TO_V2: &str = r"
ALTER TABLE exchanges ADD COLUMN session_id TEXT NOT NULL DEFAULT 'default';
ALTER TABLE exchanges ADD COLUMN source TEXT NOT NULL DEFAULT 'keyword';
CREATE INDEX IF NOT EXISTS idx_exchanges_session ON exchanges(session_id, id);
CREATE INDEX IF NOT EXISTS idx_exchanges_intent ON exchanges(intent);
";

/// Available migrations.
pub const MIGRATIONS: &[Migration] = &[Migration {
    from_version: 1,
    to_version: 2,
    sql: MIGRATION_V1_TO_V2,
}];

/// Gets migrations needed to upgrade from a version.
#[must_use]
pub fn get_migrations_from(current_version: u32) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| m.from_version >= current_version && m.to_version <= CURRENT_SCHEMA_VERSION)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sql_tables() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS exchanges"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS metadata"));
    }

    #[test]
    fn test_migrations_ordered() {
        for migration in MIGRATIONS {
            assert!(migration.to_version > migration.from_version);
        }
    }

    #[test]
    fn test_get_migrations_from() {
        assert_eq!(get_migrations_from(1).len(), 1);
        assert!(get_migrations_from(CURRENT_SCHEMA_VERSION).is_empty());
    }
}
