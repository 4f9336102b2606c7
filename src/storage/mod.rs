//! Storage layer for supportbot.
//!
//! Records every exchange so analytics, history and export can be served
//! later. `SQLite` is the persistent backend; an in-memory backend
//! implements the same trait.

pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStorage;
pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageStats};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".supportbot/supportbot.db";
