//! Error types for supportbot operations.
//!
//! This module provides the error hierarchy using `thiserror` for storage,
//! intent catalogs, I/O, CLI commands, and the optional language-model and
//! Telegram integrations.

use thiserror::Error;

/// Result type alias for supportbot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage-related errors (database operations).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Intent catalog, dataset, and matcher errors.
    #[error("intent error: {0}")]
    Intent(#[from] IntentError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Language model errors.
    #[cfg(feature = "openai")]
    #[error("language model error: {0}")]
    Llm(#[from] LlmError),

    /// Telegram transport errors.
    #[cfg(feature = "telegram")]
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Storage-specific errors for database operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized (init command not run).
    #[error("supportbot not initialized. Run: supportbot init")]
    NotInitialized,

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Errors raised while loading catalogs and datasets or building matchers.
#[derive(Error, Debug)]
pub enum IntentError {
    /// Catalog contains no intents.
    #[error("intent catalog is empty")]
    EmptyCatalog,

    /// Intent definition is invalid.
    #[error("invalid intent '{name}': {reason}")]
    InvalidIntent {
        /// Intent name (may be empty).
        name: String,
        /// Reason the intent was rejected.
        reason: String,
    },

    /// Two intents share a name.
    #[error("duplicate intent: {name}")]
    DuplicateIntent {
        /// The repeated intent name.
        name: String,
    },

    /// Intent uses a name the engine reserves for itself.
    #[error("reserved intent name: {name}")]
    ReservedName {
        /// The reserved name.
        name: String,
    },

    /// Catalog or dataset document could not be parsed.
    #[error("failed to parse {what}: {reason}")]
    Parse {
        /// What was being parsed ("intent catalog", "dataset").
        what: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Unknown matcher strategy.
    #[error("unknown matcher: {name}")]
    UnknownMatcher {
        /// Name of the unknown matcher.
        name: String,
    },

    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to serialize data for a file.
    #[error("failed to serialize {path}: {reason}")]
    SerializeFailed {
        /// Destination path.
        path: String,
        /// Serializer message.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

/// Errors from the hosted language model.
#[cfg(feature = "openai")]
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key was configured.
    #[error("no API key configured (set OPENAI_API_KEY)")]
    NotConfigured,

    /// The API request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered without any content.
    #[error("empty response from model")]
    EmptyResponse,
}

/// Errors from the Telegram Bot API.
#[cfg(feature = "telegram")]
#[derive(Error, Debug)]
pub enum TelegramError {
    /// No bot token was configured.
    #[error("no bot token configured (set TELEGRAM_BOT_TOKEN)")]
    MissingToken,

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API returned `ok: false`.
    #[error("api error: {description}")]
    Api {
        /// Description returned by Telegram.
        description: String,
    },
}

// Implement From traits for external errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<regex::Error> for IntentError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

#[cfg(feature = "openai")]
impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Request(err.to_string())
    }
}

#[cfg(feature = "openai")]
impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Llm(LlmError::from(err))
    }
}

#[cfg(feature = "telegram")]
impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(feature = "telegram")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Telegram(TelegramError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::NotInitialized;
        assert_eq!(
            err.to_string(),
            "supportbot not initialized. Run: supportbot init"
        );
    }

    #[test]
    fn test_intent_error_display() {
        let err = IntentError::DuplicateIntent {
            name: "greeting".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate intent: greeting");

        let err = IntentError::InvalidIntent {
            name: "shipping".to_string(),
            reason: "no responses".to_string(),
        };
        assert_eq!(err.to_string(), "invalid intent 'shipping': no responses");

        let err = IntentError::UnknownMatcher {
            name: "neural".to_string(),
        };
        assert!(err.to_string().contains("neural"));
    }

    #[test]
    fn test_io_error_display() {
        let err = IoError::FileNotFound {
            path: "/tmp/intents.json".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/intents.json");
    }

    #[test]
    fn test_command_error_display() {
        let err = CommandError::InvalidArgument("--limit must be positive".to_string());
        assert_eq!(err.to_string(), "invalid argument: --limit must be positive");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_storage() {
        let err: Error = StorageError::NotInitialized.into();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_error_from_intent() {
        let err: Error = IntentError::EmptyCatalog.into();
        assert!(matches!(err, Error::Intent(_)));
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "unknown output format 'yaml'".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: unknown output format 'yaml'");
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Storage(StorageError::Database(_))));

        let err: StorageError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StorageError::Database(_)));
    }

    #[test]
    #[allow(clippy::invalid_regex)]
    fn test_from_regex_error() {
        let regex_err = regex::Regex::new("[invalid").unwrap_err();
        let err: IntentError = regex_err.into();
        assert!(matches!(err, IntentError::Regex(_)));
    }

    #[cfg(feature = "openai")]
    #[test]
    fn test_llm_error_display() {
        assert!(LlmError::NotConfigured.to_string().contains("OPENAI_API_KEY"));
        let err: Error = LlmError::EmptyResponse.into();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[cfg(feature = "telegram")]
    #[test]
    fn test_telegram_error_display() {
        let err = TelegramError::Api {
            description: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "api error: Unauthorized");
    }
}
