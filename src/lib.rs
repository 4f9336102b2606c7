//! # Supportbot
//!
//! Customer support chatbot for an e-commerce storefront.
//!
//! Supportbot answers customer messages by matching them to intents, first
//! against curated training dialogs and then against intent keywords,
//! records every exchange, and reports analytics over the history.
//!
//! ## Features
//!
//! - **Layered matching**: training-dialog and keyword matchers behind one trait
//! - **`SQLite` Storage**: persistent history with schema migrations
//! - **Analytics and export**: success rate, response time, intent mix, JSON export
//! - **Language model** (feature `openai`): hosted chat model with local fallback
//! - **Telegram** (feature `telegram`): long-polling bot front end

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod analytics;
pub mod cli;
pub mod config;
pub mod core;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod export;
pub mod io;
#[cfg(feature = "openai")]
pub mod llm;
pub mod logging;
pub mod matching;
pub mod storage;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod widget;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Exchange, Intent, IntentCatalog, Reply, ReplySource};

// Re-export engine types
pub use engine::{SelfTestReport, SupportBot, self_test};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, MemoryStorage, SqliteStorage, Storage};

// Re-export matching types
pub use matching::{
    DatasetMatcher, IntentMatch, IntentMatcher, KeywordMatcher, MatcherChain, available_matchers,
    create_matcher,
};

// Re-export dataset and analytics types
pub use analytics::AnalyticsReport;
pub use dataset::{Dataset, Dialog};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};

// Re-export language-model types (feature-gated)
#[cfg(feature = "openai")]
pub use llm::{Assistant, ChatModel, ChatTurn, OpenAiChatModel, Sentiment, SentimentLabel};
