//! Core domain models for supportbot.
//!
//! This module contains the fundamental data structures used throughout the
//! bot: intents and their catalog, replies, and recorded exchanges. These are
//! pure domain models with no I/O dependencies.

pub mod exchange;
pub mod intent;
pub mod reply;

pub use exchange::{DEFAULT_SESSION, Exchange};
pub use intent::{
    EMPTY_INPUT_INTENT, EMPTY_INPUT_RESPONSE, ERROR_INTENT, ERROR_RESPONSE, FALLBACK_INTENT,
    FALLBACK_RESPONSES, GREETING_MESSAGES, Intent, IntentCatalog, RESERVED_INTENTS,
};
pub use reply::{Reply, ReplySource};
