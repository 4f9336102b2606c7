//! CLI layer for supportbot.
//!
//! Provides the command-line interface using clap, with commands for
//! managing the conversation database, answering messages, reporting
//! analytics, and running the optional front ends.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, DatasetCommands};
