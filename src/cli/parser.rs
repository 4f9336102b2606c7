//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::matching::DEFAULT_MATCHER;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer support chatbot.
///
/// Answers support questions with keyword and training-dialog matching,
/// records every exchange, and reports analytics over the history.
#[derive(Parser, Debug)]
#[command(name = "supportbot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the conversation database.
    ///
    /// Defaults to `.supportbot/supportbot.db` in the current directory.
    #[arg(short, long, env = "SUPPORTBOT_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Seed for reply selection, for reproducible runs.
    #[arg(long, env = "SUPPORTBOT_SEED", global = true)]
    pub seed: Option<u64>,

    /// Intent catalog JSON file (built-in catalog if omitted).
    #[arg(long, env = "SUPPORTBOT_INTENTS", global = true)]
    pub intents: Option<PathBuf>,

    /// Training dialogs JSON file (built-in dataset if omitted).
    #[arg(long, env = "SUPPORTBOT_DATASET", global = true)]
    pub dataset: Option<PathBuf>,

    /// Matching strategy (keyword, dataset, layered).
    #[arg(short, long, default_value = DEFAULT_MATCHER, global = true)]
    pub matcher: String,

    /// `OpenAI` API key; enables language-model replies.
    #[cfg(feature = "openai")]
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used for language-model replies.
    #[cfg(feature = "openai")]
    #[arg(long, env = "SUPPORTBOT_MODEL", default_value = crate::config::DEFAULT_MODEL, global = true)]
    pub model: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the conversation database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show database status.
    Status,

    /// Reset all history and counters.
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Answer a single message.
    Ask {
        /// The customer message.
        message: String,

        /// Session the exchange is recorded under.
        #[arg(short, long)]
        session: Option<String>,

        /// Use local matching even when an API key is set.
        #[arg(long)]
        no_llm: bool,
    },

    /// Interactive chat on stdin (type `quit` or `exit` to leave).
    Chat {
        /// Session the exchanges are recorded under.
        #[arg(short, long)]
        session: Option<String>,

        /// Use local matching even when an API key is set.
        #[arg(long)]
        no_llm: bool,
    },

    /// Show analytics.
    Stats,

    /// Show recorded exchanges, oldest first.
    History {
        /// Only this session.
        #[arg(short, long)]
        session: Option<String>,

        /// Number of most recent exchanges to show.
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Clear conversation history.
    Clear {
        /// Only clear this session (all history if omitted).
        #[arg(short, long)]
        session: Option<String>,

        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Export conversations and analytics to JSON.
    Export {
        /// Output file (defaults to `conversations_<timestamp>.json`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the intent catalog.
    Intents,

    /// Training dataset commands.
    #[command(subcommand)]
    Dataset(DatasetCommands),

    /// Run the built-in self-test inputs.
    SelfTest,

    /// Produce an embed snippet or page for a hosted agent.
    Widget {
        /// Public https URL of the hosted agent.
        #[arg(short, long)]
        url: String,

        /// Iframe width in pixels.
        #[arg(long, default_value_t = crate::widget::DEFAULT_WIDTH)]
        width: u32,

        /// Iframe height in pixels.
        #[arg(long, default_value_t = crate::widget::DEFAULT_HEIGHT)]
        height: u32,

        /// Write a full HTML page instead of printing the snippet
        /// (`-o` alone writes `support_widget.html`).
        #[arg(short, long, num_args = 0..=1, default_missing_value = crate::widget::DEFAULT_PAGE_FILE)]
        output: Option<PathBuf>,
    },

    /// Classify the sentiment of a message.
    #[cfg(feature = "openai")]
    Sentiment {
        /// Text to classify.
        text: String,
    },

    /// Summarize recent conversation.
    #[cfg(feature = "openai")]
    Summary {
        /// Only this session.
        #[arg(short, long)]
        session: Option<String>,

        /// Number of most recent exchanges to summarize.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Serve the bot over Telegram long polling.
    #[cfg(feature = "telegram")]
    Telegram {
        /// Bot token from `@BotFather`.
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

/// Dataset subcommands.
#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// Show per-intent statistics.
    Analyze,

    /// Print random training dialogs.
    Sample {
        /// Only sample this intent.
        #[arg(short, long)]
        intent: Option<String>,

        /// Number of dialogs to print.
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Write the enhanced training set (with variations) to JSON.
    Export {
        /// Output file (defaults to `enhanced_training_data.json`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
