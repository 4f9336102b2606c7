//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::analytics::AnalyticsReport;
use crate::cli::output::{
    OutputFormat, format_analytics, format_dataset_analysis, format_dialogs, format_history,
    format_intents, format_json, format_message, format_reply, format_self_test, format_status,
};
use crate::cli::parser::{Cli, Commands, DatasetCommands};
use crate::config::{BotProfile, load_catalog, load_dataset};
use crate::core::Reply;
use crate::engine::{SupportBot, self_test};
use crate::error::{CommandError, Result, StorageError};
use crate::export::{export_conversations, export_training_set};
use crate::io::write_file;
use crate::matching::create_matcher;
use crate::storage::{SqliteStorage, Storage};
use crate::widget::{iframe_snippet, render_page, validate_agent_url};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[cfg(feature = "openai")]
use crate::config::ModelSettings;
#[cfg(feature = "openai")]
use crate::llm::{Assistant, OpenAiChatModel};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format)?;
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes, format),
        Commands::Ask {
            message,
            session,
            no_llm,
        } => cmd_ask(cli, &db_path, message, session.as_deref(), *no_llm, format),
        Commands::Chat { session, no_llm } => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            cmd_chat(
                cli,
                &db_path,
                session.as_deref(),
                *no_llm,
                &mut stdin.lock(),
                &mut stdout.lock(),
                format,
            )
        }
        Commands::Stats => cmd_stats(&db_path, format),
        Commands::History { session, limit } => cmd_history(&db_path, session.as_deref(), *limit, format),
        Commands::Clear { session, yes } => cmd_clear(&db_path, session.as_deref(), *yes, format),
        Commands::Export { output } => cmd_export(&db_path, output.as_deref(), format),
        Commands::Intents => cmd_intents(cli, format),
        Commands::Dataset(dataset_cmd) => match dataset_cmd {
            DatasetCommands::Analyze => cmd_dataset_analyze(cli, format),
            DatasetCommands::Sample { intent, count } => {
                cmd_dataset_sample(cli, intent.as_deref(), *count, format)
            }
            DatasetCommands::Export { output } => cmd_dataset_export(cli, output.as_deref(), format),
        },
        Commands::SelfTest => cmd_self_test(cli, format),
        Commands::Widget {
            url,
            width,
            height,
            output,
        } => cmd_widget(url, *width, *height, output.as_deref(), format),
        #[cfg(feature = "openai")]
        Commands::Sentiment { text } => cmd_sentiment(cli, text, format),
        #[cfg(feature = "openai")]
        Commands::Summary { session, limit } => {
            cmd_summary(cli, &db_path, session.as_deref(), *limit, format)
        }
        #[cfg(feature = "telegram")]
        Commands::Telegram { token } => cmd_telegram(cli, &db_path, token.as_deref(), format),
    }
}

/// Opens storage and ensures it's initialized.
fn open_storage(db_path: &Path) -> Result<SqliteStorage> {
    let storage = SqliteStorage::open(db_path)?;

    if !storage.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(storage)
}

/// Builds the bot from the catalog, dataset, matcher and seed options.
fn build_bot(cli: &Cli) -> Result<SupportBot> {
    let catalog = load_catalog(cli.intents.as_deref())?;
    let dataset = load_dataset(cli.dataset.as_deref())?;
    let matcher = create_matcher(&cli.matcher, &catalog, &dataset)?;
    let bot = SupportBot::new(catalog, matcher);
    Ok(match cli.seed {
        Some(seed) => bot.with_seed(seed),
        None => bot,
    })
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

#[cfg(any(feature = "openai", feature = "telegram"))]
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("failed to start async runtime: {e}")).into())
}

/// Builds the language-model assistant when a key is configured.
#[cfg(feature = "openai")]
fn build_assistant(cli: &Cli) -> Result<Option<Assistant>> {
    let Some(key) = cli.openai_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        return Ok(None);
    };
    let model = OpenAiChatModel::new(key, cli.model.as_str())?;
    tracing::debug!(model = %cli.model, "language model enabled");
    Ok(Some(Assistant::new(Box::new(model), ModelSettings::for_model(cli.model.as_str()))))
}

#[cfg(feature = "openai")]
fn require_assistant(cli: &Cli) -> Result<Assistant> {
    build_assistant(cli)?.ok_or_else(|| crate::error::LlmError::NotConfigured.into())
}

/// Answers messages locally or through the language model.
pub(crate) struct Responder {
    #[cfg(feature = "openai")]
    assistant: Option<(Assistant, tokio::runtime::Runtime)>,
}

impl Responder {
    /// Local matching only.
    pub(crate) const fn local() -> Self {
        Self {
            #[cfg(feature = "openai")]
            assistant: None,
        }
    }

    #[cfg(feature = "openai")]
    fn for_cli(cli: &Cli, no_llm: bool) -> Result<Self> {
        if no_llm {
            return Ok(Self::local());
        }
        let assistant = match build_assistant(cli)? {
            Some(assistant) => Some((assistant, runtime()?)),
            None => None,
        };
        Ok(Self { assistant })
    }

    #[cfg(not(feature = "openai"))]
    fn for_cli(_cli: &Cli, _no_llm: bool) -> Result<Self> {
        Ok(Self::local())
    }

    pub(crate) fn answer<S: Storage + ?Sized>(
        &mut self,
        bot: &mut SupportBot,
        storage: &mut S,
        message: &str,
        session: Option<&str>,
    ) -> Reply {
        #[cfg(feature = "openai")]
        if let Some((assistant, runtime)) = self.assistant.as_mut() {
            return runtime.block_on(bot.process_with_assistant(storage, assistant, message, session));
        }
        bot.process_message(storage, message, session)
    }
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = db_path.as_os_str().to_owned();
            sidecar.push(suffix);
            let _ = std::fs::remove_file(sidecar);
        }
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.init()?;

    Ok(format_message(
        &format!("Initialized supportbot database at: {}", db_path.display()),
        format,
    ))
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &Path, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm reset. This will delete all conversations and counters.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    storage.reset()?;
    Ok(format_message("Conversation database reset successfully.", format))
}

fn cmd_ask(
    cli: &Cli,
    db_path: &Path,
    message: &str,
    session: Option<&str>,
    no_llm: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let mut bot = build_bot(cli)?;
    let mut responder = Responder::for_cli(cli, no_llm)?;

    let reply = responder.answer(&mut bot, &mut storage, message, session);
    Ok(format_reply(&reply, format))
}

#[allow(clippy::too_many_arguments)]
fn cmd_chat<R: BufRead, W: Write>(
    cli: &Cli,
    db_path: &Path,
    session: Option<&str>,
    no_llm: bool,
    input: &mut R,
    output: &mut W,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let mut bot = build_bot(cli)?;
    let mut responder = Responder::for_cli(cli, no_llm)?;

    let answered = run_chat(&mut bot, &mut responder, &mut storage, session, input, output)?;
    Ok(format_message(
        &format!("Goodbye! {answered} message(s) answered this session."),
        format,
    ))
}

/// Reads messages line by line until EOF, `quit` or `exit`.
///
/// Returns the number of messages answered.
pub(crate) fn run_chat<S: Storage + ?Sized, R: BufRead, W: Write>(
    bot: &mut SupportBot,
    responder: &mut Responder,
    storage: &mut S,
    session: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    writeln!(output, "{}", bot.greeting())?;
    writeln!(output, "(type 'quit' or 'exit' to leave)")?;

    let mut answered = 0;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = responder.answer(bot, storage, message, session);
        writeln!(output, "{}", format_reply(&reply, OutputFormat::Text))?;
        answered += 1;
    }
    Ok(answered)
}

fn cmd_stats(db_path: &Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let report = AnalyticsReport::from_storage(&storage)?;
    Ok(format_analytics(&report, format))
}

fn cmd_history(db_path: &Path, session: Option<&str>, limit: usize, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let exchanges = storage.list_exchanges(session, Some(limit))?;
    Ok(format_history(&exchanges, format))
}

fn cmd_clear(db_path: &Path, session: Option<&str>, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm clearing conversation history.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    let message = match session {
        Some(session) => {
            let removed = storage.clear_session(session)?;
            format!("Cleared {removed} exchange(s) from session '{session}'.")
        }
        None => {
            storage.reset()?;
            "Conversation history cleared.".to_string()
        }
    };
    Ok(format_message(&message, format))
}

fn cmd_export(db_path: &Path, output: Option<&Path>, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let path = export_conversations(&storage, output)?;
    Ok(format_message(
        &format!("Conversation data exported to: {}", path.display()),
        format,
    ))
}

fn cmd_intents(cli: &Cli, format: OutputFormat) -> Result<String> {
    let catalog = load_catalog(cli.intents.as_deref())?;
    Ok(format_intents(&catalog, format))
}

fn cmd_dataset_analyze(cli: &Cli, format: OutputFormat) -> Result<String> {
    let dataset = load_dataset(cli.dataset.as_deref())?;
    Ok(format_dataset_analysis(&dataset.analyze(), format))
}

fn cmd_dataset_sample(cli: &Cli, intent: Option<&str>, count: usize, format: OutputFormat) -> Result<String> {
    let dataset = load_dataset(cli.dataset.as_deref())?;
    let mut rng = seeded_rng(cli.seed);
    let samples: Vec<_> = (0..count)
        .map_while(|_| dataset.random_example(intent, &mut rng))
        .collect();
    Ok(format_dialogs(&samples, format))
}

fn cmd_dataset_export(cli: &Cli, output: Option<&Path>, format: OutputFormat) -> Result<String> {
    let dataset = load_dataset(cli.dataset.as_deref())?;
    let path = export_training_set(&dataset, output)?;
    Ok(format_message(
        &format!("Training data exported to: {}", path.display()),
        format,
    ))
}

fn cmd_self_test(cli: &Cli, format: OutputFormat) -> Result<String> {
    let mut bot = build_bot(cli)?;
    let report = self_test(&mut bot)?;
    Ok(format_self_test(&report, format))
}

fn cmd_widget(url: &str, width: u32, height: u32, output: Option<&Path>, format: OutputFormat) -> Result<String> {
    validate_agent_url(url)?;

    if let Some(path) = output {
        write_file(path, &render_page(&BotProfile::default(), url, width, height))?;
        return Ok(format_message(
            &format!("Widget page written to: {}", path.display()),
            format,
        ));
    }

    let snippet = iframe_snippet(url, width, height);
    Ok(match format {
        OutputFormat::Text => format!("{snippet}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "snippet": snippet })),
    })
}

#[cfg(feature = "openai")]
fn cmd_sentiment(cli: &Cli, text: &str, format: OutputFormat) -> Result<String> {
    let assistant = require_assistant(cli)?;
    let sentiment = runtime()?.block_on(assistant.analyze_sentiment(text));
    Ok(match format {
        OutputFormat::Text => format!("{} ({:.2})\n", sentiment.label, sentiment.confidence),
        OutputFormat::Json => format_json(&sentiment),
    })
}

#[cfg(feature = "openai")]
fn cmd_summary(
    cli: &Cli,
    db_path: &Path,
    session: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    let exchanges = storage.list_exchanges(session, Some(limit))?;
    let assistant = require_assistant(cli)?;
    let summary = runtime()?.block_on(assistant.summarize(&exchanges));
    Ok(match format {
        OutputFormat::Text => format!("{summary}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({
            "exchanges": exchanges.len(),
            "summary": summary,
        })),
    })
}

#[cfg(feature = "telegram")]
fn cmd_telegram(cli: &Cli, db_path: &Path, token: Option<&str>, format: OutputFormat) -> Result<String> {
    use crate::telegram::{TelegramClient, run_polling};

    let client = TelegramClient::new(token.unwrap_or_default())?;
    let mut storage = open_storage(db_path)?;
    let mut bot = build_bot(cli)?;
    let profile = BotProfile::default();

    runtime()?.block_on(run_polling(&client, &mut bot, &mut storage, &profile))?;
    Ok(format_message("Telegram bot stopped.", format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        (temp_dir, db_path)
    }

    fn run(db_path: &Path, args: &[&str]) -> Result<String> {
        let mut argv = vec!["supportbot", "--db-path", db_path.to_str().unwrap(), "--seed", "11"];
        argv.extend_from_slice(args);
        execute(&Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_cmd_init() {
        let (_temp_dir, db_path) = setup();
        let result = cmd_init(&db_path, false, OutputFormat::Text);
        assert!(result.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_cmd_init_already_exists() {
        let (_temp_dir, db_path) = setup();

        cmd_init(&db_path, false, OutputFormat::Text).unwrap();

        let result = cmd_init(&db_path, false, OutputFormat::Text);
        assert!(result.is_err());

        let result = cmd_init(&db_path, true, OutputFormat::Text);
        assert!(result.is_ok());
    }

    #[test]
    fn test_uninitialized_database() {
        let (_temp_dir, db_path) = setup();
        let err = run(&db_path, &["stats"]).unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[test]
    fn test_cmd_status() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();

        let result = cmd_status(&db_path, OutputFormat::Text);
        assert!(result.unwrap().contains("Exchanges"));
    }

    #[test]
    fn test_cmd_reset() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        run(&db_path, &["ask", "hello", "--no-llm"]).unwrap();

        assert!(cmd_reset(&db_path, false, OutputFormat::Text).is_err());
        assert!(cmd_reset(&db_path, true, OutputFormat::Text).is_ok());
        assert_eq!(open_storage(&db_path).unwrap().exchange_count().unwrap(), 0);
    }

    #[test]
    fn test_ask_records_exchange() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();

        let output = run(&db_path, &["--format", "json", "ask", "What's your return policy?", "--no-llm", "-s", "web"]).unwrap();
        let reply: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(reply["intent"], "returns");

        let history = run(&db_path, &["history", "--session", "web"]).unwrap();
        assert!(history.contains("User: What's your return policy?"));

        let stats = run(&db_path, &["stats"]).unwrap();
        assert!(stats.contains("Total requests:     1"));
        assert!(stats.contains("Success rate:       100.0%"));
    }

    #[test]
    fn test_chat_loop() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        let mut storage = open_storage(&db_path).unwrap();
        let mut bot = SupportBot::builtin().with_seed(5);
        let mut responder = Responder::local();

        let mut input = io::Cursor::new("Where is my order?\n\n   \nHow do I pay?\nquit\nnever read\n");
        let mut output = Vec::new();
        let answered = run_chat(&mut bot, &mut responder, &mut storage, Some("cli"), &mut input, &mut output).unwrap();

        assert_eq!(answered, 2);
        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("intent: order_status"));
        assert_eq!(storage.list_exchanges(Some("cli"), None).unwrap().len(), 2);
    }

    #[test]
    fn test_chat_ends_at_eof() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        let mut storage = open_storage(&db_path).unwrap();
        let mut bot = SupportBot::builtin();
        let mut responder = Responder::local();

        let mut input = io::Cursor::new("hello");
        let mut output = Vec::new();
        let answered = run_chat(&mut bot, &mut responder, &mut storage, None, &mut input, &mut output).unwrap();
        assert_eq!(answered, 1);
    }

    #[test]
    fn test_clear() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        run(&db_path, &["ask", "hello", "--no-llm", "-s", "a"]).unwrap();
        run(&db_path, &["ask", "hello", "--no-llm", "-s", "b"]).unwrap();

        assert!(run(&db_path, &["clear"]).is_err());
        let output = run(&db_path, &["clear", "--yes", "--session", "a"]).unwrap();
        assert!(output.contains("Cleared 1 exchange(s)"));
        assert_eq!(open_storage(&db_path).unwrap().exchange_count().unwrap(), 1);

        run(&db_path, &["clear", "-y"]).unwrap();
        assert_eq!(open_storage(&db_path).unwrap().exchange_count().unwrap(), 0);
    }

    #[test]
    fn test_export() {
        let (temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        run(&db_path, &["ask", "hello", "--no-llm"]).unwrap();

        let target = temp_dir.path().join("export.json");
        let output = run(&db_path, &["export", "--output", target.to_str().unwrap()]).unwrap();
        assert!(output.contains("exported to"));
        assert!(target.exists());
    }

    #[test]
    fn test_intents_and_dataset() {
        let (temp_dir, db_path) = setup();
        let intents = run(&db_path, &["intents"]).unwrap();
        assert!(intents.contains("order_status"));

        let analysis = run(&db_path, &["dataset", "analyze"]).unwrap();
        assert!(analysis.contains("Examples:           36"));

        let sample = run(&db_path, &["--format", "json", "dataset", "sample", "--intent", "returns", "-n", "2"]).unwrap();
        let dialogs: serde_json::Value = serde_json::from_str(&sample).unwrap();
        assert_eq!(dialogs.as_array().unwrap().len(), 2);
        assert_eq!(dialogs[0]["intent"], "returns");

        let none = run(&db_path, &["dataset", "sample", "--intent", "warranty"]).unwrap();
        assert_eq!(none, "No matching dialogs.\n");

        let target = temp_dir.path().join("training.json");
        run(&db_path, &["dataset", "export", "-o", target.to_str().unwrap()]).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn test_self_test_command() {
        let (_temp_dir, db_path) = setup();
        let output = run(&db_path, &["self-test"]).unwrap();
        assert!(output.contains("of 10 passed"));
        assert!(!db_path.exists());
    }

    #[test]
    fn test_widget() {
        let (temp_dir, db_path) = setup();
        let snippet = run(&db_path, &["widget", "--url", "https://bot.example.com/abc"]).unwrap();
        assert!(snippet.starts_with("<iframe height=\"430\" width=\"350\""));

        let page = temp_dir.path().join("widget.html");
        run(&db_path, &["widget", "-u", "https://bot.example.com/abc", "-o", page.to_str().unwrap()]).unwrap();
        assert!(std::fs::read_to_string(&page).unwrap().contains("<!DOCTYPE html>"));

        assert!(run(&db_path, &["widget", "--url", "http://insecure.example.com"]).is_err());
    }

    #[test]
    fn test_unknown_matcher() {
        let (_temp_dir, db_path) = setup();
        cmd_init(&db_path, false, OutputFormat::Text).unwrap();
        assert!(run(&db_path, &["--matcher", "neural", "ask", "hi", "--no-llm"]).is_err());
    }
}
