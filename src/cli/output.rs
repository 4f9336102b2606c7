//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::analytics::AnalyticsReport;
use crate::core::{Exchange, IntentCatalog, Reply};
use crate::dataset::{DatasetAnalysis, Dialog};
use crate::engine::SelfTestReport;
use crate::error::Error;
use crate::storage::StorageStats;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for anything but `text` or `json`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config {
                message: format!("unknown output format '{other}' (expected text or json)"),
            }),
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Supportbot Status\n");
            output.push_str("=================\n\n");
            let _ = writeln!(output, "  Exchanges:     {}", stats.exchange_count);
            let _ = writeln!(output, "  Sessions:      {}", stats.session_count);
            let _ = writeln!(output, "  Failures:      {}", stats.failure_count);
            let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
            if let Some(size) = stats.db_size {
                let _ = writeln!(output, "  DB size:       {}", format_size(size));
            }
            output
        }
        OutputFormat::Json => format_json(stats),
    }
}

/// Formats a bot reply.
#[must_use]
pub fn format_reply(reply: &Reply, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!("{}\n\n", reply.text);
            let _ = write!(
                output,
                "  intent: {}  confidence: {:.2}  time: {:.2}s  source: {}",
                reply.intent, reply.confidence, reply.response_time, reply.source
            );
            if let Some(model) = &reply.model {
                let _ = write!(output, "  model: {model}");
            }
            output.push('\n');
            output
        }
        OutputFormat::Json => format_json(reply),
    }
}

/// Formats the analytics report.
#[must_use]
pub fn format_analytics(report: &AnalyticsReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Bot Statistics\n");
            output.push_str("==============\n\n");
            let _ = writeln!(output, "  Total requests:     {}", report.total_requests);
            let _ = writeln!(output, "  Successful:         {}", report.successful_responses);
            let _ = writeln!(output, "  Failed:             {}", report.failed_responses);
            let _ = writeln!(output, "  Success rate:       {}", report.success_rate_display());
            let _ = writeln!(
                output,
                "  Avg response time:  {}",
                report.average_response_time_display()
            );

            let _ = writeln!(
                output,
                "  Model replies:      {} ({})",
                report.language_model_requests,
                report.language_model_share_display()
            );
            let _ = writeln!(output, "  Local replies:      {}", report.local_requests);

            if !report.source_distribution.is_empty() {
                output.push_str("\nReply sources:\n");
                for (source, count) in &report.source_distribution {
                    let _ = writeln!(output, "  {source:<16} {count}");
                }
            }

            let intents = report.top_intents();
            if !intents.is_empty() {
                output.push_str("\nIntent distribution:\n");
                for (intent, count) in intents {
                    let _ = writeln!(output, "  {intent:<16} {count}");
                }
            }
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats a list of exchanges.
#[must_use]
pub fn format_history(exchanges: &[Exchange], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if exchanges.is_empty() {
                return "No conversations recorded.\n".to_string();
            }
            let mut output = String::new();
            for exchange in exchanges {
                let _ = writeln!(
                    output,
                    "[{}] {} ({}, {:.2})",
                    exchange.created_at.format("%Y-%m-%d %H:%M:%S"),
                    exchange.session_id,
                    exchange.intent,
                    exchange.confidence
                );
                let _ = writeln!(output, "  User: {}", exchange.user_input);
                let _ = writeln!(output, "  Bot:  {}", exchange.response);
            }
            output
        }
        OutputFormat::Json => format_json(&exchanges),
    }
}

/// Formats the intent catalog.
#[must_use]
pub fn format_intents(catalog: &IntentCatalog, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "{:<16} {:<10} Keywords", "Intent", "Responses");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for intent in catalog.iter() {
                let _ = writeln!(
                    output,
                    "{:<16} {:<10} {}",
                    intent.name,
                    intent.responses.len(),
                    truncate(&intent.keywords.join(", "), 42)
                );
            }
            output
        }
        OutputFormat::Json => format_json(catalog),
    }
}

/// Formats dataset statistics.
#[must_use]
pub fn format_dataset_analysis(analysis: &DatasetAnalysis, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Dataset Analysis\n");
            output.push_str("================\n\n");
            let _ = writeln!(output, "  Examples:           {}", analysis.total_examples);
            let _ = writeln!(output, "  Intents:            {}", analysis.intent_distribution.len());
            let _ = writeln!(
                output,
                "  Avg per intent:     {:.1}",
                analysis.average_examples_per_intent
            );
            let _ = writeln!(
                output,
                "  Most common:        {}",
                analysis.most_common_intent.as_deref().unwrap_or("-")
            );
            let _ = writeln!(
                output,
                "  Least common:       {}",
                analysis.least_common_intent.as_deref().unwrap_or("-")
            );
            output.push_str("\nExamples per intent:\n");
            for (intent, count) in &analysis.intent_distribution {
                let _ = writeln!(output, "  {intent:<16} {count}");
            }
            output
        }
        OutputFormat::Json => format_json(analysis),
    }
}

/// Formats sampled training dialogs.
#[must_use]
pub fn format_dialogs(dialogs: &[&Dialog], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if dialogs.is_empty() {
                return "No matching dialogs.\n".to_string();
            }
            let mut output = String::new();
            for dialog in dialogs {
                let _ = writeln!(output, "[{}]", dialog.intent);
                let _ = writeln!(output, "  Input:  {}", dialog.input);
                let _ = writeln!(output, "  Output: {}", dialog.output);
            }
            output
        }
        OutputFormat::Json => format_json(&dialogs),
    }
}

/// Formats a self-test report.
#[must_use]
pub fn format_self_test(report: &SelfTestReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            for case in &report.cases {
                let _ = writeln!(
                    output,
                    "{} {:<40} {:<14} {:.2}",
                    if case.passed { "PASS" } else { "FAIL" },
                    truncate(&case.input, 40),
                    case.intent,
                    case.confidence
                );
            }
            let _ = writeln!(
                output,
                "\n{} of {} passed, {} failed",
                report.passed, report.total, report.failed
            );
            output
        }
        OutputFormat::Json => format_json(report),
    }
}

/// Formats a one-line confirmation, or `{"message": ...}` in JSON.
#[must_use]
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "message": message })),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "success": false,
            "error": {
                "kind": error_kind(error),
                "message": error.to_string(),
            },
        })),
    }
}

const fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Storage(_) => "storage",
        Error::Intent(_) => "intent",
        Error::Io(_) => "io",
        Error::Command(_) => "command",
        #[cfg(feature = "openai")]
        Error::Llm(_) => "llm",
        #[cfg(feature = "telegram")]
        Error::Telegram(_) => "telegram",
        Error::Config { .. } => "config",
    }
}

/// Formats a value as JSON.
pub(crate) fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Truncates to `max_chars` characters with an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReplySource;
    use crate::error::StorageError;
    use crate::storage::{MemoryStorage, Storage};

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text").unwrap(), OutputFormat::Text);

        let err = OutputFormat::parse("yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(error_kind(&err), "config");
        assert!(err.to_string().contains("'yaml'"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Ça va très bien", 6), "Ça ...");
    }

    #[test]
    fn test_format_status() {
        let stats = StorageStats {
            exchange_count: 12,
            session_count: 3,
            failure_count: 1,
            schema_version: 2,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Exchanges:     12"));
        assert!(text.contains("DB size:       4.0 KB"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"session_count\": 3"));
    }

    #[test]
    fn test_format_reply() {
        let reply = Reply::new("We ship worldwide.", "shipping", 0.5, ReplySource::Keyword);
        let text = format_reply(&reply, OutputFormat::Text);
        assert!(text.starts_with("We ship worldwide.\n\n"));
        assert!(text.contains("intent: shipping  confidence: 0.50"));
        assert!(!text.contains("model:"));

        let json: serde_json::Value = serde_json::from_str(&format_reply(&reply, OutputFormat::Json)).unwrap();
        assert_eq!(json["source"], "keyword");
    }

    #[test]
    fn test_format_analytics_reply_sources() {
        let mut storage = MemoryStorage::new();
        storage.init().unwrap();
        for (intent, source) in [
            ("openai_response", ReplySource::LanguageModel),
            ("shipping", ReplySource::Keyword),
        ] {
            let reply = Reply::new("ok", intent, 0.9, source);
            storage.add_exchange(&Exchange::from_reply(None, "msg", &reply)).unwrap();
        }
        let report = AnalyticsReport::from_storage(&storage).unwrap();

        let text = format_analytics(&report, OutputFormat::Text);
        assert!(text.contains("  Model replies:      1 (50.0%)"));
        assert!(text.contains("  Local replies:      1"));
        assert!(text.contains("\nReply sources:\n"));
        assert!(text.contains("  language_model   1"));

        let json: serde_json::Value = serde_json::from_str(&format_analytics(&report, OutputFormat::Json)).unwrap();
        assert_eq!(json["source_distribution"]["keyword"], 1);
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history(&[], OutputFormat::Text), "No conversations recorded.\n");
        assert_eq!(format_history(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn test_format_error() {
        let err: Error = StorageError::NotInitialized.into();
        assert!(format_error(&err, OutputFormat::Text).contains("supportbot init"));
        let json: serde_json::Value = serde_json::from_str(&format_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "storage");
    }
}
