//! Telegram long-polling front end.
//!
//! Each Telegram user gets their own session, keyed by user id, so
//! `/clear` only forgets that user's history.

mod client;

pub use client::{API_BASE, Chat, Message, POLL_TIMEOUT_SECS, TelegramClient, Update, User, next_offset};

use crate::analytics::AnalyticsReport;
use crate::config::BotProfile;
use crate::engine::SupportBot;
use crate::error::{Error, IntentError, Result, TelegramError};
use crate::export::export_conversations;
use crate::storage::Storage;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause before polling again after a transport error.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Reply to `/help`.
pub const HELP_MESSAGE: &str = "📋 Available Commands:

/start - Start the bot and see welcome message
/help - Show this help message
/stats - View bot analytics and statistics
/clear - Clear conversation history
/export - Export conversation data

💬 You can also just type your questions directly!

Examples:
• \"Where is my order?\"
• \"What's your return policy?\"
• \"How long does shipping take?\"
• \"I need help with my account\"
• \"What payment methods do you accept?\"";

/// Reply to `/clear`.
pub const CLEARED_MESSAGE: &str = "🗑️ Conversation history cleared! Start fresh with your questions.";

/// Slash commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/stats`
    Stats,
    /// `/clear`
    Clear,
    /// `/export`
    Export,
}

fn command_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^/([A-Za-z]+)(?:@[A-Za-z0-9_]+)?(?:\s|$)"))
        .as_ref()
        .map_err(|e| IntentError::Regex(e.to_string()).into())
}

impl BotCommand {
    /// Parses a leading slash command, with or without an `@botname` suffix.
    ///
    /// Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Result<Option<Self>> {
        let Some(captures) = command_pattern()?.captures(text.trim_start()) else {
            return Ok(None);
        };
        let command = match captures[1].to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "stats" => Some(Self::Stats),
            "clear" => Some(Self::Clear),
            "export" => Some(Self::Export),
            _ => None,
        };
        Ok(command)
    }
}

/// Capitalizes each word the way intent names are shown to users.
///
/// `order_status` becomes `Order_Status`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            titled.push(c);
            word_start = true;
        }
    }
    titled
}

/// Reply to `/start`.
#[must_use]
pub fn welcome_message(profile: &BotProfile) -> String {
    format!(
        "🤖 Welcome to {}!

{}

I can help you with:
• Order status and tracking
• Shipping and delivery information
• Returns and refunds
• Payment methods and billing
• Product information
• Account issues
• Contact information

Type /help to see all available commands or just start chatting with me!

How can I assist you today? 😊",
        profile.name, profile.description
    )
}

/// Reply to `/stats`.
#[must_use]
pub fn stats_message(report: &AnalyticsReport) -> String {
    let mut message = format!(
        "📊 Bot Statistics:

📈 Performance Metrics:
• Total Requests: {}
• Success Rate: {}
• Average Response Time: {}

🤖 Reply Sources:
• Language Model: {} ({})
• Local Matching: {}

🎯 Intent Distribution:
",
        report.total_requests,
        report.success_rate_display(),
        report.average_response_time_display(),
        report.language_model_requests,
        report.language_model_share_display(),
        report.local_requests
    );
    for (intent, count) in report.top_intents() {
        let _ = writeln!(message, "• {}: {count}", title_case(intent));
    }
    message
}

/// Produces the reply for one incoming text message from `user_id`.
///
/// # Errors
///
/// Returns an error if analytics or export fail. Plain messages never fail;
/// recording problems are handled by the engine.
pub fn handle_text<S: Storage + ?Sized>(
    bot: &mut SupportBot,
    storage: &mut S,
    profile: &BotProfile,
    text: &str,
    user_id: i64,
) -> Result<String> {
    let session = user_id.to_string();
    match BotCommand::parse(text)? {
        Some(BotCommand::Start) => Ok(welcome_message(profile)),
        Some(BotCommand::Help) => Ok(HELP_MESSAGE.to_string()),
        Some(BotCommand::Stats) => Ok(stats_message(&AnalyticsReport::from_storage(storage)?)),
        Some(BotCommand::Clear) => {
            let removed = storage.clear_session(&session)?;
            info!(session = %session, removed, "cleared session");
            Ok(CLEARED_MESSAGE.to_string())
        }
        Some(BotCommand::Export) => {
            let path = export_conversations(storage, None)?;
            Ok(format!("📥 Conversation data exported to: {}", path.display()))
        }
        None => {
            let reply = bot.process_message(storage, text, Some(&session));
            Ok(format!(
                "{}\n\n🎯 Intent: {}\n📊 Confidence: {:.2}\n⏱️ Response Time: {:.2}s",
                reply.text,
                title_case(&reply.intent),
                reply.confidence,
                reply.response_time
            ))
        }
    }
}

/// Polls for updates and answers them until Ctrl-C.
///
/// Transport errors are logged and retried after [`RETRY_DELAY`]; API
/// rejections (for example a revoked token) stop the loop.
///
/// # Errors
///
/// Returns the API error that stopped polling.
pub async fn run_polling<S: Storage + ?Sized>(
    client: &TelegramClient,
    bot: &mut SupportBot,
    storage: &mut S,
    profile: &BotProfile,
) -> Result<()> {
    poll_until(client, bot, storage, profile, tokio::signal::ctrl_c()).await
}

/// Polling loop behind [`run_polling`], stopping once `shutdown` resolves.
///
/// `shutdown` is polled while waiting for updates and while backing off,
/// so a signal that arrives during message handling is seen on the next wait.
///
/// # Errors
///
/// Returns the API error that stopped polling.
pub async fn poll_until<S, F>(
    client: &TelegramClient,
    bot: &mut SupportBot,
    storage: &mut S,
    profile: &BotProfile,
    shutdown: F,
) -> Result<()>
where
    S: Storage + ?Sized,
    F: Future<Output = std::io::Result<()>>,
{
    info!(name = %profile.name, "starting telegram bot");
    tokio::pin!(shutdown);
    let mut offset = None;

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => {
                info!("stopping telegram bot");
                return Ok(());
            }
            polled = client.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(Error::Telegram(TelegramError::Transport(reason))) => {
                warn!(error = %reason, delay_secs = RETRY_DELAY.as_secs(), "polling failed, retrying");
                tokio::select! {
                    _ = &mut shutdown => {
                        info!("stopping telegram bot");
                        return Ok(());
                    }
                    () = tokio::time::sleep(RETRY_DELAY) => {}
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        offset = next_offset(offset, &updates);
        for update in &updates {
            let Some((chat_id, user_id, text)) = update.text_message() else {
                continue;
            };
            info!(user_id, chat_id, "message received");

            let answer = match handle_text(bot, storage, profile, text, user_id) {
                Ok(answer) => answer,
                Err(e) => {
                    error!(error = %e, "failed to handle message");
                    crate::core::ERROR_RESPONSE.to_string()
                }
            };
            if let Err(e) = client.send_message(chat_id, &answer).await {
                warn!(error = %e, chat_id, "failed to send reply");
            }
        }
    }
}
