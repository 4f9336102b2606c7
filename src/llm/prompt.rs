//! System prompts and message builders for the language model.
//!
//! Prompts define the assistant's role; builders format user messages and
//! conversation transcripts.

use std::fmt::Write;

use crate::core::Exchange;

/// System prompt for answering customer messages.
pub const SUPPORT_SYSTEM_PROMPT: &str = r"You are a helpful customer support assistant for an e-commerce company.
You can help with:
- Order status and tracking
- Shipping and delivery information
- Returns and refunds
- Payment methods and billing
- Product information
- Account issues
- General customer support

Be friendly, helpful, and professional. If you don't know something specific, offer to connect the customer with a human agent. Keep responses concise but informative.";

/// System prompt for one-word sentiment classification.
pub const SENTIMENT_SYSTEM_PROMPT: &str =
    "Analyze the sentiment of the following text. Respond with only: positive, negative, or neutral";

/// System prompt for conversation summaries.
pub const SUMMARY_SYSTEM_PROMPT: &str = "Summarize this customer support conversation in 2-3 sentences. Focus on the main issues and resolutions.";

/// Builds the user message, prefixing optional context.
#[must_use]
pub fn build_user_prompt(message: &str, context: &str) -> String {
    if context.trim().is_empty() {
        message.to_string()
    } else {
        format!("Context: {context}\nUser: {message}")
    }
}

/// Renders exchanges as a `User:` / `Assistant:` transcript.
#[must_use]
pub fn build_transcript(exchanges: &[Exchange]) -> String {
    let mut transcript = String::new();
    for exchange in exchanges {
        let _ = write!(
            transcript,
            "User: {}\nAssistant: {}\n\n",
            exchange.user_input, exchange.response
        );
    }
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Reply, ReplySource};

    #[test]
    fn test_build_user_prompt() {
        assert_eq!(build_user_prompt("Where is my order?", ""), "Where is my order?");
        assert_eq!(
            build_user_prompt("Where is my order?", "order #12345"),
            "Context: order #12345\nUser: Where is my order?"
        );
    }

    #[test]
    fn test_build_transcript() {
        let reply = Reply::new("Please share your order number.", "order_status", 1.0, ReplySource::Keyword);
        let exchange = Exchange::from_reply(None, "Where is my order?", &reply);
        let transcript = build_transcript(&[exchange]);
        assert_eq!(
            transcript,
            "User: Where is my order?\nAssistant: Please share your order number.\n\n"
        );
        assert!(build_transcript(&[]).is_empty());
    }

    #[test]
    fn test_prompts_not_empty() {
        assert!(SUPPORT_SYSTEM_PROMPT.contains("Returns and refunds"));
        assert!(SENTIMENT_SYSTEM_PROMPT.ends_with("neutral"));
        assert!(!SUMMARY_SYSTEM_PROMPT.is_empty());
    }
}
