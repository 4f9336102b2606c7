//! Embed snippets for an externally hosted agent.
//!
//! The hosted agent itself lives on the vendor platform; these helpers only
//! produce HTML that points at its public URL.

use crate::config::BotProfile;
use crate::error::{CommandError, IntentError, Result};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// Default iframe width in pixels.
pub const DEFAULT_WIDTH: u32 = 350;

/// Default iframe height in pixels.
pub const DEFAULT_HEIGHT: u32 = 430;

/// Default output file for [`render_page`].
pub const DEFAULT_PAGE_FILE: &str = "support_widget.html";

/// Topics listed under the embedded agent.
pub const SUPPORT_TOPICS: &[&str] = &[
    "Order Status & Tracking",
    "Shipping Information",
    "Returns & Refunds",
    "Payment Methods",
    "Product Information",
    "Account Support",
    "Contact Information",
    "General Inquiries",
];

fn agent_url_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^https://[A-Za-z0-9.-]+(:[0-9]+)?(/[^\s<>\x22']*)?$"))
        .as_ref()
        .map_err(|e| IntentError::Regex(e.to_string()).into())
}

/// Checks that `url` is an absolute `https://` URL safe to embed.
///
/// # Errors
///
/// Returns [`CommandError::InvalidArgument`] for anything else.
pub fn validate_agent_url(url: &str) -> Result<()> {
    if agent_url_pattern()?.is_match(url) {
        Ok(())
    } else {
        Err(CommandError::InvalidArgument(format!("agent URL must be an https:// URL, got '{url}'")).into())
    }
}

/// The `<iframe>` tag embedding the agent.
///
/// # Examples
///
/// ```
/// use supportbot::widget::iframe_snippet;
///
/// assert_eq!(
///     iframe_snippet("https://agent.example.com/abc", 350, 430),
///     r#"<iframe height="430" width="350" src="https://agent.example.com/abc"></iframe>"#
/// );
/// ```
#[must_use]
pub fn iframe_snippet(url: &str, width: u32, height: u32) -> String {
    format!(
        r#"<iframe height="{height}" width="{width}" src="{}"></iframe>"#,
        html_escape::encode_double_quoted_attribute(url)
    )
}

/// A standalone HTML page hosting the agent iframe.
#[must_use]
pub fn render_page(profile: &BotProfile, url: &str, width: u32, height: u32) -> String {
    let name = html_escape::encode_text(&profile.name);
    let description = html_escape::encode_text(&profile.description);

    let mut topics = String::new();
    for topic in SUPPORT_TOPICS {
        let _ = writeln!(topics, "                <li>{}</li>", html_escape::encode_text(topic));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name}</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            padding: 20px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
        }}
        .container {{
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 40px rgba(0,0,0,0.1);
            max-width: 800px;
            width: 100%;
            text-align: center;
            overflow: hidden;
        }}
        .header {{
            background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%);
            color: white;
            padding: 40px;
        }}
        .chat-container {{ padding: 40px; }}
        iframe {{
            border: none;
            border-radius: 10px;
            box-shadow: 0 5px 15px rgba(0,0,0,0.1);
            margin: 20px 0;
        }}
        .info {{
            background: #f8f9fa;
            padding: 20px;
            border-radius: 10px;
        }}
        .info ul {{ text-align: left; max-width: 400px; margin: 0 auto; }}
        .info li {{ margin: 8px 0; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{name}</h1>
            <p>{description}</p>
        </div>
        <div class="chat-container">
            <h2>Chat with our assistant</h2>
            <p>Ask about orders, shipping, returns, payments, or any other support question.</p>
            {iframe}
            <div class="info">
                <h3>What I can help with</h3>
                <ul>
{topics}                </ul>
            </div>
        </div>
    </div>
</body>
</html>
"#,
        iframe = iframe_snippet(url, width, height),
    )
}
