//! Intents and the intent catalog.
//!
//! An intent pairs a set of trigger keywords with canned responses. The
//! catalog is ordered: when two intents score the same, the earlier one wins.

use crate::error::{IntentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Intent reported when nothing matched.
pub const FALLBACK_INTENT: &str = "fallback";

/// Intent reported for blank input.
pub const EMPTY_INPUT_INTENT: &str = "empty_input";

/// Intent reported when a reply could not be recorded.
pub const ERROR_INTENT: &str = "error";

/// Intent names the engine reserves for its own replies.
pub const RESERVED_INTENTS: &[&str] = &[FALLBACK_INTENT, EMPTY_INPUT_INTENT, ERROR_INTENT];

/// Reply for blank input.
pub const EMPTY_INPUT_RESPONSE: &str = "Please enter a message so I can help you!";

/// Reply when an exchange could not be recorded.
pub const ERROR_RESPONSE: &str = "I'm sorry, I encountered an error. Please try again.";

/// Replies used when no intent matched.
pub const FALLBACK_RESPONSES: &[&str] = &[
    "I'm sorry, I didn't quite understand that. Could you please rephrase your question?",
    "I'm not sure I can help with that specific question. Could you try asking in a different way?",
    "I don't have information about that. Let me connect you with a human agent who can help better.",
    "That's an interesting question! I might not have the exact answer, but I can connect you with our support team.",
    "I'm still learning! Could you try asking about order status, shipping, returns, or product information?",
];

/// Opening lines for interactive sessions.
pub const GREETING_MESSAGES: &[&str] = &[
    "Hi! Welcome to our customer support. How can I help you today?",
    "Hello! I'm here to assist you with any questions or concerns.",
    "Hi there! Welcome to our support center. What can I help you with?",
    "Hello! How can I make your day better today?",
];

/// A recognised user goal with trigger keywords and canned responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent name (e.g. `order_status`).
    pub name: String,
    /// Lowercase substrings that indicate this intent.
    pub keywords: Vec<String>,
    /// Candidate replies; one is chosen at random.
    pub responses: Vec<String>,
}

impl Intent {
    /// Creates an intent from borrowed keyword and response lists.
    #[must_use]
    pub fn new(name: &str, keywords: &[&str], responses: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            responses: responses.iter().map(ToString::to_string).collect(),
        }
    }

    /// Counts how many keywords occur in already-lowercased input.
    #[must_use]
    pub fn keyword_hits(&self, lowered_input: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| lowered_input.contains(k.as_str()))
            .count()
    }
}

/// Ordered collection of intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCatalog {
    intents: Vec<Intent>,
}

/// Accepted on-disk shapes for a catalog document.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { intents: Vec<Intent> },
    Bare(Vec<Intent>),
}

impl IntentCatalog {
    /// Builds a catalog after validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the intents fail [`IntentCatalog::validate`].
    pub fn new(intents: Vec<Intent>) -> Result<Self> {
        let catalog = Self { intents };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses a catalog from JSON.
    ///
    /// Accepts either a bare array of intents or `{"intents": [...]}`.
    /// Keywords are lowercased on load.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| IntentError::Parse {
                what: "intent catalog",
                reason: e.to_string(),
            })?;
        let mut intents = match doc {
            CatalogDocument::Wrapped { intents } | CatalogDocument::Bare(intents) => intents,
        };
        for intent in &mut intents {
            for keyword in &mut intent.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
        Self::new(intents)
    }

    /// Checks catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty catalog, blank or reserved names,
    /// duplicates, blank keywords, or intents without keywords or responses.
    pub fn validate(&self) -> Result<()> {
        if self.intents.is_empty() {
            return Err(IntentError::EmptyCatalog.into());
        }

        let mut seen = HashSet::new();
        for intent in &self.intents {
            if intent.name.trim().is_empty() {
                return Err(IntentError::InvalidIntent {
                    name: intent.name.clone(),
                    reason: "name must not be blank".to_string(),
                }
                .into());
            }
            if RESERVED_INTENTS.contains(&intent.name.as_str()) {
                return Err(IntentError::ReservedName {
                    name: intent.name.clone(),
                }
                .into());
            }
            if !seen.insert(intent.name.as_str()) {
                return Err(IntentError::DuplicateIntent {
                    name: intent.name.clone(),
                }
                .into());
            }
            if intent.keywords.is_empty() {
                return Err(IntentError::InvalidIntent {
                    name: intent.name.clone(),
                    reason: "at least one keyword is required".to_string(),
                }
                .into());
            }
            if intent.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(IntentError::InvalidIntent {
                    name: intent.name.clone(),
                    reason: "keywords must not be blank".to_string(),
                }
                .into());
            }
            if intent.responses.is_empty() {
                return Err(IntentError::InvalidIntent {
                    name: intent.name.clone(),
                    reason: "at least one response is required".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Looks up an intent by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name == name)
    }

    /// Intent names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.intents.iter().map(|i| i.name.as_str()).collect()
    }

    /// Iterates intents in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Intent> {
        self.intents.iter()
    }

    /// Number of intents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Returns true if the catalog holds no intents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// The built-in customer support catalog.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn customer_support() -> Self {
        let intents = vec![
            Intent::new(
                "greeting",
                &["hi", "hello", "hey", "good morning", "good afternoon", "good evening"],
                GREETING_MESSAGES,
            ),
            Intent::new(
                "order_status",
                &["order", "status", "tracking", "shipped", "delivery", "where is my order", "track my order"],
                &[
                    "I can help you track your order! Please provide your order number and I'll check the status for you.",
                    "To check your order status, I'll need your order number. What's your order number?",
                    "I can look up your order status. Please share your order number with me.",
                    "Let me help you track your order. Could you please provide your order number?",
                ],
            ),
            Intent::new(
                "shipping",
                &["shipping", "delivery", "shipping time", "how long", "when will it arrive", "delivery time"],
                &[
                    "We offer standard shipping (3-5 business days) and express shipping (1-2 business days). Which option would you like to know more about?",
                    "Shipping times vary by location. Standard delivery is 3-5 days, express is 1-2 days.",
                    "We have two shipping options: standard (3-5 days) and express (1-2 days). Which would you prefer?",
                    "Standard shipping takes 3-5 business days, while express shipping takes 1-2 business days.",
                ],
            ),
            Intent::new(
                "returns",
                &["return", "refund", "exchange", "cancel", "return policy", "how to return"],
                &[
                    "We offer a 30-day return policy. Items must be in original condition with packaging. Would you like me to help you start a return?",
                    "Returns are accepted within 30 days of purchase. Please keep your receipt and original packaging.",
                    "You can return items within 30 days. I can help you start the return process if you'd like.",
                    "Our return policy allows returns within 30 days. Items must be in original condition.",
                ],
            ),
            Intent::new(
                "payment",
                &["payment", "billing", "charge", "credit card", "payment method", "invoice", "billing issue"],
                &[
                    "We accept all major credit cards, PayPal, and bank transfers. How can I help with your payment?",
                    "You can pay with Visa, MasterCard, American Express, PayPal, or bank transfer.",
                    "We accept multiple payment methods including credit cards and PayPal. What payment issue can I help with?",
                    "For payment assistance, we accept credit cards, PayPal, and bank transfers.",
                ],
            ),
            Intent::new(
                "product_info",
                &["product", "specifications", "features", "size", "color", "availability", "product details"],
                &[
                    "I'd be happy to help with product information. Which product are you interested in?",
                    "Let me get you the details on that product. What specific information do you need?",
                    "I can provide product specifications and availability. What product are you asking about?",
                    "I'd love to help with product details. Which product would you like to know more about?",
                ],
            ),
            Intent::new(
                "contact",
                &["contact", "phone", "email", "support", "help", "speak to someone", "human agent"],
                &[
                    "You can reach our support team at support@company.com or call 1-800-SUPPORT. Our team is available 24/7!",
                    "For immediate assistance, call us at 1-800-SUPPORT or email support@company.com.",
                    "Our support team is available 24/7. Call 1-800-SUPPORT or email support@company.com.",
                    "You can contact us at support@company.com or call 1-800-SUPPORT for immediate help.",
                ],
            ),
            Intent::new(
                "account",
                &["account", "login", "password", "profile", "sign up", "register", "account issue"],
                &[
                    "I can help with account issues. Are you having trouble logging in or creating an account?",
                    "For account support, please provide your email address and I'll assist you.",
                    "I can help with account-related questions. What specific issue are you experiencing?",
                    "Let me help you with your account. What's the problem you're facing?",
                ],
            ),
            Intent::new(
                "complaint",
                &["complaint", "problem", "issue", "dissatisfied", "unhappy", "bad experience"],
                &[
                    "I'm sorry to hear about your experience. Let me help resolve this issue for you. Can you tell me more details?",
                    "I apologize for any inconvenience. I'm here to help make things right. What happened?",
                    "I'm sorry you're having a problem. Let me assist you in resolving this issue.",
                    "I understand your concern. Let me help you with this issue right away.",
                ],
            ),
            Intent::new(
                "goodbye",
                &["bye", "goodbye", "thanks", "thank you", "see you", "farewell"],
                &[
                    "You're welcome! Have a great day!",
                    "Thank you for contacting us! Feel free to reach out anytime.",
                    "Happy to help! Take care!",
                    "You're welcome! Don't hesitate to contact us if you need anything else.",
                ],
            ),
        ];
        Self { intents }
    }
}

impl Default for IntentCatalog {
    fn default() -> Self {
        Self::customer_support()
    }
}

impl<'a> IntoIterator for &'a IntentCatalog {
    type Item = &'a Intent;
    type IntoIter = std::slice::Iter<'a, Intent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.iter()
    }
}
