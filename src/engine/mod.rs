//! Message processing.
//!
//! [`SupportBot`] turns one user message into a [`Reply`] and records the
//! exchange. Matching is delegated to a [`MatcherChain`]; reply selection
//! among canned responses uses a seedable RNG so runs can be reproduced.


pub use self_test::{SELF_TEST_INPUTS, SELF_TEST_THRESHOLD, SelfTestCase, SelfTestReport, self_test};

use crate::core::{
    EMPTY_INPUT_INTENT, EMPTY_INPUT_RESPONSE, ERROR_INTENT, ERROR_RESPONSE, Exchange,
    FALLBACK_INTENT, FALLBACK_RESPONSES, GREETING_MESSAGES, IntentCatalog, Reply, ReplySource,
};
use crate::dataset::Dataset;
use crate::matching::{IntentMatcher, MatcherChain, default_matcher};
use crate::storage::Storage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::time::Instant;
use tracing::{error, info};

#[cfg(feature = "openai")]
use crate::llm::Assistant;

/// The customer support bot.
///
/// # Examples
///
/// ```
/// use supportbot::engine::SupportBot;
/// use supportbot::storage::{MemoryStorage, Storage};
///
/// let mut storage = MemoryStorage::new();
/// storage.init().unwrap();
///
/// let mut bot = SupportBot::builtin().with_seed(7);
/// let reply = bot.process_message(&mut storage, "How long does shipping take?", None);
/// assert_eq!(reply.intent, "shipping");
/// assert_eq!(storage.exchange_count().unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct SupportBot {
    catalog: IntentCatalog,
    matcher: MatcherChain,
    rng: StdRng,
}

impl SupportBot {
    /// Creates a bot from a catalog and a matcher chain.
    #[must_use]
    pub fn new(catalog: IntentCatalog, matcher: MatcherChain) -> Self {
        Self {
            catalog,
            matcher,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Built-in catalog and dataset with the layered matcher.
    #[must_use]
    pub fn builtin() -> Self {
        let catalog = IntentCatalog::customer_support();
        let matcher = default_matcher(&catalog, &Dataset::builtin());
        Self::new(catalog, matcher)
    }

    /// Reseeds reply selection for deterministic output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The intent catalog.
    #[must_use]
    pub const fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    /// The matcher chain.
    #[must_use]
    pub const fn matcher(&self) -> &MatcherChain {
        &self.matcher
    }

    /// A random opening line.
    pub fn greeting(&mut self) -> String {
        GREETING_MESSAGES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    }

    fn fallback_text(&mut self) -> String {
        FALLBACK_RESPONSES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    }

    /// Produces a reply without recording it.
    ///
    /// Blank input yields the empty-input prompt.
    pub fn reply_to(&mut self, input: &str) -> Reply {
        if input.trim().is_empty() {
            return empty_input_reply();
        }

        let Some(found) = self.matcher.match_intent(input) else {
            let text = self.fallback_text();
            return Reply::new(text, FALLBACK_INTENT, 0.0, ReplySource::Fallback);
        };

        let canned = match &found.response {
            Some(text) => Some(text.clone()),
            None => self
                .catalog
                .get(&found.intent)
                .and_then(|intent| intent.responses.choose(&mut self.rng))
                .cloned(),
        };
        let text = canned.unwrap_or_else(|| self.fallback_text());

        Reply::new(text, found.intent, found.confidence.clamp(0.0, 1.0), found.source)
    }

    /// Answers `input` and records the exchange under `session`.
    ///
    /// Blank input is answered but not recorded. If recording fails the
    /// failure is counted and the generic error reply is returned instead.
    pub fn process_message<S: Storage + ?Sized>(
        &mut self,
        storage: &mut S,
        input: &str,
        session: Option<&str>,
    ) -> Reply {
        if input.trim().is_empty() {
            return empty_input_reply();
        }

        let started = Instant::now();
        let reply = self.reply_to(input);
        let reply = reply.with_response_time(started.elapsed().as_secs_f64());
        record(storage, input, session, reply)
    }

    /// Answers through the language model, falling back to local matching.
    ///
    /// Any model error is logged and the local pipeline answers instead.
    #[cfg(feature = "openai")]
    pub async fn process_with_assistant<S: Storage + ?Sized>(
        &mut self,
        storage: &mut S,
        assistant: &mut Assistant,
        input: &str,
        session: Option<&str>,
    ) -> Reply {
        if input.trim().is_empty() {
            return empty_input_reply();
        }

        let started = Instant::now();
        match assistant.respond(input, "").await {
            Ok(reply) => {
                let reply = reply.with_response_time(started.elapsed().as_secs_f64());
                record(storage, input, session, reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "language model failed, using local matcher");
                self.process_message(storage, input, session)
            }
        }
    }
}

impl Default for SupportBot {
    fn default() -> Self {
        Self::builtin()
    }
}

fn empty_input_reply() -> Reply {
    Reply::new(EMPTY_INPUT_RESPONSE, EMPTY_INPUT_INTENT, 0.0, ReplySource::System)
}

fn record<S: Storage + ?Sized>(storage: &mut S, input: &str, session: Option<&str>, reply: Reply) -> Reply {
    let exchange = Exchange::from_reply(session, input, &reply);

    match storage.add_exchange(&exchange) {
        Ok(id) => {
            info!(
                id,
                intent = %reply.intent,
                confidence = format_args!("{:.2}", reply.confidence),
                response_time = format_args!("{:.2}s", reply.response_time),
                "processed message"
            );
            reply
        }
        Err(e) => {
            error!(error = %e, "failed to record exchange");
            if let Err(e) = storage.record_failure() {
                error!(error = %e, "failed to count failure");
            }
            Reply::new(ERROR_RESPONSE, ERROR_INTENT, 0.0, ReplySource::System)
                .with_response_time(reply.response_time)
        }
    }
}
