//! Decides whether an inbound message is sent to the NLU service.
//!
//! Three gates, in priority order: the sender ignore list, the per-room
//! active-conversation flag, and the configured start pattern. Accepted
//! messages have the bot mention prefix stripped before forwarding.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use tracing::{info, warn};

use crate::base::config::Config;

/// Pattern used when no start pattern is configured, or the configured one is rejected.
const DEFAULT_START_PATTERN: &str = "lex";

/// Upper bound on the compiled pattern size. Patterns that blow past this are
/// treated as unsafe and replaced with the default.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Per-message forward/ignore gate.
///
/// Built once at startup; immutable for the process lifetime.
pub struct TriggerFilter {
    ignore_user_ids: HashSet<String>,
    start_pattern: Regex,
    mention_token: String,
}

impl TriggerFilter {
    /// Creates the filter from configuration.
    ///
    /// `mention_token` is the literal token the chat platform uses to address
    /// the bot (e.g. `<@U12345>` on Slack).
    pub fn new(config: &Config, mention_token: &str) -> Self {
        let ignore_user_ids = config
            .ignore_user_ids
            .split(',')
            .map(|id| id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();

        let start_pattern = compile_start_pattern(config.start_pattern.as_deref());

        Self {
            ignore_user_ids,
            start_pattern,
            mention_token: mention_token.to_string(),
        }
    }

    /// Decides whether the message should be forwarded to the NLU service.
    ///
    /// Returns the cleaned text to forward, or `None` when the message should
    /// be ignored. `conversation_active` is the current conversation state for
    /// the originating room; when set, the start pattern is bypassed.
    pub fn evaluate(&self, user_id: &str, text: &str, conversation_active: bool) -> Option<String> {
        if self.ignore_user_ids.contains(&user_id.to_lowercase()) {
            info!("Ignoring user {}.", user_id);
            return None;
        }

        if conversation_active {
            info!("Continuing active conversation.");
        } else if self.start_pattern.is_match(text) {
            info!("Responding to start pattern {}.", self.start_pattern.as_str());
        } else {
            return None;
        }

        Some(self.clean(text))
    }

    /// Strips one leading mention token (and at most one following space),
    /// then trims surrounding whitespace.
    fn clean(&self, text: &str) -> String {
        let trimmed = text.trim_start();

        let rest = match trimmed.split_at_checked(self.mention_token.len()) {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(&self.mention_token) => rest.strip_prefix(' ').unwrap_or(rest),
            _ => trimmed,
        };

        rest.trim().to_string()
    }
}

/// Compiles the configured start pattern, falling back to the default when the
/// pattern is unset or rejected by the regex engine.
fn compile_start_pattern(configured: Option<&str>) -> Regex {
    if let Some(pattern) = configured {
        match RegexBuilder::new(pattern).case_insensitive(true).size_limit(PATTERN_SIZE_LIMIT).build() {
            Ok(regex) => return regex,
            Err(err) => {
                warn!("Start pattern {:?} not usable ({}); using default.", pattern, err);
            }
        }
    } else {
        info!("Start pattern not specified; using default.");
    }

    RegexBuilder::new(DEFAULT_START_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("default start pattern compiles")
}
