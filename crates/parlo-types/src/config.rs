//! Context management configuration for Parlo.
//!
//! `ContextConfig` controls how much conversation history is sent to the
//! model per turn and when older messages get compressed into a summary.
//! The config is threaded through each request as a value rather than held
//! in shared mutable state, so differently configured requests never bleed
//! into each other under concurrent load.

use serde::{Deserialize, Serialize};

use crate::context::SummaryStrategy;
use crate::error::ConfigError;

/// Valid range for `recent_window_size`.
pub const RECENT_WINDOW_RANGE: std::ops::RangeInclusive<usize> = 5..=50;

/// Valid range for `summarize_after_messages`.
pub const SUMMARIZE_AFTER_RANGE: std::ops::RangeInclusive<usize> = 5..=30;

/// Configuration for context window construction.
///
/// Loaded from `config.toml` or supplied per request. All fields have
/// defaults; `validate` enforces the documented ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// When true, the whole message log is sent verbatim and no summary is
    /// ever produced, regardless of the window/threshold settings.
    #[serde(default)]
    pub disable_summarization: bool,

    /// How many of the newest messages are always sent raw (5..=50).
    #[serde(default = "default_recent_window_size")]
    pub recent_window_size: usize,

    /// Minimum number of older messages before summarization kicks in (5..=30).
    #[serde(default = "default_summarize_after")]
    pub summarize_after_messages: usize,

    /// Which provider handles the summarization call.
    #[serde(default = "default_summary_strategy")]
    pub summarization_provider: SummaryStrategy,

    /// Upper bound on a single provider call, enforced at the call site.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_recent_window_size() -> usize {
    20
}

fn default_summarize_after() -> usize {
    10
}

fn default_summary_strategy() -> SummaryStrategy {
    SummaryStrategy::Same
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            disable_summarization: false,
            recent_window_size: default_recent_window_size(),
            summarize_after_messages: default_summarize_after(),
            summarization_provider: default_summary_strategy(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ContextConfig {
    /// Check that all values fall within their documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !RECENT_WINDOW_RANGE.contains(&self.recent_window_size) {
            return Err(ConfigError::OutOfRange {
                field: "recent_window_size",
                value: self.recent_window_size.to_string(),
                range: format!(
                    "{}..={}",
                    RECENT_WINDOW_RANGE.start(),
                    RECENT_WINDOW_RANGE.end()
                ),
            });
        }
        if !SUMMARIZE_AFTER_RANGE.contains(&self.summarize_after_messages) {
            return Err(ConfigError::OutOfRange {
                field: "summarize_after_messages",
                value: self.summarize_after_messages.to_string(),
                range: format!(
                    "{}..={}",
                    SUMMARIZE_AFTER_RANGE.start(),
                    SUMMARIZE_AFTER_RANGE.end()
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "request_timeout_secs",
                value: "0".to_string(),
                range: "1..".to_string(),
            });
        }
        Ok(())
    }
}
