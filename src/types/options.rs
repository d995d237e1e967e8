//! Session options and configuration
//!
//! The gate interval, initialization timeout and settle delay directly shape
//! the concurrency contract, so they are configuration rather than literals.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// Minimum spacing between turn start times (2 seconds)
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 2000;

/// Upper bound on session initialization (30 seconds)
pub const DEFAULT_INIT_TIMEOUT_MS: u64 = 30_000;

/// Pause after (re)connect before a turn is sent (500 ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Conversation budget in estimated tokens
pub const DEFAULT_TOKEN_LIMIT: usize = 4000;

/// Environment variable names understood by [`SessionOptions::from_env`]
pub const ENV_MIN_INTERVAL_MS: &str = "CHATBOT_MIN_INTERVAL_MS";
/// See [`ENV_MIN_INTERVAL_MS`]
pub const ENV_INIT_TIMEOUT_MS: &str = "CHATBOT_INIT_TIMEOUT_MS";
/// See [`ENV_MIN_INTERVAL_MS`]
pub const ENV_SETTLE_DELAY_MS: &str = "CHATBOT_SETTLE_DELAY_MS";
/// See [`ENV_MIN_INTERVAL_MS`]. The value `0` disables truncation.
pub const ENV_TOKEN_LIMIT: &str = "CHATBOT_TOKEN_LIMIT";

// ============================================================================
// Session Options
// ============================================================================

/// Options for the session gate and lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Minimum time between the start of two turns
    #[serde(rename = "minIntervalMs", with = "duration_ms")]
    pub min_interval: Duration,
    /// Bound on session initialization
    #[serde(rename = "initTimeoutMs", with = "duration_ms")]
    pub init_timeout: Duration,
    /// Delay between obtaining a ready session and sending the turn
    #[serde(rename = "settleDelayMs", with = "duration_ms")]
    pub settle_delay: Duration,
    /// Conversation budget in estimated tokens, `None` to send history untouched
    ///
    /// A budget of `0` is read as `None`.
    #[serde(deserialize_with = "token_limit::deserialize")]
    pub token_limit: Option<usize>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            init_timeout: Duration::from_millis(DEFAULT_INIT_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            token_limit: Some(DEFAULT_TOKEN_LIMIT),
        }
    }
}

impl SessionOptions {
    /// Create a new builder for `SessionOptions`
    #[must_use]
    pub fn builder() -> SessionOptionsBuilder {
        SessionOptionsBuilder::default()
    }

    /// Load options from the process environment, falling back to defaults
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a variable is set but is not a valid integer
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load options through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a variable is set but is not a valid integer
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| -> Result<Option<u64>> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
                    ChatError::invalid_config(format!("{name}={raw:?} is not a valid integer: {e}"))
                }),
            }
        };

        let mut options = Self::default();
        if let Some(ms) = parse(ENV_MIN_INTERVAL_MS)? {
            options.min_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse(ENV_INIT_TIMEOUT_MS)? {
            options.init_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse(ENV_SETTLE_DELAY_MS)? {
            options.settle_delay = Duration::from_millis(ms);
        }
        if let Some(limit) = parse(ENV_TOKEN_LIMIT)? {
            options.token_limit = token_limit::normalize(usize::try_from(limit).ok());
        }

        options.validate()?;
        Ok(options)
    }

    /// Check that the options describe a usable configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the initialization timeout or the token
    /// budget is zero
    pub fn validate(&self) -> Result<()> {
        if self.init_timeout.is_zero() {
            return Err(ChatError::invalid_config(
                "initialization timeout must be greater than zero",
            ));
        }
        if self.token_limit == Some(0) {
            return Err(ChatError::invalid_config(
                "token limit must be greater than zero; use None for unlimited history",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder for SessionOptions
// ============================================================================

/// Builder for `SessionOptions`
#[derive(Debug, Default)]
pub struct SessionOptionsBuilder {
    options: SessionOptions,
}

impl SessionOptionsBuilder {
    /// Set the minimum interval between turn start times
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.options.min_interval = interval;
        self
    }

    /// Set the session initialization timeout
    #[must_use]
    pub const fn init_timeout(mut self, timeout: Duration) -> Self {
        self.options.init_timeout = timeout;
        self
    }

    /// Set the post-connect settle delay
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.options.settle_delay = delay;
        self
    }

    /// Set the conversation token budget; `0` means unlimited
    #[must_use]
    pub fn token_limit(mut self, limit: usize) -> Self {
        self.options.token_limit = token_limit::normalize(Some(limit));
        self
    }

    /// Send conversation history without truncation
    #[must_use]
    pub const fn unlimited_history(mut self) -> Self {
        self.options.token_limit = None;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SessionOptions {
        self.options
    }
}

mod token_limit {
    use serde::{Deserialize, Deserializer};

    pub fn normalize(limit: Option<usize>) -> Option<usize> {
        limit.filter(|l| *l > 0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        Option::<usize>::deserialize(deserializer).map(normalize)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
