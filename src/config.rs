//! Queue configuration.
//!
//! Values come from, lowest precedence first: built-in defaults, a TOML
//! document ([`QueueConfig::from_toml_str`]), and `ASPEN_QUEUE_*`
//! environment variables ([`QueueConfig::load`] /
//! [`QueueConfig::apply_env_overrides`]).

use std::time::Duration;

use aspen_txn::RetryPolicy;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;

use crate::constants::DEFAULT_INITIAL_BACKOFF_MS;
use crate::constants::DEFAULT_MAX_BACKOFF_MS;
use crate::constants::DEFAULT_SWEEP_BATCH_SIZE;
use crate::constants::MAX_SWEEP_BATCH_SIZE;
use crate::error::ConfigError;
use crate::error::ParseSnafu;

/// How `Queue::pop` behaves when several clients pop at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentionMode {
    /// Pop in a single retried transaction. Fastest with one popper.
    Simple,
    /// Register as a waiter on conflict and let sweeps hand out items.
    #[default]
    High,
}

impl std::str::FromStr for ContentionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(ContentionMode::Simple),
            "high" => Ok(ContentionMode::High),
            other => Err(format!("unknown contention mode '{other}', expected 'simple' or 'high'")),
        }
    }
}

/// Tunables for a [`Queue`](crate::Queue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub contention_mode: ContentionMode,
    /// Waiters and items paired per fulfilment sweep.
    pub sweep_batch_size: usize,
    /// First poll delay for a registered waiter, also the first retry delay.
    pub initial_backoff_ms: u64,
    /// Poll and retry delay ceiling.
    pub max_backoff_ms: u64,
    /// Attempts per retried transaction. `None` retries conflicts until they succeed.
    pub max_transaction_retries: Option<u32>,
    /// Give up on an unfulfilled high-contention pop after this long. `None` waits indefinitely.
    pub pop_wait_timeout_ms: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            contention_mode: ContentionMode::default(),
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_transaction_retries: None,
            pop_wait_timeout_ms: None,
        }
    }
}

impl QueueConfig {
    /// Defaults with the given contention mode.
    pub fn with_mode(contention_mode: ContentionMode) -> Self {
        Self {
            contention_mode,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).context(ParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `ASPEN_QUEUE_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override fields from `ASPEN_QUEUE_*` environment variables, then validate.
    ///
    /// Unset variables leave the field alone; unparseable ones are an error.
    /// For the optional limits, `0` means no limit.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        macro_rules! apply_override {
            ($field:ident, $env:literal) => {
                if let Some(val) = Self::env_parse($env)? {
                    self.$field = val;
                }
            };
        }

        apply_override!(contention_mode, "ASPEN_QUEUE_CONTENTION_MODE");
        apply_override!(sweep_batch_size, "ASPEN_QUEUE_SWEEP_BATCH_SIZE");
        apply_override!(initial_backoff_ms, "ASPEN_QUEUE_INITIAL_BACKOFF_MS");
        apply_override!(max_backoff_ms, "ASPEN_QUEUE_MAX_BACKOFF_MS");
        if let Some(retries) = Self::env_parse::<u32>("ASPEN_QUEUE_MAX_TRANSACTION_RETRIES")? {
            self.max_transaction_retries = (retries > 0).then_some(retries);
        }
        if let Some(timeout_ms) = Self::env_parse::<u64>("ASPEN_QUEUE_POP_WAIT_TIMEOUT_MS")? {
            self.pop_wait_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_batch_size == 0 || self.sweep_batch_size > MAX_SWEEP_BATCH_SIZE {
            return Err(invalid(
                "sweep_batch_size",
                self.sweep_batch_size,
                format!("must be between 1 and {MAX_SWEEP_BATCH_SIZE}"),
            ));
        }
        if self.initial_backoff_ms == 0 {
            return Err(invalid("initial_backoff_ms", self.initial_backoff_ms, "must be positive"));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(invalid("max_backoff_ms", self.max_backoff_ms, "must not be below initial_backoff_ms"));
        }
        if self.max_transaction_retries == Some(0) {
            return Err(invalid("max_transaction_retries", 0, "must be positive when set"));
        }
        if self.pop_wait_timeout_ms == Some(0) {
            return Err(invalid("pop_wait_timeout_ms", 0, "must be positive when set"));
        }
        Ok(())
    }

    /// Retry policy for the queue's own transactions.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_transaction_retries,
            initial_backoff_ms: self.initial_backoff_ms,
            max_backoff_ms: self.max_backoff_ms,
        }
    }

    pub fn pop_wait_timeout(&self) -> Option<Duration> {
        self.pop_wait_timeout_ms.map(Duration::from_millis)
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(None),
        }
    }
}

fn invalid(key: &str, value: impl ToString, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}
