//! Station store configuration.
//!
//! # Responsibility
//! - Describe where the station store lives and how lookups behave under
//!   contention (busy timeout, retry budget, query timeout).
//! - Load configuration once at process start from the environment.
//!
//! # Invariants
//! - A `StoreConfig` is immutable once handed to a repository.
//! - `RetryPolicy::max_attempts` is at least 1.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "STATION_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "STATION_DB_BUSY_TIMEOUT_MS";
pub const ENV_QUERY_TIMEOUT_MS: &str = "STATION_QUERY_TIMEOUT_MS";
pub const ENV_RETRY_ATTEMPTS: &str = "STATION_DB_RETRY_ATTEMPTS";
pub const ENV_RETRY_BACKOFF_MS: &str = "STATION_DB_RETRY_BACKOFF_MS";

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(100);
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(50);
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Configuration loading failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    EmptyDbPath,
    InvalidNumber { var: &'static str, value: String },
    ZeroRetryAttempts,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(var) => write!(f, "required environment variable `{var}` is not set"),
            Self::EmptyDbPath => write!(f, "station store path cannot be empty"),
            Self::InvalidNumber { var, value } => {
                write!(f, "`{var}` must be a non-negative integer, got `{value}`")
            }
            Self::ZeroRetryAttempts => write!(f, "retry attempts must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Bounded retry budget for transient store conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroRetryAttempts);
        }
        Ok(Self {
            max_attempts,
            initial_backoff,
        })
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Delay after the given failed attempt (1-based), doubling each time
    /// and capped at two seconds.
    pub fn backoff_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(MAX_RETRY_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Location and access policy of the station store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    db_path: PathBuf,
    busy_timeout: Duration,
    query_timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl StoreConfig {
    /// Creates a config with default busy timeout and retry policy and no
    /// query timeout.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            query_timeout: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Option<Duration>) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    /// - `STATION_DB_PATH` is unset or blank.
    /// - A numeric variable is not a non-negative integer.
    /// - `STATION_DB_RETRY_ATTEMPTS` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup(ENV_DB_PATH).ok_or(ConfigError::MissingVar(ENV_DB_PATH))?;
        if db_path.trim().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }

        let mut config = Self::new(db_path.trim());
        if let Some(ms) = read_millis(&lookup, ENV_BUSY_TIMEOUT_MS)? {
            config.busy_timeout = ms;
        }
        if let Some(ms) = read_millis(&lookup, ENV_QUERY_TIMEOUT_MS)? {
            config.query_timeout = Some(ms);
        }

        let attempts = match read_u64(&lookup, ENV_RETRY_ATTEMPTS)? {
            Some(value) => u32::try_from(value).map_err(|_| ConfigError::InvalidNumber {
                var: ENV_RETRY_ATTEMPTS,
                value: value.to_string(),
            })?,
            None => DEFAULT_RETRY_ATTEMPTS,
        };
        let backoff = read_millis(&lookup, ENV_RETRY_BACKOFF_MS)?.unwrap_or(DEFAULT_RETRY_BACKOFF);
        config.retry = RetryPolicy::new(attempts, backoff)?;

        Ok(config)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

fn read_u64<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn read_millis<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(read_u64(lookup, var)?.map(Duration::from_millis))
}
