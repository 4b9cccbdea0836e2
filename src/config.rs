use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "TOYLEDGER_CONFIG";

/// Hard upper bound on the number of records a single history listing may return.
pub const HISTORY_HARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub retry: RetryConfig,
    pub history: HistoryConfig,
    pub log: LogConfig,
}

/// Bounds the optimistic mutation loop of [`crate::engine::LedgerEngine`].
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Compare-and-swap conflicts tolerated before giving up with `Unavailable`.
    pub max_attempts: u32,
    pub backoff_micros: u64,
    /// How long a balance write may stay without its ledger record before the account is declared
    /// inconsistent.
    pub stranded_after_millis: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 32,
            backoff_micros: 50,
            stranded_after_millis: 2_000,
        }
    }
}

impl RetryConfig {
    pub const fn stranded_after(&self) -> Duration {
        Duration::from_millis(self.stranded_after_millis)
    }

    /// Waits before retry number `attempt` (1-based), linearly longer and capped at 16 steps.
    /// A zero backoff only yields the thread.
    pub fn pause(&self, attempt: u32) {
        if self.backoff_micros == 0 {
            std::thread::yield_now();
            return;
        }
        std::thread::sleep(Duration::from_micros(self.backoff_micros) * attempt.min(16));
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: HISTORY_HARD_LIMIT,
        }
    }
}

impl HistoryConfig {
    /// Resolves the caller supplied `limit` into the number of records to return.
    pub fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config path={path:?}, source_error={source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config, source_error={0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config {reason}")]
    Invalid { reason: String },
}

impl LedgerConfig {
    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults if the variable is unset.
    ///
    /// # Errors
    ///
    /// See [`LedgerConfig::from_path`].
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read ([`ConfigError::Io`]).
    /// - The file is not valid YAML for [`LedgerConfig`] ([`ConfigError::Yaml`]).
    /// - The values are out of range ([`ConfigError::Invalid`]).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// # Errors
    ///
    /// See [`LedgerConfig::from_path`].
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                reason: "retry.max_attempts must be at least 1".into(),
            });
        }
        if self.history.max_limit > HISTORY_HARD_LIMIT {
            return Err(ConfigError::Invalid {
                reason: format!("history.max_limit must not exceed {HISTORY_HARD_LIMIT}"),
            });
        }
        Ok(())
    }
}
