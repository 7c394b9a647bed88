//! Configuration management for the CLI.

use crate::commands::merge::PolicyArg;
use clap::ValueEnum;
use dealer_engine::{ConflictPolicy, SPLIT_FILE_SUFFIX};
use std::env;

/// Settings loaded from environment variables (and `.env`).
///
/// Command-line flags take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Suffix of split dealer files, also the pattern combine looks for
    pub split_suffix: String,
    /// Policy used by `merge` when `--policy` is not given
    pub default_policy: ConflictPolicy,
    /// Indent written JSON
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            split_suffix: SPLIT_FILE_SUFFIX.to_string(),
            default_policy: ConflictPolicy::Overwrite,
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let split_suffix = match lookup("DEALER_SPLIT_SUFFIX") {
            Some(suffix) if suffix.is_empty() || suffix.contains(['/', '\\']) => {
                return Err(ConfigError::InvalidSuffix(suffix))
            }
            Some(suffix) => suffix,
            None => defaults.split_suffix,
        };

        let default_policy = match lookup("DEALER_DEFAULT_POLICY") {
            Some(value) => PolicyArg::from_str(&value, true)
                .map(ConflictPolicy::from)
                .map_err(|_| ConfigError::InvalidPolicy(value))?,
            None => defaults.default_policy,
        };

        let pretty = match lookup("DEALER_PRETTY").as_deref() {
            None => defaults.pretty,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => return Err(ConfigError::InvalidPretty(other.to_string())),
        };

        Ok(Self {
            split_suffix,
            default_policy,
            pretty,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DEALER_SPLIT_SUFFIX value: {0:?}")]
    InvalidSuffix(String),

    #[error("Invalid DEALER_DEFAULT_POLICY value: {0}")]
    InvalidPolicy(String),

    #[error("Invalid DEALER_PRETTY value: {0}")]
    InvalidPretty(String),
}
