//! Runtime configuration, loaded from environment variables.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::validation::DEFAULT_MAX_DESCRIPTION;

const PAGE_SIZE_VAR: &str = "EXPENSE_LEDGER_PAGE_SIZE";
const MAX_DESCRIPTION_VAR: &str = "EXPENSE_LEDGER_MAX_DESCRIPTION";
const CHANNEL_BUFFER_VAR: &str = "EXPENSE_LEDGER_CHANNEL_BUFFER";

const DEFAULT_CHANNEL_BUFFER: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rows per page for paged reports
    pub page_size: usize,
    /// Longest accepted expense description, in characters
    pub max_description: usize,
    /// Capacity of the channel between the async reader and processor
    pub channel_buffer: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: expected a positive integer")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_description: DEFAULT_MAX_DESCRIPTION,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment. Unset variables
    /// fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            page_size: positive(&lookup, PAGE_SIZE_VAR, defaults.page_size)?,
            max_description: positive(&lookup, MAX_DESCRIPTION_VAR, defaults.max_description)?,
            channel_buffer: positive(&lookup, CHANNEL_BUFFER_VAR, defaults.channel_buffer)?,
        })
    }
}

fn positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match usize::from_str(raw.trim()) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
