use std::{env, str::FromStr};

use thiserror::Error;

use crate::constants;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("API_KEY environment variable is not set.")]
    ApiKeyNotSet,
    #[error("DB_PORT must be a port number, got '{0}'")]
    InvalidPort(String),
    #[error("OUTPUT_SIZE must be 'compact' or 'full', got '{0}'")]
    InvalidOutputSize(String),
}

/// How much history the daily endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputSize {
    /// Latest ~100 trading days.
    #[default]
    Compact,
    /// Full available history.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl FromStr for OutputSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            _ => Err(ConfigError::InvalidOutputSize(s.into())),
        }
    }
}

/// Postgres connection parameters.
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
}

// Keeps the password out of log lines.
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Everything a run needs, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub symbol: String,
    pub output_size: OutputSize,
    pub db: DbConfig,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let api_key = get("API_KEY").ok_or(ConfigError::ApiKeyNotSet)?;

        let port = match get("DB_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            None => constants::DEFAULT_DB_PORT,
        };

        let output_size = match get("OUTPUT_SIZE") {
            Some(size) => size.parse()?,
            None => OutputSize::default(),
        };

        Ok(Config {
            api_key,
            api_base_url: get_or("API_BASE_URL", constants::DEFAULT_API_BASE_URL),
            symbol: get_or("SYMBOL", constants::DEFAULT_SYMBOL),
            output_size,
            db: DbConfig {
                host: get_or("DB_HOST", constants::DEFAULT_DB_HOST),
                user: get_or("DB_USER", constants::DEFAULT_DB_USER),
                password: get_or("DB_PASS", constants::DEFAULT_DB_PASS),
                name: get_or("DB_NAME", constants::DEFAULT_DB_NAME),
                port,
            },
        })
    }
}
