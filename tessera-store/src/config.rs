//! Repository configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::fmt;
use thiserror::Error;

/// Default number of records per page for batched reads.
pub const DEFAULT_BATCH_SIZE: usize = 100;

// =============================================================================
// Configuration
// =============================================================================

/// Repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Page size for batched reads that do not specify one
    pub default_batch_size: usize,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable holds an unusable value
    #[error("Invalid {key}: {value}. {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// - `TESSERA_ENV`: test, development, production (default: development)
    /// - `TESSERA_DEFAULT_BATCH_SIZE`: page size for batched reads (default: 100)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("TESSERA_ENV") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        let default_batch_size = match lookup("TESSERA_DEFAULT_BATCH_SIZE") {
            Some(value) => match value.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "TESSERA_DEFAULT_BATCH_SIZE",
                        value,
                        reason: "Expected a positive integer",
                    })
                },
            },
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(Self {
            default_batch_size,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            default_batch_size: DEFAULT_BATCH_SIZE,
            environment: Environment::Test,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_batch_size: DEFAULT_BATCH_SIZE,
            environment: Environment::Development,
        }
    }
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "TESSERA_ENV",
                value: value.to_string(),
                reason: "Expected: test, development, production",
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.default_batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_reads_values() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("TESSERA_ENV", "prod"),
            ("TESSERA_DEFAULT_BATCH_SIZE", "25"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.default_batch_size, 25);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(StoreConfig::from_lookup(lookup(&[("TESSERA_ENV", "staging")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[("TESSERA_DEFAULT_BATCH_SIZE", "0")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[("TESSERA_DEFAULT_BATCH_SIZE", "x")])).is_err());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(StoreConfig::test().environment.to_string(), "test");
    }
}
