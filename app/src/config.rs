//! Configuration for the demo binary.
//!
//! Loads settings from environment variables with sensible defaults.

use crate::source::DEFAULT_SEED_URL;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Seed endpoint override
pub const SEED_URL_VAR: &str = "TODO_SEED_URL";
/// Serve the bundled seed instead of calling the network
pub const OFFLINE_VAR: &str = "TODO_OFFLINE";
/// Port for the Prometheus exporter
pub const METRICS_PORT_VAR: &str = "TODO_METRICS_PORT";

/// An environment variable held a value that could not be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Expected a boolean
    #[error("{var} must be a boolean (true/false/1/0/yes/no), got `{value}`")]
    InvalidBool {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
    },

    /// Expected a port number
    #[error("{var} must be a port number, got `{value}`")]
    InvalidPort {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
    },

    /// The URL was empty
    #[error("{var} must not be empty")]
    EmptyUrl {
        /// Variable name
        var: &'static str,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the seed fetch reads from
    pub seed_url: String,
    /// Use the bundled seed payload
    pub offline: bool,
    /// Expose Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            offline: false,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seed_url = match lookup(SEED_URL_VAR) {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::EmptyUrl { var: SEED_URL_VAR });
            },
            Some(url) => url.trim().to_string(),
            None => DEFAULT_SEED_URL.to_string(),
        };

        let offline = lookup(OFFLINE_VAR)
            .map(|value| parse_bool(OFFLINE_VAR, &value))
            .transpose()?
            .unwrap_or(false);

        let metrics_port = lookup(METRICS_PORT_VAR)
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort {
                        var: METRICS_PORT_VAR,
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            seed_url,
            offline,
            metrics_port,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
