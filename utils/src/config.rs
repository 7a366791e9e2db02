//! Process-wide settings, read once when a function starts.

use std::env;

use crate::error::ApiError;

/// Name of the environment variable holding the table name.
pub const DATA_TABLE_VAR: &str = "DATA_TABLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The single table every entity is stored in.
    pub table_name: String,
}

impl Config {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self { table_name: table_name.into() }
    }

    /// Builds the configuration from the environment.
    ///
    /// With the `local` feature a `.env` file in the working directory is
    /// loaded first.
    pub fn from_env() -> Result<Self, ApiError> {
        #[cfg(feature = "local")]
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ApiError> {
        let table_name = match lookup(DATA_TABLE_VAR) {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Err(ApiError::Config(format!("{} not set", DATA_TABLE_VAR)))
        };
        Ok(Self { table_name })
    }
}
