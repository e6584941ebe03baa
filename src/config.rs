use crate::errors::DbError;
use serde::Deserialize;
use std::path::Path;

/// Pagination defaults consulted by `QueryBuilder::paginate`.
///
/// Values can come from a TOML file, the `DOCQUERY_DEFAULT_LIMIT` environment
/// variable, or the built-in defaults (page 1, limit 100), in that order of
/// precedence.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page: usize,
    pub default_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let limit = std::env::var("DOCQUERY_DEFAULT_LIMIT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(100);
        Self { default_page: 1, default_limit: limit }
    }
}

impl QueryConfig {
    /// # Errors
    /// Returns an error if the string is not valid TOML for this config.
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DbError::Io(format!("Failed to read config file: {e}")))?;
        Self::from_toml_str(&raw)
    }
}
