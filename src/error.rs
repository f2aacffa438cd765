use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryBuilderError {
    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Table shape mismatch: expected {expected} values per row, found {found}")]
    TableShape { expected: usize, found: usize },

    #[error("Type conversion error: {0}")]
    DecodeError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
}

impl QueryBuilderError {
    /// The error raised by every execution method when no connection string is set.
    #[must_use]
    pub fn connection_required() -> Self {
        QueryBuilderError::ConfigError("the SQL connection string is not defined".to_string())
    }

    /// True for errors raised before any connection was attempted.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, QueryBuilderError::ConfigError(_))
    }
}
