//! Error types for cronstore.

use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("query error: {0}")]
    Query(#[source] BoxError),

    #[error("failed to decode log entry {id}: {source}")]
    Decode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection is not open")]
    NotOpen,

    #[error("unknown driver: {0}")]
    UnknownDriver(String),

    #[error("driver already registered: {0}")]
    DuplicateDriver(String),

    #[error("configuration error: {0}")]
    Config(#[from] cronstore_config::ConfigError),
}

impl Error {
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Error::Connection(err.into())
    }

    pub fn query(err: impl Into<BoxError>) -> Self {
        Error::Query(err.into())
    }

    /// Whether the failure was a deadline rather than a store error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
