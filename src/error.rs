//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror,
//! plus the closed taxonomy the vision adapter reports upstream failures in.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single inference call, classified at the transport boundary.
///
/// The orchestrator only rotates credentials on [`InferenceError::RateLimited`];
/// every other variant ends the scan immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("rate limited (status {status}): {message}")]
    RateLimited { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("content rejected: {0}")]
    ContentRejected(String),

    #[error("{0}")]
    Other(String),
}

impl InferenceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InferenceError::RateLimited { .. })
    }
}
