//! Error handling for the Refract workspace

use thiserror::Error;

/// Core error type surfaced to hosts embedding the engine
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type CoreResult<T> = Result<T, CoreError>;
