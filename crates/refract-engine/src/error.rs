//! Extraction error types

use refract_foundation::error::CoreError;
use thiserror::Error;

/// Errors produced by the extraction pipeline
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExtractError {
    /// The selection is not a usable JSX fragment, even after the automatic
    /// `<div>` wrap attempt.
    #[error("Selection is not a valid JSX expression")]
    InvalidJsx,

    /// No enclosing class, function declaration or arrow-function declarator
    /// was found above the selection.
    #[error("No enclosing component found for the selection")]
    InvalidComponent,

    /// The source text failed to parse under the configured dialect.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Catch-all for unexpected failures during the pipeline, carrying the
    /// original cause when there is one.
    #[error("Extraction failed: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ExtractError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
            source: None,
        }
    }

    pub fn extraction_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Extraction {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<CoreError> for ExtractError {
    fn from(err: CoreError) -> Self {
        Self::Extraction {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<ExtractError> for CoreError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidJsx | ExtractError::InvalidComponent => {
                CoreError::invalid_data(err.to_string())
            }
            _ => CoreError::internal(err.to_string()),
        }
    }
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;
