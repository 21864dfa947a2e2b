//! @ai:module:intent Define error types for the Countdown grader
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all grading operations
///            Every variant is absorbed by `grade` and mapped to score 0
#[derive(Error, Debug)]
pub enum Error {
    #[error("no JSON object found in sample")]
    MalformedPayload,

    #[error("payload field `{0}` is missing or empty")]
    MissingField(&'static str),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("numbers used {found:?} do not match puzzle numbers {expected:?}")]
    NumberUsage { expected: Vec<i128>, found: Vec<i128> },

    #[error("cannot coerce {0} to a number")]
    Coercion(String),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent Build an InvalidExpression error from any displayable reason
    /// @ai:effects pure
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidExpression(reason.into())
    }

    /// @ai:intent Short machine-readable name of the error kind
    /// @ai:effects pure
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedPayload => "malformed_payload",
            Error::MissingField(_) => "missing_field",
            Error::InvalidExpression(_) => "invalid_expression",
            Error::NumberUsage { .. } => "number_usage",
            Error::Coercion(_) => "coercion",
            Error::FileRead { .. } => "file_read",
            Error::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
