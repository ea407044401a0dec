//! Error types for the harness
//!
//! Request failures keep their classified cause so callers can tell a
//! rejected parameter from a service that gave up after several retries.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::client::{Classification, Failure};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Request Errors ===
    #[error("{cause} (after {attempts} attempt(s))")]
    Request { attempts: u32, cause: Failure },

    // === Scenario Errors ===
    #[error("Invalid scenario file: {0}")]
    ScenarioParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error from anything printable
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a test assertion error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::TestAssertion(message.into())
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// The failure cause for request errors
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Error::Request { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// HTTP status code, if the service answered
    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(Failure::status)
    }

    /// Retry classification, if this error came out of the request path
    pub fn classification(&self) -> Option<Classification> {
        match self {
            Error::Config(_) => Some(Classification::NonRetryable),
            Error::Request { cause, .. } => Some(cause.classification()),
            _ => None,
        }
    }

    /// Map the error to a stable category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::ConfigParse(_) => ErrorCategory::ConfigError,
            Error::Request { cause, .. } => cause.category(),
            Error::ScenarioParse(_) => ErrorCategory::ScenarioError,
            Error::TestAssertion(_) => ErrorCategory::AssertionFailed,
            Error::Json(_) => ErrorCategory::MalformedResponse,
            Error::Io(_) | Error::FileRead { .. } | Error::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Human-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    NotFound,
    RateLimited,
    ServerError,
    ServiceUnavailable,
    HttpOther,
    NetworkError,
    ConfigError,
    MalformedResponse,
    ScenarioError,
    AssertionFailed,
    Internal,
}

impl ErrorCategory {
    /// Stable code for logs and JSON output
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "BAD_REQUEST",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::RateLimited => "RATE_LIMITED",
            ErrorCategory::ServerError => "SERVER_ERROR",
            ErrorCategory::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCategory::HttpOther => "HTTP_ERROR",
            ErrorCategory::NetworkError => "NETWORK_ERROR",
            ErrorCategory::ConfigError => "CONFIG_ERROR",
            ErrorCategory::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorCategory::ScenarioError => "SCENARIO_ERROR",
            ErrorCategory::AssertionFailed => "ASSERTION_FAILED",
            ErrorCategory::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::BadRequest => "BadRequest",
            ErrorCategory::NotFound => "NotFound",
            ErrorCategory::RateLimited => "RateLimited",
            ErrorCategory::ServerError => "ServerError",
            ErrorCategory::ServiceUnavailable => "ServiceUnavailable",
            ErrorCategory::HttpOther => "HttpError",
            ErrorCategory::NetworkError => "NetworkError",
            ErrorCategory::ConfigError => "ConfigError",
            ErrorCategory::MalformedResponse => "MalformedResponse",
            ErrorCategory::ScenarioError => "ScenarioError",
            ErrorCategory::AssertionFailed => "AssertionFailed",
            ErrorCategory::Internal => "Internal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_non_retryable() {
        let err = Error::config("results must be between 1 and 5000");
        assert_eq!(err.category(), ErrorCategory::ConfigError);
        assert_eq!(err.classification(), Some(Classification::NonRetryable));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_request_error_exposes_status() {
        let err = Error::Request {
            attempts: 3,
            cause: Failure::from_status(503, "unavailable"),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.category(), ErrorCategory::ServiceUnavailable);
        assert_eq!(err.category().code(), "SERVICE_UNAVAILABLE");
        assert!(err.to_string().contains("after 3 attempt(s)"));
    }
}
