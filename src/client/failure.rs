//! Failure causes and their retry classification

use std::fmt;
use thiserror::Error;

use crate::common::ErrorCategory;

/// Whether a failed attempt may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    NonRetryable,
}

/// Kind of non-2xx HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    BadRequest,
    NotFound,
    RateLimited,
    ServerError,
    ServiceUnavailable,
    Other,
}

impl HttpErrorKind {
    /// Bucket a status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => HttpErrorKind::BadRequest,
            404 => HttpErrorKind::NotFound,
            429 => HttpErrorKind::RateLimited,
            503 => HttpErrorKind::ServiceUnavailable,
            s if s >= 500 => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Other,
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpErrorKind::BadRequest => "BadRequest",
            HttpErrorKind::NotFound => "NotFound",
            HttpErrorKind::RateLimited => "RateLimited",
            HttpErrorKind::ServerError => "ServerError",
            HttpErrorKind::ServiceUnavailable => "ServiceUnavailable",
            HttpErrorKind::Other => "HttpError",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a failed attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The per-attempt timeout elapsed
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The service answered with a non-2xx status
    #[error("HTTP {status} {kind}: {message}")]
    HttpStatus {
        status: u16,
        kind: HttpErrorKind,
        message: String,
    },

    /// A 2xx answer whose body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request could not be built or sent for a local reason
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Failure {
    /// Build an HTTP status failure
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Failure::HttpStatus {
            status,
            kind: HttpErrorKind::from_status(status),
            message: message.into(),
        }
    }

    /// 4xx except 429 is final; 429 and 5xx are worth another try.
    pub fn classification(&self) -> Classification {
        match self {
            Failure::Network(_) | Failure::Timeout(_) => Classification::Retryable,
            Failure::HttpStatus { status, .. } => {
                if *status == 429 || *status >= 500 {
                    Classification::Retryable
                } else {
                    Classification::NonRetryable
                }
            }
            Failure::MalformedResponse(_) | Failure::Config(_) => Classification::NonRetryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.classification() == Classification::Retryable
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Failure::Network(_) | Failure::Timeout(_) => ErrorCategory::NetworkError,
            Failure::HttpStatus { kind, .. } => match kind {
                HttpErrorKind::BadRequest => ErrorCategory::BadRequest,
                HttpErrorKind::NotFound => ErrorCategory::NotFound,
                HttpErrorKind::RateLimited => ErrorCategory::RateLimited,
                HttpErrorKind::ServerError => ErrorCategory::ServerError,
                HttpErrorKind::ServiceUnavailable => ErrorCategory::ServiceUnavailable,
                HttpErrorKind::Other => ErrorCategory::HttpOther,
            },
            Failure::MalformedResponse(_) => ErrorCategory::MalformedResponse,
            Failure::Config(_) => ErrorCategory::ConfigError,
        }
    }
}
