//! Resilient HTTP client
//!
//! Classifies failures as retryable or not and retries with exponential
//! backoff. The network sits behind the [`Transport`] trait.

mod failure;
mod resilient;
mod scripted;
mod transport;
mod types;

pub use failure::{Classification, Failure, HttpErrorKind};
pub use resilient::{backoff_delay, ResilientClient};
pub use scripted::ScriptedTransport;
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{
    ClientConfig, ClientConfigBuilder, QueryValue, RequestSpec, ResponseEnvelope,
    DEFAULT_BASE_URL,
};
