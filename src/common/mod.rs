//! Common utilities shared by the client, the test layer and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{Config, Environment};
pub use error::{Error, ErrorCategory, Result};
pub use logging::{Logger, TracingLogger};
