//! Logging and tracing configuration
//!
//! The CLI logs to stderr through `tracing`. Library components never touch
//! the subscriber; they log through the [`Logger`] collaborator so callers can
//! swap the sink.

use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli() {
    init_with_default("harness=info,warn");
}

/// Initialize tracing with verbose output for this crate
pub fn init_verbose() {
    init_with_default("harness=debug,warn");
}

fn init_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// Structured logging capability injected into the client
pub trait Logger: Send + Sync {
    fn info(&self, message: &str, data: Option<&Value>);
    fn warn(&self, message: &str, data: Option<&Value>);
    fn error(&self, message: &str, data: Option<&Value>);
}

/// Forwards to `tracing` with the data rendered as a field
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, data: Option<&Value>) {
        match data {
            Some(data) => tracing::info!(data = %data, "{}", message),
            None => tracing::info!("{}", message),
        }
    }

    fn warn(&self, message: &str, data: Option<&Value>) {
        match data {
            Some(data) => tracing::warn!(data = %data, "{}", message),
            None => tracing::warn!("{}", message),
        }
    }

    fn error(&self, message: &str, data: Option<&Value>) {
        match data {
            Some(data) => tracing::error!(data = %data, "{}", message),
            None => tracing::error!("{}", message),
        }
    }
}
