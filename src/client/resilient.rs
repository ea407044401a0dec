//! Retrying request client
//!
//! One call to [`ResilientClient::request`] is one logical request. Attempts
//! are retried only for retryable failures, with the delay doubling from the
//! base delay on each retry. The attempt counter and timers are local to the
//! call, so concurrent calls never share retry state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::common::{Error, Logger, Result, TracingLogger};

use super::failure::{Classification, Failure};
use super::transport::{HttpTransport, Transport};
use super::types::{ClientConfig, QueryValue, RequestSpec, ResponseEnvelope};

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent)
}

/// HTTP client with failure classification and exponential backoff
#[derive(Clone)]
pub struct ResilientClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
}

impl ResilientClient {
    /// Create a client that talks to the network through reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.user_agent()).map_err(|cause| Error::Request {
            attempts: 0,
            cause,
        })?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Replace the logger collaborator
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET the base URL with the given query and the configured retry policy
    pub async fn get<I, K>(&self, query: I) -> Result<ResponseEnvelope>
    where
        I: IntoIterator<Item = (K, QueryValue)>,
        K: Into<String>,
    {
        let mut spec = self.config.request();
        spec.query.extend(query.into_iter().map(|(k, v)| (k.into(), v)));
        self.request(&spec).await
    }

    /// Issue one logical request, retrying retryable failures
    pub async fn request(&self, spec: &RequestSpec) -> Result<ResponseEnvelope> {
        let max_attempts = spec.max_attempts.max(1);
        let query = spec.query_pairs();
        let mut attempt = 1;

        loop {
            self.logger.info(
                "API request",
                Some(&json!({
                    "endpoint": spec.endpoint,
                    "query": query_json(&query),
                    "attempt": attempt,
                })),
            );

            let started = Instant::now();
            match self.attempt(spec, &query, attempt).await {
                Ok(envelope) => {
                    self.logger.info(
                        "API response",
                        Some(&json!({
                            "status": envelope.status,
                            "duration_ms": envelope.elapsed.as_millis() as u64,
                            "attempt": attempt,
                        })),
                    );
                    return Ok(envelope);
                }
                Err(cause) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    let retryable = cause.classification() == Classification::Retryable;

                    if !retryable || attempt >= max_attempts {
                        self.logger.error(
                            "API request failed",
                            Some(&json!({
                                "error": cause.to_string(),
                                "category": cause.category().code(),
                                "status": cause.status(),
                                "attempts": attempt,
                                "retryable": retryable,
                                "duration_ms": elapsed_ms,
                            })),
                        );
                        return Err(Error::Request {
                            attempts: attempt,
                            cause,
                        });
                    }

                    let delay = backoff_delay(spec.base_delay, attempt);
                    self.logger.warn(
                        "Retrying API request",
                        Some(&json!({
                            "error": cause.to_string(),
                            "attempt": attempt,
                            "max_attempts": max_attempts,
                            "delay_ms": delay.as_millis() as u64,
                        })),
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// A single attempt bounded by the per-attempt timeout
    async fn attempt(
        &self,
        spec: &RequestSpec,
        query: &[(String, String)],
        attempt: u32,
    ) -> std::result::Result<ResponseEnvelope, Failure> {
        let started = Instant::now();
        let raw = tokio::time::timeout(spec.timeout, self.transport.get(&spec.endpoint, query))
            .await
            .map_err(|_| Failure::Timeout(spec.timeout.as_millis() as u64))??;
        let elapsed = started.elapsed();

        if !(200..300).contains(&raw.status) {
            return Err(Failure::from_status(raw.status, summarize_body(&raw.body)));
        }

        let body: Value = serde_json::from_str(&raw.body)
            .map_err(|e| Failure::MalformedResponse(e.to_string()))?;

        Ok(ResponseEnvelope {
            status: raw.status,
            elapsed,
            attempts: attempt,
            body,
        })
    }
}

fn query_json(query: &[(String, String)]) -> Value {
    Value::Object(
        query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Error bodies have no contract; keep a short prefix for the message
fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawResponse, ScriptedTransport};
    use crate::common::ErrorCategory;

    fn config(attempts: u32, base_ms: u64) -> ClientConfig {
        ClientConfig::builder()
            .base_url("http://service.test/api/")
            .max_attempts(attempts)
            .base_delay(Duration::from_millis(base_ms))
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    fn ok_body() -> std::result::Result<RawResponse, Failure> {
        Ok(RawResponse {
            status: 200,
            body: r#"{"results":[],"info":{"seed":"abc","results":0,"page":1,"version":"1.4"}}"#
                .to_string(),
        })
    }

    fn status(code: u16) -> std::result::Result<RawResponse, Failure> {
        Ok(RawResponse {
            status: code,
            body: String::new(),
        })
    }

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(1000);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 200), backoff_delay(base, 32));
        assert_eq!(backoff_delay(Duration::ZERO, 5), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_unavailable_then_succeeds() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(503), status(503), ok_body()]));
        let client = ResilientClient::with_transport(config(3, 1000), transport.clone());

        let envelope = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap();
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.attempts, 3);

        let calls = transport.call_times();
        assert_eq!(calls.len(), 3);
        assert!(calls[1] - calls[0] >= Duration::from_millis(1000));
        assert!(calls[2] - calls[1] >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_fails_without_waiting() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(404), ok_body()]));
        let client = ResilientClient::with_transport(config(3, 1000), transport.clone());

        let started = tokio::time::Instant::now();
        let err = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap_err();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(transport.calls(), 1);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(matches!(err, Error::Request { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            status(500),
            status(502),
            status(500),
            ok_body(),
        ]));
        let client = ResilientClient::with_transport(config(3, 10), transport.clone());

        let err = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap_err();
        assert_eq!(transport.calls(), 3);
        assert!(matches!(err, Error::Request { attempts: 3, .. }));
        assert_eq!(err.category(), ErrorCategory::ServerError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_errors_are_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(Failure::Network("connection refused".into())),
            status(429),
            ok_body(),
        ]));
        let client = ResilientClient::with_transport(config(3, 10), transport.clone());

        let envelope = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap();
        assert_eq!(envelope.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_waits() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(503)]));
        let client = ResilientClient::with_transport(config(1, 1000), transport.clone());

        let started = tokio::time::Instant::now();
        let err = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap_err();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(err, Error::Request { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_times_out_and_retries() {
        let transport = Arc::new(
            ScriptedTransport::new(vec![ok_body(), ok_body()])
                .with_latency(vec![Duration::from_secs(60), Duration::ZERO]),
        );
        let client = ResilientClient::with_transport(config(2, 10), transport.clone());

        let envelope = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap();
        assert_eq!(envelope.attempts, 2);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(RawResponse {
                status: 200,
                body: "<html>".to_string(),
            }),
            ok_body(),
        ]));
        let client = ResilientClient::with_transport(config(3, 10), transport.clone());

        let err = client.get(Vec::<(String, QueryValue)>::new()).await.unwrap_err();
        assert_eq!(transport.calls(), 1);
        assert_eq!(err.category(), ErrorCategory::MalformedResponse);
    }

    #[tokio::test]
    async fn test_query_is_rendered() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_body()]));
        let client = ResilientClient::with_transport(config(1, 10), transport.clone());

        client
            .get([
                ("results", QueryValue::from(5u32)),
                ("inc", QueryValue::from(vec!["name".to_string(), "email".to_string()])),
            ])
            .await
            .unwrap();

        let queries = transport.queries();
        assert_eq!(
            queries[0],
            vec![
                ("inc".to_string(), "name,email".to_string()),
                ("results".to_string(), "5".to_string()),
            ]
        );
    }

    /// Records `<level> <message>` for every log call
    #[derive(Default)]
    struct RecordingLogger {
        lines: parking_lot::Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }

        fn push(&self, level: &str, message: &str) {
            self.lines.lock().push(format!("{level} {message}"));
        }
    }

    impl Logger for RecordingLogger {
        fn info(&self, message: &str, _data: Option<&Value>) {
            self.push("info", message);
        }

        fn warn(&self, message: &str, _data: Option<&Value>) {
            self.push("warn", message);
        }

        fn error(&self, message: &str, _data: Option<&Value>) {
            self.push("error", message);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_logs_each_attempt_through_injected_logger() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(503), ok_body()]));
        let logger = Arc::new(RecordingLogger::default());
        let client = ResilientClient::with_transport(config(3, 100), transport)
            .with_logger(logger.clone());

        client.get(Vec::<(String, QueryValue)>::new()).await.unwrap();
        assert_eq!(
            logger.lines(),
            vec![
                "info API request",
                "warn Retrying API request",
                "info API request",
                "info API response",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logs_terminal_failure_as_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![status(404)]));
        let logger = Arc::new(RecordingLogger::default());
        let client = ResilientClient::with_transport(config(3, 100), transport)
            .with_logger(logger.clone());

        client.get(Vec::<(String, QueryValue)>::new()).await.unwrap_err();
        assert_eq!(
            logger.lines(),
            vec!["info API request", "error API request failed"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_keep_separate_retry_state() {
        let transport = Arc::new(ScriptedTransport::responding(|query| {
            let bad = query.iter().any(|(k, v)| k == "id" && v == "bad");
            if bad {
                status(503)
            } else {
                ok_body()
            }
        }));
        let client = ResilientClient::with_transport(config(3, 1000), transport.clone());

        let started = tokio::time::Instant::now();
        let (bad, good) = tokio::join!(
            client.get([("id", QueryValue::from("bad"))]),
            client.get([("id", QueryValue::from("good"))]),
        );

        let good = good.unwrap();
        assert_eq!(good.attempts, 1);
        assert!(matches!(bad.unwrap_err(), Error::Request { attempts: 3, .. }));
        assert_eq!(transport.calls(), 4);
        assert_eq!(
            transport
                .queries()
                .iter()
                .filter(|q| q.contains(&("id".to_string(), "good".to_string())))
                .count(),
            1
        );
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[test]
    fn test_summarize_body_truncates() {
        let long = "x".repeat(500);
        assert_eq!(summarize_body(&long).len(), 203);
        assert_eq!(summarize_body("  "), "empty response body");
    }
}
