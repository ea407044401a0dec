//! Request, response and client configuration types

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::common::{Error, Result};

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Number(i64),
    /// Sent comma-joined
    List(Vec<String>),
}

impl QueryValue {
    /// Wire form of the value
    pub fn render(&self) -> String {
        match self {
            QueryValue::Text(s) => s.clone(),
            QueryValue::Number(n) => n.to_string(),
            QueryValue::List(items) => items.join(","),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        QueryValue::Number(n)
    }
}

impl From<u32> for QueryValue {
    fn from(n: u32) -> Self {
        QueryValue::Number(i64::from(n))
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(items: Vec<String>) -> Self {
        QueryValue::List(items)
    }
}

/// One logical request, immutable once built
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub endpoint: String,
    pub query: BTreeMap<String, QueryValue>,
    /// Bounds a single attempt, not the whole call
    pub timeout: Duration,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RequestSpec {
    /// Rendered query pairs in key order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect()
    }
}

/// A successful response
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: u16,
    /// Time spent on the successful attempt
    pub elapsed: Duration,
    pub attempts: u32,
    pub body: Value,
}

/// Immutable client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
    base_delay: Duration,
    user_agent: String,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Start a request against the base URL with this config's retry policy
    pub fn request(&self) -> RequestSpec {
        RequestSpec {
            endpoint: self.base_url.clone(),
            query: BTreeMap::new(),
            timeout: self.timeout,
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
        }
    }
}

/// Fluent builder for [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
    base_delay: Duration,
    user_agent: String,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            user_agent: concat!("randomuser-harness/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Public randomuser.me endpoint
pub const DEFAULT_BASE_URL: &str = "https://randomuser.me/api/";

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self.base_url.trim().to_string();
        if base_url.is_empty() {
            return Err(Error::config("base URL cannot be empty"));
        }
        Url::parse(&base_url)
            .map_err(|e| Error::config(format!("invalid base URL '{base_url}': {e}")))?;
        if self.max_attempts == 0 {
            return Err(Error::config("retry attempts must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }

        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            user_agent: self.user_agent,
        })
    }
}
