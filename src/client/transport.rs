//! Transport seam between the retry loop and the network
//!
//! The retry loop only sees a status code and a body. Anything that prevents
//! getting that far is reported as a [`Failure`].

use async_trait::async_trait;

use super::failure::Failure;

/// Raw answer from the service, any status
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single GET
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, Failure>;
}

/// Transport backed by a shared reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, Failure> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Failure::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, Failure> {
        let url = reqwest::Url::parse(url).map_err(|e| Failure::Config(format!("Invalid URL: {e}")))?;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(RawResponse { status, body })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> Failure {
    if e.is_timeout() {
        Failure::Network(format!("timed out: {e}"))
    } else if e.is_connect() || e.is_request() || e.is_body() {
        Failure::Network(e.to_string())
    } else if e.is_decode() {
        Failure::MalformedResponse(e.to_string())
    } else {
        Failure::Config(e.to_string())
    }
}
