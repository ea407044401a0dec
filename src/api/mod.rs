//! Person API wrappers
//!
//! Thin, parameter-checking wrappers around one retrying request. A rejected
//! parameter never reaches the network.

mod query;
mod types;

pub use query::{
    normalize_nationality, validate_count, validate_fields, validate_page, validate_seed, Gender,
    UserQuery, FIELDS, MAX_RESULTS, NATIONALITIES,
};
pub use types::{Info, UserResponse};

use crate::client::{ResilientClient, ResponseEnvelope};
use crate::common::{Error, Result};

/// Client for the person endpoint
#[derive(Clone)]
pub struct UserApi {
    client: ResilientClient,
}

impl UserApi {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// Run a query and decode the payload
    pub async fn query(&self, query: &UserQuery) -> Result<UserResponse> {
        let envelope = self.query_raw(query).await?;
        decode(envelope)
    }

    /// Run a query and keep the raw envelope
    pub async fn query_raw(&self, query: &UserQuery) -> Result<ResponseEnvelope> {
        let spec = query.to_request(self.client.config())?;
        self.client.request(&spec).await
    }

    /// Fetch one person
    pub async fn fetch_user(&self) -> Result<UserResponse> {
        self.fetch_users(1).await
    }

    /// Fetch `count` people, 1..=5000
    pub async fn fetch_users(&self, count: u32) -> Result<UserResponse> {
        self.query(&UserQuery::new().results(count)).await
    }

    /// Fetch people of one gender
    pub async fn fetch_by_gender(&self, gender: &str, count: u32) -> Result<UserResponse> {
        self.query(&UserQuery::new().results(count).gender(gender)).await
    }

    /// Fetch people of one nationality (any letter case)
    pub async fn fetch_by_nationality(&self, nat: &str, count: u32) -> Result<UserResponse> {
        self.query(&UserQuery::new().results(count).nationality(nat)).await
    }

    /// Fetch people drawn from several nationalities
    pub async fn fetch_by_nationalities<S: AsRef<str>>(
        &self,
        nats: &[S],
        count: u32,
    ) -> Result<UserResponse> {
        if nats.is_empty() {
            return Err(Error::config("Nationality list cannot be empty"));
        }
        let query = nats
            .iter()
            .fold(UserQuery::new().results(count), |q, n| q.nationality(n.as_ref()));
        self.query(&query).await
    }

    /// Fetch records restricted to the given fields
    pub async fn fetch_with_fields<S: AsRef<str>>(
        &self,
        include: &[S],
        count: u32,
    ) -> Result<UserResponse> {
        validate_fields(include)?;
        self.query(&UserQuery::new().results(count).include(include)).await
    }

    /// Fetch records without the given fields
    pub async fn fetch_excluding_fields<S: AsRef<str>>(
        &self,
        exclude: &[S],
        count: u32,
    ) -> Result<UserResponse> {
        validate_fields(exclude)?;
        self.query(&UserQuery::new().results(count).exclude(exclude)).await
    }

    /// Fetch a reproducible set of people
    pub async fn fetch_with_seed(&self, seed: &str, count: u32) -> Result<UserResponse> {
        self.query(&UserQuery::new().results(count).seed(seed)).await
    }

    /// Fetch one page of a seeded result set
    pub async fn fetch_page(&self, page: u32, count: u32, seed: &str) -> Result<UserResponse> {
        self.query(&UserQuery::new().results(count).seed(seed).page(page)).await
    }
}

fn decode(envelope: ResponseEnvelope) -> Result<UserResponse> {
    serde_json::from_value(envelope.body).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, Failure, RawResponse, ScriptedTransport};
    use crate::common::ErrorCategory;
    use std::sync::Arc;
    use std::time::Duration;

    const BODY: &str = r#"{"results":[{"gender":"female","nat":"GB"}],"info":{"seed":"abc","results":1,"page":1,"version":"1.4"}}"#;

    fn api() -> (UserApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::responding(|_| {
            Ok(RawResponse {
                status: 200,
                body: BODY.to_string(),
            })
        }));
        let config = ClientConfig::builder()
            .base_url("http://service.test/api/")
            .base_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let client = ResilientClient::with_transport(config, transport.clone());
        (UserApi::new(client), transport)
    }

    #[tokio::test]
    async fn test_out_of_range_counts_never_reach_network() {
        let (api, transport) = api();
        for count in [0, 5001, 10_000, u32::MAX] {
            let err = api.fetch_users(count).await.unwrap_err();
            assert_eq!(err.category(), ErrorCategory::ConfigError, "count {count}");
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_nationality_never_reaches_network() {
        let (api, transport) = api();
        for nat in ["XX", "jp", "", "GBR"] {
            assert!(matches!(
                api.fetch_by_nationality(nat, 1).await,
                Err(Error::Config(_))
            ));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_nationality_sent_upper_case() {
        let (api, transport) = api();
        let response = api.fetch_by_nationality("gb", 1).await.unwrap();
        assert_eq!(response.attribute("nat"), vec![Some("GB")]);

        let queries = transport.queries();
        assert!(queries[0].contains(&("nat".to_string(), "GB".to_string())));
    }

    #[tokio::test]
    async fn test_invalid_fields_and_gender_rejected() {
        let (api, transport) = api();
        assert!(api.fetch_with_fields(&["name", "bogus"], 1).await.is_err());
        assert!(api.fetch_excluding_fields::<&str>(&[], 1).await.is_err());
        assert!(api.fetch_by_gender("unknown", 1).await.is_err());
        assert!(api.fetch_by_nationalities::<&str>(&[], 1).await.is_err());
        assert!(api.fetch_page(0, 1, "abc").await.is_err());
        assert!(api.fetch_with_seed("", 1).await.is_err());
        assert_eq!(transport.calls(), 0);
    }

    fn sent<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_wrappers_send_expected_query() {
        let (api, transport) = api();
        api.fetch_by_nationalities(&["us", "gb"], 2).await.unwrap();
        api.fetch_page(2, 5, "abc").await.unwrap();
        api.fetch_excluding_fields(&["login"], 1).await.unwrap();
        api.fetch_with_seed("xyz9", 3).await.unwrap();

        let queries = transport.queries();
        assert_eq!(queries.len(), 4);

        assert_eq!(sent(&queries[0], "nat"), Some("US,GB"));
        assert_eq!(sent(&queries[0], "results"), Some("2"));

        assert_eq!(sent(&queries[1], "page"), Some("2"));
        assert_eq!(sent(&queries[1], "seed"), Some("abc"));
        assert_eq!(sent(&queries[1], "results"), Some("5"));

        assert_eq!(sent(&queries[2], "exc"), Some("login"));
        assert_eq!(sent(&queries[2], "inc"), None);

        assert_eq!(sent(&queries[3], "seed"), Some("xyz9"));
        assert_eq!(sent(&queries[3], "results"), Some("3"));

        for query in &queries {
            assert_eq!(sent(query, "format"), Some("json"));
        }
    }

    #[tokio::test]
    async fn test_decodes_payload() {
        let (api, _) = api();
        let response = api.fetch_user().await.unwrap();
        assert_eq!(response.info.seed, "abc");
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_failure_propagates() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(RawResponse {
            status: 400,
            body: "bad".to_string(),
        })]));
        let config = ClientConfig::builder()
            .base_url("http://service.test/api/")
            .build()
            .unwrap();
        let api = UserApi::new(ResilientClient::with_transport(config, transport));

        let err = api.fetch_user().await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert!(matches!(
            err.failure(),
            Some(Failure::HttpStatus { status: 400, .. })
        ));
    }
}
