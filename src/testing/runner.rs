//! Scenario suite runner
//!
//! Loads YAML suites and compiles each scenario into a [`TestCommand`] that
//! talks to the service through [`UserApi`] and checks the response.

use std::path::Path;
use std::sync::Arc;

use crate::api::{UserApi, UserQuery, UserResponse};
use crate::common::{Error, Result};
use crate::validation::{factory, EachItem, UserStructure, ValidationStrategy};

use super::command::{MacroCommand, ScenarioCommand, TestCommand};
use super::config::{Expectation, Outcome, ScenarioSpec, SuiteFile, ValidateKind};
use super::invoker::CommandInvoker;
use super::result::TestSuite;

const BUILTIN_SUITE: &str = include_str!("../../suites/default.yaml");

/// Parse a suite from YAML text
pub fn parse_suite(content: &str) -> Result<SuiteFile> {
    serde_yaml::from_str(content)
        .map_err(|e| Error::ScenarioParse(format!("Failed to parse scenario suite: {}", e)))
}

/// Load a suite from a YAML file
pub fn load_suite(path: &Path) -> Result<SuiteFile> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    parse_suite(&content)
}

/// The suite shipped with the binary
pub fn builtin_suite() -> Result<SuiteFile> {
    parse_suite(BUILTIN_SUITE)
}

/// Compile every scenario of a suite, in order
pub fn compile_suite(api: &UserApi, suite: &SuiteFile) -> Vec<Arc<dyn TestCommand>> {
    suite.scenarios.iter().map(|s| compile(api, s)).collect()
}

/// Compile one scenario; a scenario with `steps` becomes a [`MacroCommand`]
pub fn compile(api: &UserApi, spec: &ScenarioSpec) -> Arc<dyn TestCommand> {
    let description = spec.description.clone().unwrap_or_default();

    if !spec.steps.is_empty() && spec.skip.is_none() {
        let steps = spec.steps.iter().map(|s| compile(api, s)).collect();
        return Arc::new(MacroCommand::new(&spec.name, steps).describe(description));
    }

    let api = api.clone();
    let name = spec.name.clone();
    let query = spec.request.clone();
    let expect = spec.expect.clone();
    let command = ScenarioCommand::new(&spec.name, move || {
        let api = api.clone();
        let name = name.clone();
        let query = query.clone();
        let expect = expect.clone();
        async move { check_scenario(&api, &name, &query, &expect).await }
    })
    .describe(description);

    match &spec.skip {
        Some(reason) => Arc::new(command.skip(reason)),
        None => Arc::new(command),
    }
}

/// Compile and execute a suite through `invoker`
pub async fn run_suite(invoker: &mut CommandInvoker, api: &UserApi, suite: &SuiteFile) -> TestSuite {
    let commands = compile_suite(api, suite);
    tracing::info!(suite = %suite.name, scenarios = commands.len(), "Running scenario suite");
    invoker.run_suite(&suite.name, commands).await
}

async fn check_scenario(
    api: &UserApi,
    name: &str,
    query: &UserQuery,
    expect: &Expectation,
) -> Result<()> {
    tracing::debug!(scenario = name, outcome = ?expect.outcome, "Checking scenario");

    match expect.outcome {
        Outcome::ConfigError => match api.query_raw(query).await {
            Err(Error::Config(_)) => Ok(()),
            Err(e) => Err(Error::assertion(format!(
                "Expected a configuration error, got: {}",
                e
            ))),
            Ok(_) => Err(Error::assertion(
                "Expected a configuration error, but the request succeeded",
            )),
        },
        Outcome::RequestError => match api.query_raw(query).await {
            Err(Error::Request { .. }) => Ok(()),
            Err(e) => Err(Error::assertion(format!(
                "Expected a request error, got: {}",
                e
            ))),
            Ok(_) => Err(Error::assertion(
                "Expected a request error, but the request succeeded",
            )),
        },
        Outcome::Success => check_success(api, query, expect).await,
    }
}

async fn check_success(api: &UserApi, query: &UserQuery, expect: &Expectation) -> Result<()> {
    let envelope = api.query_raw(query).await?;

    let strategy = strategy_for(query, expect.validate);
    let validation = strategy.validate(&envelope.body);
    if !validation.is_valid {
        return Err(Error::assertion(format!(
            "{} failed: {}",
            strategy.name(),
            validation.summary()
        )));
    }

    let response: UserResponse = serde_json::from_value(envelope.body)?;

    if let Some(count) = expect.count {
        if response.results.len() != count {
            return Err(Error::assertion(format!(
                "Expected {} results, got {}",
                count,
                response.results.len()
            )));
        }
    }
    if let Some(nat) = &expect.nationality {
        check_attribute(&response, "nat", nat)?;
    }
    if let Some(gender) = &expect.gender {
        check_attribute(&response, "gender", gender)?;
    }
    if let Some(seed) = &expect.seed {
        if &response.info.seed != seed {
            return Err(Error::assertion(format!(
                "Expected seed '{}', got '{}'",
                seed, response.info.seed
            )));
        }
    }
    if let Some(page) = expect.page {
        if response.info.page != page {
            return Err(Error::assertion(format!(
                "Expected page {}, got {}",
                page, response.info.page
            )));
        }
    }
    if expect.reproducible {
        let again = api.query(query).await?;
        if again.results != response.results {
            return Err(Error::assertion(
                "Repeated request returned different records",
            ));
        }
    }
    Ok(())
}

/// Every record must carry `expected` (letter case ignored) under `key`
fn check_attribute(response: &UserResponse, key: &str, expected: &str) -> Result<()> {
    for (i, value) in response.attribute(key).into_iter().enumerate() {
        match value {
            Some(v) if v.eq_ignore_ascii_case(expected) => {}
            Some(v) => {
                return Err(Error::assertion(format!(
                    "results[{}].{}: expected '{}', got '{}'",
                    i, key, expected, v
                )))
            }
            None => {
                return Err(Error::assertion(format!(
                    "results[{}].{}: missing",
                    i, key
                )))
            }
        }
    }
    Ok(())
}

/// Pick the validation recipe for a response to `query`
///
/// Field-restricted queries check records against the fields they asked for.
fn strategy_for(query: &UserQuery, kind: Option<ValidateKind>) -> Box<dyn ValidationStrategy> {
    let fields = query.expected_fields();
    let restricted = query.restricts_fields();

    match kind.unwrap_or(ValidateKind::FullResponse) {
        ValidateKind::FullResponse if restricted => Box::new(factory::restricted_response(&fields)),
        ValidateKind::FullResponse => Box::new(factory::full_response()),
        ValidateKind::Response => Box::new(factory::response_structure()),
        ValidateKind::Users if restricted => {
            Box::new(EachItem::new("/results", UserStructure::with_fields(&fields)))
        }
        ValidateKind::Users => Box::new(EachItem::new("/results", factory::full_user())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, RawResponse, ResilientClient, ScriptedTransport};
    use crate::testing::TestStatus;
    use serde_json::json;
    use std::time::Duration;

    fn person(nat: &str, gender: &str) -> serde_json::Value {
        let mut record = crate::validation::sample_person();
        record["nat"] = json!(nat);
        record["gender"] = json!(gender);
        record
    }

    fn api_returning(body: serde_json::Value) -> (UserApi, Arc<ScriptedTransport>) {
        let text = body.to_string();
        let transport = Arc::new(ScriptedTransport::responding(move |_| {
            Ok(RawResponse {
                status: 200,
                body: text.clone(),
            })
        }));
        let config = ClientConfig::builder()
            .base_url("http://service.test/api/")
            .max_attempts(1)
            .base_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let client = ResilientClient::with_transport(config, transport.clone());
        (UserApi::new(client), transport)
    }

    fn envelope(results: Vec<serde_json::Value>) -> serde_json::Value {
        let count = results.len();
        json!({
            "results": results,
            "info": {"seed": "abc123", "results": count, "page": 1, "version": "1.4"}
        })
    }

    fn scenario(yaml: &str) -> ScenarioSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_builtin_suite_parses() {
        let suite = builtin_suite().unwrap();
        assert!(!suite.scenarios.is_empty());
    }

    #[test]
    fn test_parse_error_is_scenario_error() {
        let err = parse_suite("name: [").unwrap_err();
        assert!(matches!(err, Error::ScenarioParse(_)));
    }

    #[tokio::test]
    async fn test_success_scenario_passes() {
        let (api, _) = api_returning(envelope(vec![person("GB", "female"), person("GB", "male")]));
        let spec = scenario(
            "name: british\nrequest: { results: 2, nat: [gb] }\nexpect: { count: 2, nationality: GB, seed: abc123, page: 1 }",
        );
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_passed(), "{:?}", result.error());
    }

    #[tokio::test]
    async fn test_wrong_gender_fails_with_index() {
        let (api, _) = api_returning(envelope(vec![person("GB", "female"), person("GB", "male")]));
        let spec = scenario("name: women\nrequest: { results: 2, gender: female }\nexpect: { gender: female }");
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_failed());
        assert!(result.error().unwrap().contains("results[1].gender"));
    }

    #[tokio::test]
    async fn test_config_error_expected_makes_no_call() {
        let (api, transport) = api_returning(envelope(vec![]));
        let spec = scenario("name: too many\nrequest: { results: 5001 }\nexpect: { outcome: config_error }");
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_passed(), "{:?}", result.error());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_names_strategy() {
        let mut broken = person("GB", "female");
        broken.as_object_mut().unwrap().remove("email");
        let (api, _) = api_returning(envelope(vec![broken]));
        let spec = scenario("name: one\nrequest: { results: 1 }");
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_failed());
        let error = result.error().unwrap();
        assert!(error.contains("Missing required field: email"), "{error}");
    }

    #[tokio::test]
    async fn test_restricted_fields_use_narrowed_structure() {
        let record = json!({"name": {"title": "Mr", "first": "A", "last": "B"}, "nat": "US"});
        let (api, _) = api_returning(envelope(vec![record]));
        let spec = scenario("name: inc\nrequest: { results: 1, inc: [name, nat] }\nexpect: { count: 1 }");
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_passed(), "{:?}", result.error());
    }

    #[tokio::test]
    async fn test_reproducible_fetches_twice() {
        let (api, transport) = api_returning(envelope(vec![person("US", "male")]));
        let spec = scenario("name: seeded\nrequest: { results: 1, seed: abc123 }\nexpect: { reproducible: true }");
        assert!(compile(&api, &spec).execute().await.is_passed());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_steps_compile_to_group() {
        let (api, transport) = api_returning(envelope(vec![person("GB", "female")]));
        let spec = scenario(
            r#"
name: group
steps:
  - name: first
    request: { results: 1 }
  - name: bad
    request: { results: 0 }
  - name: never
    request: { results: 1 }
"#,
        );
        let result = compile(&api, &spec).execute().await;
        assert!(result.is_failed());
        assert!(result.error().unwrap().starts_with("bad failed: "));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_skipped_scenario() {
        let (api, transport) = api_returning(envelope(vec![]));
        let spec = scenario("name: later\nskip: flaky upstream\nrequest: { results: 1 }");
        let result = compile(&api, &spec).execute().await;
        assert_eq!(result.status(), TestStatus::Skipped);
        assert_eq!(transport.calls(), 0);
    }
}
