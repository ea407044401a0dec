//! Scenario suite configuration types
//!
//! Defines the data structures for deserializing YAML scenario suites.

use serde::Deserialize;

use crate::api::UserQuery;

/// A named list of scenarios loaded from YAML
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SuiteFile {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Scenarios, run in order
    pub scenarios: Vec<ScenarioSpec>,
}

/// One scenario: a request plus its expectations, or a group of nested steps
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    /// Name reported in results
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Reason to skip instead of running
    pub skip: Option<String>,
    /// Query to send
    #[serde(default)]
    pub request: UserQuery,
    /// Expectations for the response
    #[serde(default)]
    pub expect: Expectation,
    /// Nested scenarios, run as one group; `request` and `expect` are ignored
    #[serde(default)]
    pub steps: Vec<ScenarioSpec>,
}

/// Expected outcome of a request
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The request succeeds and the checks pass
    #[default]
    Success,
    /// The request is rejected before any network call
    ConfigError,
    /// The request fails after reaching the service
    RequestError,
}

/// Which validation recipe to apply to a successful response
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidateKind {
    /// Envelope plus full person checks for every record
    FullResponse,
    /// Envelope only
    Response,
    /// Full person checks for every record, envelope ignored
    Users,
}

/// Assertions on a response
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub outcome: Outcome,
    /// Expected number of records
    pub count: Option<usize>,
    /// Validation recipe; picked from the request when absent
    pub validate: Option<ValidateKind>,
    /// Every record must carry this `nat`
    pub nationality: Option<String>,
    /// Every record must carry this `gender`
    pub gender: Option<String>,
    /// Expected `info.seed`
    pub seed: Option<String>,
    /// Expected `info.page`
    pub page: Option<u32>,
    /// Fetch twice and require identical records
    #[serde(default)]
    pub reproducible: bool,
}
