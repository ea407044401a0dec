//! Test outcomes and suite roll-ups

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
        })
    }
}

/// Result of one command execution; immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    name: String,
    status: TestStatus,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TestResult {
    fn new(name: &str, status: TestStatus, duration_ms: u64, error: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            duration_ms,
            error,
            timestamp: Utc::now(),
        }
    }

    pub fn passed(name: &str, duration_ms: u64) -> Self {
        Self::new(name, TestStatus::Passed, duration_ms, None)
    }

    pub fn failed(name: &str, duration_ms: u64, error: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Failed, duration_ms, Some(error.into()))
    }

    pub fn skipped(name: &str, reason: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Skipped, 0, Some(reason.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Failure message, or skip reason
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the result was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == TestStatus::Failed
    }
}

/// Ordered results of one run; every count is derived from `results`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    name: String,
    results: Vec<TestResult>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>, results: Vec<TestResult>) -> Self {
        Self {
            name: name.into(),
            results,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    pub fn duration_ms(&self) -> u64 {
        self.results.iter().map(TestResult::duration_ms).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

impl Serialize for TestSuite {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TestSuite", 7)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("passed", &self.passed())?;
        state.serialize_field("failed", &self.failed())?;
        state.serialize_field("skipped", &self.skipped())?;
        state.serialize_field("duration_ms", &self.duration_ms())?;
        state.serialize_field("results", &self.results)?;
        state.end()
    }
}
