//! Executable test units

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::common::Result;

use super::result::TestResult;

/// One executable, possibly undoable, test
///
/// `execute` never fails: any error is reported as a failed [`TestResult`].
#[async_trait]
pub trait TestCommand: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute(&self) -> TestResult;

    /// Best-effort reversal of side effects; no-op by default
    async fn undo(&self) {}
}

/// Time `body` and turn its outcome into a result named `name`
pub async fn run_timed<F>(name: &str, body: F) -> TestResult
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();
    let outcome = body.await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => TestResult::passed(name, duration_ms),
        Err(e) => TestResult::failed(name, duration_ms, e.to_string()),
    }
}

type Body = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;
type Undo = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A primitive command built from an async closure
pub struct ScenarioCommand {
    name: String,
    description: String,
    body: Body,
    undo: Option<Undo>,
    skip: Option<String>,
}

impl ScenarioCommand {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            body: Arc::new(move || body().boxed()),
            undo: None,
            skip: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_undo<F, Fut>(mut self, undo: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.undo = Some(Arc::new(move || undo().boxed()));
        self
    }

    /// Report as skipped instead of running
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }
}

#[async_trait]
impl TestCommand for ScenarioCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self) -> TestResult {
        if let Some(reason) = &self.skip {
            return TestResult::skipped(&self.name, reason.clone());
        }
        run_timed(&self.name, (self.body)()).await
    }

    async fn undo(&self) {
        if let Some(undo) = &self.undo {
            undo().await;
        }
    }
}

/// Ordered group of commands run as one
///
/// Stops at the first failed sub-result; skipped sub-results do not stop it.
/// Undo runs every sub-command's undo in reverse order, whatever the outcome.
pub struct MacroCommand {
    name: String,
    description: String,
    commands: Vec<Arc<dyn TestCommand>>,
}

impl MacroCommand {
    pub fn new(name: impl Into<String>, commands: Vec<Arc<dyn TestCommand>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            commands,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn commands(&self) -> &[Arc<dyn TestCommand>] {
        &self.commands
    }
}

#[async_trait]
impl TestCommand for MacroCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self) -> TestResult {
        let start = Instant::now();
        for command in &self.commands {
            let result = command.execute().await;
            if result.is_failed() {
                let message = format!(
                    "{} failed: {}",
                    command.name(),
                    result.error().unwrap_or("unknown error")
                );
                return TestResult::failed(
                    &self.name,
                    start.elapsed().as_millis() as u64,
                    message,
                );
            }
        }
        TestResult::passed(&self.name, start.elapsed().as_millis() as u64)
    }

    async fn undo(&self) {
        for command in self.commands.iter().rev() {
            command.undo().await;
        }
    }
}
