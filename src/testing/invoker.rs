//! Command history with undo/redo

use std::sync::Arc;

use super::command::TestCommand;
use super::observer::ObserverRegistry;
use super::result::{TestResult, TestSuite};

/// Executes commands, keeps their history and drives observers
///
/// `cursor` is the index of the most recently applied entry, `None` when
/// nothing is applied. Executing a new command discards every entry after the
/// cursor. Every mutating operation takes `&mut self`: one driver at a time.
pub struct CommandInvoker {
    history: Vec<Arc<dyn TestCommand>>,
    cursor: Option<usize>,
    observers: Arc<ObserverRegistry>,
}

impl Default for CommandInvoker {
    fn default() -> Self {
        Self::new(Arc::new(ObserverRegistry::new()))
    }
}

impl CommandInvoker {
    pub fn new(observers: Arc<ObserverRegistry>) -> Self {
        Self {
            history: Vec::new(),
            cursor: None,
            observers,
        }
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    /// Truncate the redo branch, record `command`, then run it
    pub async fn execute(&mut self, command: Arc<dyn TestCommand>) -> TestResult {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.history.truncate(keep);
        self.history.push(command.clone());
        self.cursor = Some(self.history.len() - 1);

        self.run(command.as_ref()).await
    }

    /// Reverse the current entry and step back; no-op when nothing is applied
    pub async fn undo(&mut self) {
        let Some(current) = self.cursor else {
            return;
        };
        let command = self.history[current].clone();
        tracing::debug!(test = command.name(), "Undoing test");
        command.undo().await;
        self.cursor = current.checked_sub(1);
    }

    /// Step forward and re-run the next entry, if there is one
    pub async fn redo(&mut self) -> Option<TestResult> {
        let next = self.cursor.map_or(0, |c| c + 1);
        let command = self.history.get(next)?.clone();
        self.cursor = Some(next);
        Some(self.run(command.as_ref()).await)
    }

    /// Every recorded command, applied or not
    pub fn history(&self) -> Vec<Arc<dyn TestCommand>> {
        self.history.clone()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.history.len()
    }

    /// Index of the most recently applied entry
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.cursor = None;
    }

    /// Execute each command in order, then report the suite
    pub async fn run_suite(
        &mut self,
        name: &str,
        commands: impl IntoIterator<Item = Arc<dyn TestCommand>>,
    ) -> TestSuite {
        tracing::debug!(suite = name, "Running suite");
        let mut results = Vec::new();
        for command in commands {
            results.push(self.execute(command).await);
        }

        let suite = TestSuite::new(name, results);
        self.observers.notify_suite_completed(&suite);
        suite
    }

    async fn run(&self, command: &dyn TestCommand) -> TestResult {
        self.observers.notify_test_started(command.name());
        let result = command.execute().await;
        self.observers.notify_test_completed(&result);
        result
    }
}
