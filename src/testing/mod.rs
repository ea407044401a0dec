//! Test orchestration
//!
//! Commands wrap one executable test each. The [`CommandInvoker`] runs them,
//! keeps an undo/redo history and fans lifecycle events out to the observers
//! in an [`ObserverRegistry`]. The runner compiles YAML scenario suites into
//! commands that drive the person API.

mod command;
mod config;
mod invoker;
mod observer;
mod result;
mod runner;

pub use command::{run_timed, MacroCommand, ScenarioCommand, TestCommand};
pub use config::*;
pub use invoker::CommandInvoker;
pub use observer::{
    ConsoleReporter, Metrics, MetricsObserver, ObserverRegistry, TestObserver, TracingObserver,
};
pub use result::{TestResult, TestStatus, TestSuite};
pub use runner::{builtin_suite, compile, compile_suite, load_suite, parse_suite, run_suite};
