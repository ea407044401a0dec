//! Lifecycle observers and their registry

use std::sync::Arc;

use colored::Colorize;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use super::result::{TestResult, TestStatus, TestSuite};

/// Receives test lifecycle events; every handler defaults to a no-op
///
/// Handlers are infallible. A panicking handler propagates to the caller and
/// later observers miss that event.
pub trait TestObserver: Send + Sync {
    fn on_test_started(&self, _name: &str) {}

    fn on_test_completed(&self, _result: &TestResult) {}

    fn on_suite_completed(&self, _suite: &TestSuite) {}
}

/// Ordered list of observers, notified synchronously in subscription order
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn TestObserver>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn TestObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove by identity; returns whether it was subscribed
    pub fn unsubscribe(&self, observer: &Arc<dyn TestObserver>) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    pub fn notify_test_started(&self, name: &str) {
        for observer in self.snapshot() {
            observer.on_test_started(name);
        }
    }

    pub fn notify_test_completed(&self, result: &TestResult) {
        for observer in self.snapshot() {
            observer.on_test_completed(result);
        }
    }

    pub fn notify_suite_completed(&self, suite: &TestSuite) {
        for observer in self.snapshot() {
            observer.on_suite_completed(suite);
        }
    }

    // Handlers may subscribe or unsubscribe, so never hold the lock during fan-out
    fn snapshot(&self) -> Vec<Arc<dyn TestObserver>> {
        self.observers.read().clone()
    }
}

/// Aggregate counters over completed tests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
    pub average_duration_ms: f64,
    pub fastest: Option<String>,
    pub slowest: Option<String>,
    #[serde(skip)]
    fastest_ms: u64,
    #[serde(skip)]
    slowest_ms: u64,
}

impl Metrics {
    fn record(&mut self, result: &TestResult) {
        self.total += 1;
        match result.status() {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
        }

        let duration = result.duration_ms();
        self.total_duration_ms += duration;
        self.average_duration_ms = self.total_duration_ms as f64 / self.total as f64;

        if self.fastest.is_none() || duration < self.fastest_ms {
            self.fastest = Some(result.name().to_string());
            self.fastest_ms = duration;
        }
        if self.slowest.is_none() || duration > self.slowest_ms {
            self.slowest = Some(result.name().to_string());
            self.slowest_ms = duration;
        }
    }
}

/// Collects [`Metrics`] from completion events
#[derive(Default)]
pub struct MetricsObserver {
    metrics: Mutex<Metrics>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Metrics {
        self.metrics.lock().clone()
    }

    pub fn reset(&self) {
        *self.metrics.lock() = Metrics::default();
    }
}

impl TestObserver for MetricsObserver {
    fn on_test_completed(&self, result: &TestResult) {
        self.metrics.lock().record(result);
    }
}

/// Emits a `tracing` event per lifecycle event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TestObserver for TracingObserver {
    fn on_test_started(&self, name: &str) {
        tracing::info!(test = name, "Test started");
    }

    fn on_test_completed(&self, result: &TestResult) {
        match result.status() {
            TestStatus::Failed => tracing::warn!(
                test = result.name(),
                duration_ms = result.duration_ms(),
                error = result.error().unwrap_or_default(),
                "Test failed"
            ),
            status => tracing::info!(
                test = result.name(),
                status = %status,
                duration_ms = result.duration_ms(),
                "Test completed"
            ),
        }
    }

    fn on_suite_completed(&self, suite: &TestSuite) {
        tracing::info!(
            suite = suite.name(),
            total = suite.total(),
            passed = suite.passed(),
            failed = suite.failed(),
            skipped = suite.skipped(),
            duration_ms = suite.duration_ms(),
            "Suite completed"
        );
    }
}

/// Coloured per-test lines and a closing summary on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TestObserver for ConsoleReporter {
    fn on_test_started(&self, name: &str) {
        if self.verbose {
            println!("  {} {}", "→".cyan(), name.dimmed());
        }
    }

    fn on_test_completed(&self, result: &TestResult) {
        let timing = format!("({}ms)", result.duration_ms());
        match result.status() {
            TestStatus::Passed => {
                println!("  {} {} {}", "✓".green(), result.name(), timing.dimmed())
            }
            TestStatus::Failed => {
                println!("  {} {} {}", "✗".red(), result.name(), timing.dimmed());
                if let Some(error) = result.error() {
                    println!("      {}", error.red());
                }
            }
            TestStatus::Skipped => println!(
                "  {} {} {}",
                "-".yellow(),
                result.name(),
                result.error().unwrap_or_default().dimmed()
            ),
        }
    }

    fn on_suite_completed(&self, suite: &TestSuite) {
        println!();
        if suite.is_success() {
            println!(
                "{} {} ({} passed, {} skipped, {}ms)",
                "✓ PASSED".green().bold(),
                suite.name().white().bold(),
                suite.passed(),
                suite.skipped(),
                suite.duration_ms()
            );
        } else {
            println!(
                "{} {} ({} of {} failed)",
                "✗ FAILED".red().bold(),
                suite.name().white().bold(),
                suite.failed(),
                suite.total()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends `<tag>:<event>` to a shared log
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TestObserver for Recorder {
        fn on_test_started(&self, name: &str) {
            self.log.lock().push(format!("{}:start {name}", self.tag));
        }

        fn on_test_completed(&self, result: &TestResult) {
            self.log
                .lock()
                .push(format!("{}:done {}", self.tag, result.name()));
        }
    }

    fn recorder(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn TestObserver> {
        Arc::new(Recorder {
            tag,
            log: log.clone(),
        })
    }

    #[test]
    fn test_fan_out_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        registry.subscribe(recorder("o1", &log));
        registry.subscribe(recorder("o2", &log));

        registry.notify_test_completed(&TestResult::passed("t", 1));
        assert_eq!(*log.lock(), vec!["o1:done t", "o2:done t"]);
    }

    #[test]
    fn test_unsubscribe_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::new();
        let first = recorder("o1", &log);
        registry.subscribe(first.clone());
        registry.subscribe(recorder("o2", &log));

        assert!(registry.unsubscribe(&first));
        assert!(!registry.unsubscribe(&first));
        registry.notify_test_started("t");
        assert_eq!(*log.lock(), vec!["o2:start t"]);
    }

    /// Subscribes another recorder the first time it sees a start event
    struct Subscriber {
        registry: Arc<ObserverRegistry>,
        log: Arc<Mutex<Vec<String>>>,
        done: Mutex<bool>,
    }

    impl TestObserver for Subscriber {
        fn on_test_started(&self, _name: &str) {
            let mut done = self.done.lock();
            if !*done {
                *done = true;
                self.registry.subscribe(recorder("late", &self.log));
            }
        }
    }

    #[test]
    fn test_subscribe_during_fan_out_applies_to_next_event() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(ObserverRegistry::new());
        registry.subscribe(Arc::new(Subscriber {
            registry: registry.clone(),
            log: log.clone(),
            done: Mutex::new(false),
        }));

        registry.notify_test_started("a");
        assert!(log.lock().is_empty());
        registry.notify_test_started("b");
        assert_eq!(*log.lock(), vec!["late:start b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_metrics_observer() {
        let metrics = MetricsObserver::new();
        metrics.on_test_completed(&TestResult::passed("quick", 10));
        metrics.on_test_completed(&TestResult::failed("slow", 50, "boom"));
        metrics.on_test_completed(&TestResult::skipped("later", "n/a"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.passed, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.total_duration_ms, 60);
        assert!((snapshot.average_duration_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.fastest.as_deref(), Some("later"));
        assert_eq!(snapshot.slowest.as_deref(), Some("slow"));

        metrics.reset();
        assert_eq!(metrics.snapshot().total, 0);
    }

    #[test]
    fn test_tracing_observer_handles_suite_event() {
        let registry = ObserverRegistry::new();
        registry.subscribe(Arc::new(TracingObserver));
        registry.notify_suite_completed(&TestSuite::new("empty", vec![]));
        assert_eq!(registry.len(), 1);
    }
}
