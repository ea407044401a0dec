//! Strategies built from other strategies

use serde_json::Value;

use super::{dotted, ValidationResult, ValidationStrategy};

/// Runs every sub-strategy in order and concatenates their errors
///
/// Valid iff all sub-results are valid. There is no short-circuit.
#[derive(Default)]
pub struct Composite {
    strategies: Vec<Box<dyn ValidationStrategy>>,
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy
    pub fn with(mut self, strategy: impl ValidationStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Append an already boxed strategy
    pub fn push(&mut self, strategy: Box<dyn ValidationStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl FromIterator<Box<dyn ValidationStrategy>> for Composite {
    fn from_iter<I: IntoIterator<Item = Box<dyn ValidationStrategy>>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl ValidationStrategy for Composite {
    fn name(&self) -> String {
        self.strategies
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join("+")
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let errors = self
            .strategies
            .iter()
            .flat_map(|s| s.validate(data).errors)
            .collect();
        ValidationResult::from_errors(errors)
    }
}

/// Applies a strategy to the value at a JSON pointer
///
/// A missing value is valid unless the adapter is [`required`](AtPath::required):
/// presence is usually a structural check's job.
pub struct AtPath {
    pointer: String,
    inner: Box<dyn ValidationStrategy>,
    required: bool,
}

impl AtPath {
    pub fn new(pointer: impl Into<String>, inner: impl ValidationStrategy + 'static) -> Self {
        Self {
            pointer: pointer.into(),
            inner: Box::new(inner),
            required: false,
        }
    }

    /// Report a missing value as an error
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl ValidationStrategy for AtPath {
    fn name(&self) -> String {
        format!("{}@{}", self.inner.name(), dotted(&self.pointer))
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let path = dotted(&self.pointer);
        match data.pointer(&self.pointer).filter(|v| !v.is_null()) {
            Some(value) => {
                let result = self.inner.validate(value);
                ValidationResult::from_errors(
                    result.errors.into_iter().map(|e| format!("{path}: {e}")).collect(),
                )
                .with_field(path)
            }
            None if self.required => {
                ValidationResult::invalid(format!("Missing required field: {path}")).with_field(path)
            }
            None => ValidationResult::valid().with_field(path),
        }
    }
}

/// Applies a strategy to every element of the array at a JSON pointer
pub struct EachItem {
    pointer: String,
    inner: Box<dyn ValidationStrategy>,
}

impl EachItem {
    pub fn new(pointer: impl Into<String>, inner: impl ValidationStrategy + 'static) -> Self {
        Self {
            pointer: pointer.into(),
            inner: Box::new(inner),
        }
    }
}

impl ValidationStrategy for EachItem {
    fn name(&self) -> String {
        format!("Each({})@{}", self.inner.name(), dotted(&self.pointer))
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let path = dotted(&self.pointer);
        let Some(items) = data.pointer(&self.pointer).and_then(Value::as_array) else {
            return ValidationResult::invalid(format!("Field {path} must be an array"))
                .with_field(path);
        };

        let prefix = path.as_str();
        let errors = items
            .iter()
            .enumerate()
            .flat_map(|(i, item)| {
                self.inner
                    .validate(item)
                    .errors
                    .into_iter()
                    .map(move |e| format!("{prefix}[{i}]: {e}"))
            })
            .collect();
        ValidationResult::from_errors(errors).with_field(path)
    }
}
