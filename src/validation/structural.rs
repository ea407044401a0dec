//! Structural strategies
//!
//! Check that an entity carries its required attributes, including nested
//! sub-attributes. A key that is absent or `null` counts as missing.

use serde_json::Value;

use super::{ValidationResult, ValidationStrategy};
use crate::api::FIELDS;

/// Nested attributes required under each top-level person attribute
const NESTED: &[(&str, &[&str])] = &[
    ("name", &["title", "first", "last"]),
    (
        "location",
        &["street", "city", "state", "country", "postcode", "coordinates", "timezone"],
    ),
    ("login", &["uuid", "username", "password"]),
    ("dob", &["date", "age"]),
    ("registered", &["date", "age"]),
    ("id", &["name"]),
    ("picture", &["large", "medium", "thumbnail"]),
];

fn present<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn missing(path: &str) -> (String, String) {
    (path.to_string(), format!("Missing required field: {path}"))
}

fn wrong_kind(path: &str, kind: &str) -> (String, String) {
    (path.to_string(), format!("Field {path} must be {kind}"))
}

/// Tag the result with the offending field when there is exactly one
fn collect(problems: Vec<(String, String)>) -> ValidationResult {
    let field = match problems.as_slice() {
        [(path, _)] => Some(path.clone()),
        _ => None,
    };
    let result = ValidationResult::from_errors(problems.into_iter().map(|(_, e)| e).collect());
    match field {
        Some(path) => result.with_field(path),
        None => result,
    }
}

/// Shape of one person record
#[derive(Debug, Clone)]
pub struct UserStructure {
    fields: Vec<String>,
}

impl Default for UserStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStructure {
    /// Require every person attribute
    pub fn new() -> Self {
        Self::with_fields(FIELDS)
    }

    /// Require only the given top-level attributes (and their nested ones)
    pub fn with_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl ValidationStrategy for UserStructure {
    fn name(&self) -> String {
        "UserStructure".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        if !data.is_object() {
            return ValidationResult::invalid("Person record must be an object");
        }

        let mut problems = Vec::new();
        for field in &self.fields {
            let Some(value) = present(data, field) else {
                problems.push(missing(field));
                continue;
            };
            let nested = NESTED
                .iter()
                .find(|(name, _)| *name == field.as_str())
                .map(|(_, keys)| *keys)
                .unwrap_or_default();
            for key in nested {
                if present(value, key).is_none() {
                    problems.push(missing(&format!("{field}.{key}")));
                }
            }
        }
        collect(problems)
    }
}

/// Shape of the response envelope: `results` plus `info`
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseStructure;

impl ValidationStrategy for ResponseStructure {
    fn name(&self) -> String {
        "ResponseStructure".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        if !data.is_object() {
            return ValidationResult::invalid("Response must be an object");
        }

        let mut problems = Vec::new();
        match present(data, "results") {
            None => problems.push(missing("results")),
            Some(v) if !v.is_array() => problems.push(wrong_kind("results", "an array")),
            Some(_) => {}
        }

        match present(data, "info") {
            None => problems.push(missing("info")),
            Some(info) if !info.is_object() => problems.push(wrong_kind("info", "an object")),
            Some(info) => {
                let checks: [(&str, fn(&Value) -> bool, &str); 4] = [
                    ("seed", Value::is_string, "a string"),
                    ("results", Value::is_number, "a number"),
                    ("page", Value::is_number, "a number"),
                    ("version", Value::is_string, "a string"),
                ];
                for (key, is_kind, kind) in checks {
                    match present(info, key) {
                        None => problems.push(missing(&format!("info.{key}"))),
                        Some(v) if !is_kind(v) => {
                            problems.push(wrong_kind(&format!("info.{key}"), kind))
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        collect(problems)
    }
}
