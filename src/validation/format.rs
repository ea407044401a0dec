//! Field-format strategies
//!
//! Each checks one scalar (or the small coordinates object).

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use uuid::Uuid;

use super::{ValidationResult, ValidationStrategy};

fn expect_str<'a>(data: &'a Value, what: &str) -> Result<&'a str, ValidationResult> {
    data.as_str()
        .ok_or_else(|| ValidationResult::invalid(format!("{what} must be a string, got {}", kind(data))))
}

fn kind(data: &Value) -> &'static str {
    match data {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

/// `local@domain.tld`
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailFormat;

impl ValidationStrategy for EmailFormat {
    fn name(&self) -> String {
        "EmailFormat".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let result = match expect_str(data, "Email") {
            Ok(email) if email_regex().is_match(email) => ValidationResult::valid(),
            Ok(email) => ValidationResult::invalid(format!("Invalid email format: {email}")),
            Err(result) => result,
        };
        result.with_field("email")
    }
}

/// Hyphenated UUID
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidFormat;

impl ValidationStrategy for UuidFormat {
    fn name(&self) -> String {
        "UuidFormat".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let result = match expect_str(data, "UUID") {
            Ok(s) if s.len() == 36 && Uuid::try_parse(s).is_ok() => ValidationResult::valid(),
            Ok(s) => ValidationResult::invalid(format!("Invalid UUID format: {s}")),
            Err(result) => result,
        };
        result.with_field("uuid")
    }
}

/// Absolute URL
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlFormat;

impl ValidationStrategy for UrlFormat {
    fn name(&self) -> String {
        "UrlFormat".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let result = match expect_str(data, "URL") {
            Ok(s) => match Url::parse(s) {
                Ok(_) => ValidationResult::valid(),
                Err(e) => ValidationResult::invalid(format!("Invalid URL format: {s} ({e})")),
            },
            Err(result) => result,
        };
        result.with_field("url")
    }
}

/// RFC 3339 timestamp or `YYYY-MM-DD`
#[derive(Debug, Default, Clone, Copy)]
pub struct DateFormat;

impl ValidationStrategy for DateFormat {
    fn name(&self) -> String {
        "DateFormat".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        let result = match expect_str(data, "Date") {
            Ok(s) => {
                let parses = DateTime::parse_from_rfc3339(s).is_ok()
                    || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
                if parses {
                    ValidationResult::valid()
                } else {
                    ValidationResult::invalid(format!("Invalid date format: {s}"))
                }
            }
            Err(result) => result,
        };
        result.with_field("date")
    }
}

/// `{latitude, longitude}` within range; numbers or numeric strings
#[derive(Debug, Default, Clone, Copy)]
pub struct CoordinatesFormat;

impl CoordinatesFormat {
    fn check(data: &Value, key: &str, limit: f64, errors: &mut Vec<String>) {
        let Some(raw) = data.get(key) else {
            errors.push(format!("Missing {key}"));
            return;
        };
        let value = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match value {
            Some(v) if v.is_finite() && (-limit..=limit).contains(&v) => {}
            Some(v) => errors.push(format!("Invalid {key}: {v} (must be between -{limit} and {limit})")),
            None => errors.push(format!("Invalid {key}: {raw} is not a number")),
        }
    }
}

impl ValidationStrategy for CoordinatesFormat {
    fn name(&self) -> String {
        "CoordinatesFormat".to_string()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        if !data.is_object() {
            return ValidationResult::invalid(format!(
                "Coordinates must be an object, got {}",
                kind(data)
            ))
            .with_field("coordinates");
        }
        let mut errors = Vec::new();
        Self::check(data, "latitude", 90.0, &mut errors);
        Self::check(data, "longitude", 180.0, &mut errors);
        ValidationResult::from_errors(errors).with_field("coordinates")
    }
}
