//! Validation strategies over structured data
//!
//! A strategy inspects a `serde_json::Value` and returns a
//! [`ValidationResult`]. Invalid data is an ordinary return value, never an
//! error: the caller decides whether it fails a test.

mod composite;
pub mod factory;
mod format;
mod structural;

pub use composite::{AtPath, Composite, EachItem};
pub use format::{CoordinatesFormat, DateFormat, EmailFormat, UrlFormat, UuidFormat};
pub use structural::{ResponseStructure, UserStructure};

use serde::Serialize;
use serde_json::Value;
#[cfg(test)]
use serde_json::json;

/// Outcome of one validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Field the result is about, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            field: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self::from_errors(vec![error.into()])
    }

    /// Valid iff `errors` is empty
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Errors joined into one line
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// A named check over structured data
pub trait ValidationStrategy: Send + Sync {
    /// Stable name of the check
    fn name(&self) -> String;

    fn validate(&self, data: &Value) -> ValidationResult;
}

impl<T: ValidationStrategy + ?Sized> ValidationStrategy for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn validate(&self, data: &Value) -> ValidationResult {
        (**self).validate(data)
    }
}

/// Render a JSON pointer as a dotted path (`/login/uuid` -> `login.uuid`)
pub(crate) fn dotted(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}

/// A complete person record as the service returns it
#[cfg(test)]
pub(crate) fn sample_person() -> Value {
    json!({
        "gender": "female",
        "name": {"title": "Ms", "first": "Jane", "last": "Doe"},
        "location": {
            "street": {"number": 12, "name": "Main St"},
            "city": "Leeds",
            "state": "West Yorkshire",
            "country": "United Kingdom",
            "postcode": "LS1 4AP",
            "coordinates": {"latitude": "53.8", "longitude": "-1.55"},
            "timezone": {"offset": "+0:00", "description": "London"}
        },
        "email": "jane.doe@example.com",
        "login": {
            "uuid": "155e77ee-ba6d-486f-95ce-0e0c0fb4b919",
            "username": "silverswan131",
            "password": "firewall"
        },
        "dob": {"date": "1993-07-20T09:44:18.674Z", "age": 31},
        "registered": {"date": "2008-05-12T10:02:11.104Z", "age": 16},
        "phone": "017684 43218",
        "cell": "07700 900123",
        "id": {"name": "NINO", "value": null},
        "picture": {
            "large": "https://randomuser.me/api/portraits/women/75.jpg",
            "medium": "https://randomuser.me/api/portraits/med/women/75.jpg",
            "thumbnail": "https://randomuser.me/api/portraits/thumb/women/75.jpg"
        },
        "nat": "GB"
    })
}
