//! Query construction and parameter validation
//!
//! Every check here runs before any network call and reports
//! [`Error::Config`], which is never retried.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::client::{ClientConfig, QueryValue, RequestSpec};
use crate::common::{Error, Result};

/// Largest `results` value the service accepts
pub const MAX_RESULTS: u32 = 5000;

/// Nationality codes the service knows
pub const NATIONALITIES: &[&str] = &[
    "AU", "BR", "CA", "CH", "DE", "DK", "ES", "FI", "FR", "GB", "IE", "IN", "IR", "MX", "NL", "NO",
    "NZ", "RS", "TR", "UA", "US",
];

/// Top-level person attributes usable with `inc` / `exc`
pub const FIELDS: &[&str] = &[
    "gender",
    "name",
    "location",
    "email",
    "login",
    "registered",
    "dob",
    "phone",
    "cell",
    "id",
    "picture",
    "nat",
];

/// Gender filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(Error::config(format!(
                "Invalid gender '{s}'. Supported: male, female"
            ))),
        }
    }
}

/// Check a result count
pub fn validate_count(count: u32) -> Result<u32> {
    if (1..=MAX_RESULTS).contains(&count) {
        Ok(count)
    } else {
        Err(Error::config(format!(
            "Results count must be between 1 and {MAX_RESULTS}, got {count}"
        )))
    }
}

/// Check a nationality code and normalize it to upper case
pub fn normalize_nationality(code: &str) -> Result<String> {
    let upper = code.trim().to_ascii_uppercase();
    if NATIONALITIES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(Error::config(format!(
            "Invalid nationality '{code}'. Supported: {}",
            NATIONALITIES.join(", ")
        )))
    }
}

/// Check field names against [`FIELDS`]
pub fn validate_fields<S: AsRef<str>>(fields: &[S]) -> Result<Vec<String>> {
    if fields.is_empty() {
        return Err(Error::config("Field list cannot be empty"));
    }
    let invalid: Vec<&str> = fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| !FIELDS.contains(f))
        .collect();
    if !invalid.is_empty() {
        return Err(Error::config(format!(
            "Invalid field(s): {}. Supported: {}",
            invalid.join(", "),
            FIELDS.join(", ")
        )));
    }
    Ok(fields.iter().map(|f| f.as_ref().to_string()).collect())
}

/// Seeds are opaque alphanumeric tokens
pub fn validate_seed(seed: &str) -> Result<String> {
    let seed = seed.trim();
    if seed.is_empty() || !seed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::config(format!(
            "Invalid seed '{seed}': expected a non-empty alphanumeric string"
        )));
    }
    Ok(seed.to_string())
}

/// Check a page number
pub fn validate_page(page: u32) -> Result<u32> {
    if page == 0 {
        return Err(Error::config("Page must be 1 or greater"));
    }
    Ok(page)
}

/// A request against the person endpoint, validated on conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserQuery {
    pub results: Option<u32>,
    pub gender: Option<String>,
    pub nat: Vec<String>,
    pub inc: Vec<String>,
    pub exc: Vec<String>,
    pub seed: Option<String>,
    pub page: Option<u32>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(mut self, count: u32) -> Self {
        self.results = Some(count);
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn nationality(mut self, code: impl Into<String>) -> Self {
        self.nat.push(code.into());
        self
    }

    pub fn include<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.inc.extend(fields.iter().map(|f| f.as_ref().to_string()));
        self
    }

    pub fn exclude<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.exc.extend(fields.iter().map(|f| f.as_ref().to_string()));
        self
    }

    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Whether the response records are restricted to a field subset
    pub fn restricts_fields(&self) -> bool {
        !self.inc.is_empty() || !self.exc.is_empty()
    }

    /// Top-level fields the response records should carry
    pub fn expected_fields(&self) -> Vec<&'static str> {
        FIELDS
            .iter()
            .copied()
            .filter(|f| self.inc.is_empty() || self.inc.iter().any(|i| i == f))
            .filter(|f| !self.exc.iter().any(|e| e == f))
            .collect()
    }

    /// Validate every parameter and build the request
    pub fn to_request(&self, config: &ClientConfig) -> Result<RequestSpec> {
        let mut query: BTreeMap<String, QueryValue> = BTreeMap::new();
        query.insert("format".to_string(), QueryValue::from("json"));

        if let Some(count) = self.results {
            query.insert("results".to_string(), validate_count(count)?.into());
        }
        if let Some(gender) = &self.gender {
            let gender: Gender = gender.parse()?;
            query.insert("gender".to_string(), gender.as_str().into());
        }
        if !self.nat.is_empty() {
            let codes = self
                .nat
                .iter()
                .map(|c| normalize_nationality(c))
                .collect::<Result<Vec<_>>>()?;
            query.insert("nat".to_string(), QueryValue::List(codes));
        }
        if !self.inc.is_empty() {
            query.insert("inc".to_string(), QueryValue::List(validate_fields(&self.inc)?));
        }
        if !self.exc.is_empty() {
            query.insert("exc".to_string(), QueryValue::List(validate_fields(&self.exc)?));
        }
        if let Some(seed) = &self.seed {
            query.insert("seed".to_string(), validate_seed(seed)?.into());
        }
        if let Some(page) = self.page {
            query.insert("page".to_string(), validate_page(page)?.into());
        }

        let mut spec = config.request();
        spec.query = query;
        Ok(spec)
    }
}
