//! Response payload types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful payload of the person endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    /// Person records; their shape depends on `inc` / `exc`
    pub results: Vec<Value>,
    pub info: Info,
}

/// Paging and reproducibility metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Info {
    pub seed: String,
    pub results: u32,
    pub page: u32,
    pub version: String,
}

impl UserResponse {
    /// String attribute of every record, `None` where absent
    pub fn attribute(&self, name: &str) -> Vec<Option<&str>> {
        self.results
            .iter()
            .map(|r| r.get(name).and_then(Value::as_str))
            .collect()
    }
}
