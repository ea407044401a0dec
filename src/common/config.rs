//! Configuration handling
//!
//! Configuration is an explicit value: pick an environment preset, overlay the
//! TOML file, then `RANDOMUSER_*` environment variables, and hand the result
//! to the components that need it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};
use crate::client::ClientConfig;

/// Named configuration preset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Preset this configuration started from
    #[serde(default)]
    pub environment: Environment,

    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Remote service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base endpoint of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    crate::client::DEFAULT_BASE_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}

/// Partial configuration as read from a file; absent keys keep the preset
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiOverrides,
    #[serde(default)]
    retry: RetryOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct ApiOverrides {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RetryOverrides {
    attempts: Option<u32>,
    base_delay_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::development()
    }
}

impl Config {
    /// Local work against the public service
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Fast-failing settings for automated runs
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            api: ApiConfig {
                timeout_ms: 5_000,
                ..ApiConfig::default()
            },
            retry: RetryConfig {
                attempts: 2,
                base_delay_ms: 100,
            },
        }
    }

    /// Patient settings for scheduled runs
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                timeout_ms: 30_000,
                ..ApiConfig::default()
            },
            retry: RetryConfig {
                attempts: 5,
                base_delay_ms: 2_000,
            },
        }
    }

    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Testing => Self::testing(),
            Environment::Production => Self::production(),
        }
    }

    /// Load configuration for an environment
    ///
    /// Starts from the preset, applies the config file if it exists, then
    /// environment variables.
    pub fn load(env: Environment) -> Result<Self> {
        let mut config = Self::for_environment(env);
        if let Some(path) = config_path() {
            if path.exists() {
                config.merge_file(&path)?;
            }
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from a TOML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        self.merge_toml(&content)
    }

    /// Overlay values from TOML text
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;

        if let Some(base_url) = file.api.base_url {
            self.api.base_url = base_url;
        }
        if let Some(timeout_ms) = file.api.timeout_ms {
            self.api.timeout_ms = timeout_ms;
        }
        if let Some(attempts) = file.retry.attempts {
            self.retry.attempts = attempts;
        }
        if let Some(base_delay_ms) = file.retry.base_delay_ms {
            self.retry.base_delay_ms = base_delay_ms;
        }
        Ok(())
    }

    /// Overlay `RANDOMUSER_*` variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RANDOMUSER_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(value) = lookup("RANDOMUSER_TIMEOUT_MS") {
            self.api.timeout_ms = parse_env("RANDOMUSER_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("RANDOMUSER_RETRY_ATTEMPTS") {
            self.retry.attempts = parse_env("RANDOMUSER_RETRY_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("RANDOMUSER_RETRY_DELAY_MS") {
            self.retry.base_delay_ms = parse_env("RANDOMUSER_RETRY_DELAY_MS", &value)?;
        }
        Ok(())
    }

    /// Build the immutable client configuration
    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::builder()
            .base_url(self.api.base_url.clone())
            .timeout(Duration::from_millis(self.api.timeout_ms))
            .max_attempts(self.retry.attempts)
            .base_delay(Duration::from_millis(self.retry.base_delay_ms))
            .build()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Internal(e.to_string()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{key}='{value}' is invalid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_presets_differ() {
        assert_ne!(Config::development(), Config::testing());
        assert_ne!(Config::testing(), Config::production());
        assert_eq!(Config::production().retry.attempts, 5);
        assert_eq!(Config::for_environment(Environment::Testing), Config::testing());
    }

    #[test]
    fn test_merge_toml_keeps_unset_values() {
        let mut config = Config::testing();
        config
            .merge_toml(
                r#"
[retry]
attempts = 7
"#,
            )
            .unwrap();
        assert_eq!(config.retry.attempts, 7);
        assert_eq!(config.retry.base_delay_ms, 100);
        assert_eq!(config.api.timeout_ms, 5_000);
    }

    #[test]
    fn test_merge_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://localhost:8080/api/\"").unwrap();

        let mut config = Config::development();
        config.merge_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api/");
    }

    #[test]
    fn test_merge_invalid_toml() {
        let mut config = Config::development();
        let err = config.merge_toml("[retry\nattempts = ").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RANDOMUSER_TIMEOUT_MS", "250"),
            ("RANDOMUSER_RETRY_ATTEMPTS", "4"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::development();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.timeout_ms, 250);
        assert_eq!(config.retry.attempts, 4);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::development();
        let err = config
            .apply_env(|key| (key == "RANDOMUSER_RETRY_ATTEMPTS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_client_config_from_preset() {
        let client = Config::production().client_config().unwrap();
        assert_eq!(client.max_attempts(), 5);
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(client.base_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_toml_round_trip_of_preset() {
        let text = Config::testing().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::testing());
    }
}
