//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "MAPI";

/// Configuration read from `MAPI_*` environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// API URL from MAPI_API_URL
    pub api_url: Option<String>,
    /// Timeout from MAPI_TIMEOUT
    pub timeout: Option<u64>,
    /// Log level from MAPI_LOG_LEVEL
    pub log_level: Option<String>,
    /// Credential from MAPI_TOKEN
    pub token: Option<String>,
    /// Authorization scheme from MAPI_TOKEN_TYPE
    pub token_type: Option<String>,
    /// Credential expiry from MAPI_TOKEN_EXPIRES_AT
    pub token_expires_at: Option<i64>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            api_url: get_env("API_URL"),
            timeout: get_env_parse("TIMEOUT"),
            log_level: get_env("LOG_LEVEL"),
            token: get_env("TOKEN"),
            token_type: get_env("TOKEN_TYPE"),
            token_expires_at: get_env_parse("TOKEN_EXPIRES_AT"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.api_url.is_some()
            || self.timeout.is_some()
            || self.log_level.is_some()
            || self.token.is_some()
            || self.token_type.is_some()
            || self.token_expires_at.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Builder for setting environment variables (useful for testing)
#[derive(Default)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    pub fn api_url(self, url: impl Into<String>) -> Self {
        self.var("API_URL", url)
    }

    pub fn timeout(self, timeout: u64) -> Self {
        self.var("TIMEOUT", timeout.to_string())
    }

    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.var("LOG_LEVEL", level)
    }

    pub fn token(self, token: impl Into<String>) -> Self {
        self.var("TOKEN", token)
    }

    pub fn token_type(self, token_type: impl Into<String>) -> Self {
        self.var("TOKEN_TYPE", token_type)
    }

    pub fn token_expires_at(self, expires_at: i64) -> Self {
        self.var("TOKEN_EXPIRES_AT", expires_at.to_string())
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.api_url.is_none());
        assert!(!config.has_any());
    }

    // Single test touching the process environment, so parallel tests
    // never observe each other's variables.
    #[test]
    fn test_env_builder_roundtrip() {
        {
            let _guard = EnvBuilder::new()
                .api_url("https://env.example.com")
                .timeout(45)
                .log_level("debug")
                .token("secret")
                .token_type("Basic")
                .token_expires_at(1_700_000_000)
                .apply_scoped();

            let config = EnvConfig::load();
            assert_eq!(config.api_url.as_deref(), Some("https://env.example.com"));
            assert_eq!(config.timeout, Some(45));
            assert_eq!(config.log_level.as_deref(), Some("debug"));
            assert_eq!(config.token.as_deref(), Some("secret"));
            assert_eq!(config.token_type.as_deref(), Some("Basic"));
            assert_eq!(config.token_expires_at, Some(1_700_000_000));
            assert!(config.has_any());
        }

        assert!(env::var("MAPI_TOKEN").is_err());
        assert!(env::var("MAPI_TOKEN_TYPE").is_err());
    }
}
