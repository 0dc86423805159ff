//! Configuration module
//!
//! Handles loading and managing client configuration.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::http::DEFAULT_TIMEOUT_SECS;
use env::EnvConfig;

/// File name searched for in the working directory
const LOCAL_CONFIG_FILE: &str = "mapi-client.yaml";

/// Client configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapiConfig {
    /// Management API URL
    pub api_url: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Static credential used for requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MapiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://localhost:8443".to_string(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
            auth: None,
        }
    }
}

/// Credential configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authorization scheme
    #[serde(default = "default_authorization_type")]
    pub authorization_type: String,

    pub id_token: String,

    /// Expiry in seconds since the Unix epoch
    pub expires_at: i64,
}

fn default_authorization_type() -> String {
    "Bearer".to_string()
}

impl MapiConfig {
    /// Standard configuration file locations, in order of precedence
    pub fn locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("mapi-client").join("config.yaml"));
        }
        locations
    }

    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        Self::locations().into_iter().find(|path| path.exists())
    }

    /// Load configuration from the default location, or defaults, with
    /// `MAPI_*` environment overrides applied
    pub fn load_default() -> Result<Self> {
        Self::load_layered(Self::find(), &EnvConfig::load())
    }

    /// Load `path` (or defaults when `None`) and layer `env` on top
    pub fn load_layered(path: Option<PathBuf>, env: &EnvConfig) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        let config = config.apply_env(env);
        config
            .validate()
            .context("Invalid configuration after environment overrides")?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url must not be empty");
        }

        url::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid api_url: {}", self.api_url))?;

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Layer environment overrides on top of this configuration
    pub fn apply_env(mut self, env: &EnvConfig) -> Self {
        if let Some(api_url) = &env.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(token) = &env.token {
            let auth = self.auth.get_or_insert_with(|| AuthConfig {
                authorization_type: default_authorization_type(),
                id_token: String::new(),
                expires_at: i64::MAX,
            });
            auth.id_token = token.clone();
        }
        if let Some(auth) = self.auth.as_mut() {
            if let Some(token_type) = &env.token_type {
                auth.authorization_type = token_type.clone();
            }
            if let Some(expires_at) = env.token_expires_at {
                auth.expires_at = expires_at;
            }
        }
        self
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = MapiConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.log_level, "info");
        assert!(config.auth.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = MapiConfig {
            api_url: "https://api.example.com".to_string(),
            auth: Some(AuthConfig {
                authorization_type: "Bearer".to_string(),
                id_token: "abc".to_string(),
                expires_at: 1_700_000_000,
            }),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = MapiConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_json_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_url": "https://api.example.com", "auth": {"id_token": "t", "expires_at": 5}}"#,
        )
        .unwrap();

        let loaded = MapiConfig::load(&path).unwrap();
        assert_eq!(loaded.timeout_secs, 10);
        assert_eq!(loaded.auth.unwrap().authorization_type, "Bearer");
    }

    #[test]
    fn test_validate() {
        let empty = MapiConfig {
            api_url: String::new(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let invalid = MapiConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        let no_timeout = MapiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(no_timeout.validate().is_err());
    }

    #[test]
    fn test_apply_env() {
        let env = EnvConfig {
            api_url: Some("https://env.example.com".to_string()),
            timeout: Some(30),
            token: Some("env-token".to_string()),
            ..Default::default()
        };

        let config = MapiConfig::default().apply_env(&env);
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.timeout_secs, 30);

        let auth = config.auth.unwrap();
        assert_eq!(auth.id_token, "env-token");
        assert_eq!(auth.authorization_type, "Bearer");
        assert_eq!(auth.expires_at, i64::MAX);
    }

    #[test]
    fn test_load_layered_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "api_url: https://file.example.com\nlog_level: debug\nauth:\n  id_token: file-token\n  expires_at: 100\n",
        )
        .unwrap();

        let env = EnvConfig {
            api_url: Some("https://env.example.com".to_string()),
            token_type: Some("Basic".to_string()),
            token_expires_at: Some(200),
            ..Default::default()
        };

        let config = MapiConfig::load_layered(Some(path), &env).unwrap();
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.log_level, "debug");

        let auth = config.auth.unwrap();
        assert_eq!(auth.id_token, "file-token");
        assert_eq!(auth.authorization_type, "Basic");
        assert_eq!(auth.expires_at, 200);
    }

    #[test]
    fn test_load_layered_without_file() {
        let env = EnvConfig {
            timeout: Some(3),
            ..Default::default()
        };

        let config = MapiConfig::load_layered(None, &env).unwrap();
        assert_eq!(config.api_url, MapiConfig::default().api_url);
        assert_eq!(config.timeout_secs, 3);

        let invalid = EnvConfig {
            api_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(MapiConfig::load_layered(None, &invalid).is_err());
    }

    #[test]
    fn test_apply_env_without_token_keeps_auth_absent() {
        let env = EnvConfig {
            token_type: Some("Basic".to_string()),
            ..Default::default()
        };

        let config = MapiConfig::default().apply_env(&env);
        assert!(config.auth.is_none());
    }
}
