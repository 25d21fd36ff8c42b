//! Server configuration
//!
//! Loaded from the TOML file named by `FORMCRAFT_CONFIG` when set, then
//! overridden from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use formcraft_forms::application::commands::DEFAULT_CASCADE_ATTEMPTS;

/// Names the TOML config file
pub const CONFIG_PATH_ENV: &str = "FORMCRAFT_CONFIG";
pub const BIND_ADDR_ENV: &str = "FORMCRAFT_BIND_ADDR";
pub const JWT_SECRET_ENV: &str = "FORMCRAFT_JWT_SECRET";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Secret used when none is configured. Only fit for local development.
pub const DEV_JWT_SECRET: &str = "formcraft-dev-secret-change-in-production";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Attempts at removing a deleted form's responses
    pub cascade_delete_attempts: u32,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            jwt_secret: DEV_JWT_SECRET.into(),
            cascade_delete_attempts: DEFAULT_CASCADE_ATTEMPTS,
            log_filter: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
        if let Some(secret) = lookup(JWT_SECRET_ENV) {
            self.jwt_secret = secret;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr is empty".into()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("jwt_secret is empty".into()));
        }
        if self.cascade_delete_attempts == 0 {
            return Err(ConfigError::Invalid("cascade_delete_attempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
