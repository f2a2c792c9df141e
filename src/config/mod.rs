//! Service configuration
//!
//! Precedence, lowest first: built-in defaults, a TOML file, `CHURN_*`
//! environment variables, command line flags.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ChurnError, ErrorCode, Result};

pub mod loader;

pub use loader::ConfigLoader;

pub const ENV_LISTEN_ADDR: &str = "CHURN_LISTEN_ADDR";
pub const ENV_MODEL_PATH: &str = "CHURN_MODEL_PATH";
pub const ENV_FEATURES_PATH: &str = "CHURN_FEATURES_PATH";
pub const ENV_LOG_LEVEL: &str = "CHURN_LOG_LEVEL";
pub const ENV_CORS: &str = "CHURN_CORS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub listen_addr: String,
    pub model_path: PathBuf,
    pub features_path: PathBuf,
    pub log_level: String,
    pub cors: bool,
    /// Timeout used by the bundled client when calling a running server
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            model_path: PathBuf::from("churn_model.json"),
            features_path: PathBuf::from("model_features.json"),
            log_level: "info".to_string(),
            cors: true,
            request_timeout_secs: 10,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<String>,
    pub model_path: Option<PathBuf>,
    pub features_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub no_cors: bool,
}

impl ServiceConfig {
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    /// Apply `CHURN_*` values from `lookup`.
    pub fn merge_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = addr;
        }

        if let Some(path) = lookup(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(path);
        }

        if let Some(path) = lookup(ENV_FEATURES_PATH) {
            self.features_path = PathBuf::from(path);
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        if let Some(cors) = lookup(ENV_CORS) {
            self.cors = parse_flag(&cors).ok_or_else(|| {
                ChurnError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("{} must be true or false, got {:?}", ENV_CORS, cors),
                )
            })?;
        }

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(addr) = &overrides.listen_addr {
            self.listen_addr = addr.clone();
        }
        if let Some(path) = &overrides.model_path {
            self.model_path = path.clone();
        }
        if let Some(path) = &overrides.features_path {
            self.features_path = path.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        if overrides.no_cors {
            self.cors = false;
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            ChurnError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("invalid listen address {:?}", self.listen_addr),
            )
            .with_source(e)
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        for (name, path) in [
            ("model_path", &self.model_path),
            ("features_path", &self.features_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ChurnError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("{} must not be empty", name),
                ));
            }
        }

        if self.log_level.trim().is_empty() {
            return Err(ChurnError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "log_level must not be empty",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ChurnError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "request_timeout_secs must be positive",
            ));
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
