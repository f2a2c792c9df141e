use super::ServiceConfig;
use crate::error::{ChurnError, ErrorCode, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves the file layer and the environment layer of [`ServiceConfig`]
pub struct ConfigLoader {
    default_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            default_path: Self::project_config_path(),
        }
    }

    /// Use `path` instead of the per-user config location.
    pub fn with_default_path(path: Option<PathBuf>) -> Self {
        Self { default_path: path }
    }

    /// `<config dir>/config.toml` for this project, when a home directory exists
    pub fn project_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "churn-serve", "churn-serve")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn load_file(path: &Path) -> Result<ServiceConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::CONFIG_NOT_FOUND
            } else {
                ErrorCode::CONFIG_GENERIC
            };
            ChurnError::config_with_code(code, format!("cannot read {}", path.display()))
                .with_source(e)
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load defaults, then the file layer, without the environment.
    ///
    /// An explicit path must exist. The per-user file is optional.
    pub fn load_without_env(&self, explicit: Option<&Path>) -> Result<ServiceConfig> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading configuration file");
            return Self::load_file(path);
        }

        match &self.default_path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading user configuration file");
                Self::load_file(path)
            }
            _ => Ok(ServiceConfig::default()),
        }
    }

    pub fn load(&self, explicit: Option<&Path>) -> Result<ServiceConfig> {
        let mut config = self.load_without_env(explicit)?;
        config.merge_env_vars()?;
        Ok(config)
    }
}
