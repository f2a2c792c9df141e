use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for churn-serve.
///
/// Request rejections (bad field values, violated business rules) are not
/// represented here; see [`crate::validation::ValidationErrors`].
#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Failed to load artifact: {message}")]
    ArtifactLoad {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Feature schema alignment fault: {message}")]
    SchemaAlignment { code: u16, message: String },

    #[error("[E{code:04}] Scoring fault: {message}")]
    Scoring { code: u16, message: String },

    #[error("[E{code:04}] Client error: {message}")]
    Client {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ChurnError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an artifact loading error for the given file
    pub fn artifact(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ArtifactLoad {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn alignment(code: u16, message: impl Into<String>) -> Self {
        Self::SchemaAlignment {
            code,
            message: message.into(),
        }
    }

    pub fn scoring(code: u16, message: impl Into<String>) -> Self {
        Self::Scoring {
            code,
            message: message.into(),
        }
    }

    pub fn client(code: u16, message: impl Into<String>) -> Self {
        Self::Client {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a source slot are returned unchanged.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::ArtifactLoad { source: src, .. }
            | Self::Client { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::SchemaAlignment { .. } | Self::Scoring { .. } => {}
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ArtifactLoad { .. } => 2,
            Self::Config { .. } => 3,
            Self::SchemaAlignment { .. } | Self::Scoring { .. } => 4,
            Self::Client { .. } => 5,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::ArtifactLoad { code, .. }
            | Self::SchemaAlignment { code, .. }
            | Self::Scoring { code, .. }
            | Self::Client { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::ArtifactLoad { message, path, .. } => match path {
                Some(p) => format!("Cannot load {}: {}", p.display(), message),
                None => format!("Cannot load model artifacts: {}", message),
            },
            Self::SchemaAlignment { .. } | Self::Scoring { .. } => {
                "Internal error while scoring the request".to_string()
            }
            Self::Client { code, message, .. } => {
                if *code == ErrorCode::CLIENT_CONNECTION {
                    "Backend API is not running. Start the server first.".to_string()
                } else {
                    message.clone()
                }
            }
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Faults that indicate a defect or a broken deployment rather than bad input
    pub fn is_internal_fault(&self) -> bool {
        matches!(
            self,
            Self::SchemaAlignment { .. } | Self::Scoring { .. } | Self::ArtifactLoad { .. }
        )
    }
}

impl From<std::io::Error> for ChurnError {
    fn from(err: std::io::Error) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_IO,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for ChurnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_JSON,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for ChurnError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_INVALID_TOML,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Type alias for Results using ChurnError
pub type Result<T> = std::result::Result<T, ChurnError>;
