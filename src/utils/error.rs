//! Error handling for the preview surfaces
//!
//! `validate` and `convert` never fail. This error type covers the outer
//! layers: configuration loading, file I/O, JSON output and the compile gate.

use std::fmt;

/// Preview error type
#[derive(Debug, Clone)]
pub enum PreviewError {
    /// Configuration file could not be parsed
    InvalidConfig {
        message: String,
        path: Option<String>,
    },
    /// IO error (for file operations)
    IoError { message: String },
    /// Output could not be serialized
    SerializationError { message: String },
    /// Compilation refused because the source has structural errors
    CompileBlocked { errors: usize },
    /// Compilation needs confirmation because the source has warnings
    NeedsConfirmation { warnings: usize },
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::InvalidConfig { message, path } => {
                if let Some(p) = path {
                    write!(f, "Invalid config in {}: {}", p, message)
                } else {
                    write!(f, "Invalid config: {}", message)
                }
            }
            PreviewError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            PreviewError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            PreviewError::CompileBlocked { errors } => {
                write!(
                    f,
                    "Compilation blocked: {} structural error(s) must be fixed first",
                    errors
                )
            }
            PreviewError::NeedsConfirmation { warnings } => {
                write!(
                    f,
                    "Compilation needs confirmation: {} warning(s) reported",
                    warnings
                )
            }
        }
    }
}

impl std::error::Error for PreviewError {}

impl From<std::io::Error> for PreviewError {
    fn from(err: std::io::Error) -> Self {
        PreviewError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(err: serde_json::Error) -> Self {
        PreviewError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PreviewError {
    fn from(err: toml::de::Error) -> Self {
        PreviewError::InvalidConfig {
            message: err.message().to_string(),
            path: None,
        }
    }
}

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

// Convenience constructors for errors
impl PreviewError {
    pub fn config(message: impl Into<String>) -> Self {
        PreviewError::InvalidConfig {
            message: message.into(),
            path: None,
        }
    }

    /// Attach a file path to a configuration error.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        match self {
            PreviewError::InvalidConfig { message, .. } => PreviewError::InvalidConfig {
                message,
                path: Some(path.into()),
            },
            other => other,
        }
    }
}
