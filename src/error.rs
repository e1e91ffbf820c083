//! Error types for the code model.

use std::path::PathBuf;

/// Errors raised by the code model and its loaders.
///
/// Structural misuse that a parser working on partial input can trigger
/// (removing an absent member, unknown reference names) is not an error.
#[derive(Debug, thiserror::Error)]
pub enum DependError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("Unsupported declaration format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DependError>;

impl DependError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
