//! Validation Errors
//!
//! Failure modes shared by the engine, the host layer and settings loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while wiring or evaluating form validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The markup lacks the `#<id>-error` element a validated field needs
    #[error("no error element '#{field_id}-error' for field '{field_id}'")]
    MissingErrorElement { field_id: String },
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("setting '{0}' must be a non-empty string")]
    MissingSetting(&'static str),
    /// The host document refused an operation
    #[error("host error: {0}")]
    Host(String),
}

/// Errors raised while loading a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
