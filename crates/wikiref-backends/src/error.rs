//! Error types for backend configuration and registry lookups.
//!
//! Grammar failures use [`wikiref_types::ReferenceError`]; the errors here
//! only concern turning configuration into a usable syntax.

use thiserror::Error;

use crate::registry::BackendKind;

/// Errors that can occur while loading configuration or resolving a syntax.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("storage root template must contain {{username}}: {0}")]
    MissingUserPlaceholder(String),

    #[error("no [{0}] section configured")]
    MissingSection(&'static str),

    #[error("{0} backend requires an authenticated user")]
    MissingIdentity(BackendKind),

    #[error("invalid user name: {0:?}")]
    InvalidIdentity(String),

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
