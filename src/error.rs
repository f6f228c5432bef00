//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration problem with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"output.max_points"` or `"calendarRules[2].months"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to load a cycle config or engine settings from disk or text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid cycle config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A granularity name other than `day`, `month` or `year`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown granularity \"{0}\", expected day, month or year")]
pub struct ParseGranularityError(pub String);

/// An entity referenced by id is absent from the cycle config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("sub-cycle \"{0}\" does not exist")]
    SubCycle(String),

    #[error("drive cycle \"{0}\" does not exist")]
    DriveCycle(String),
}
