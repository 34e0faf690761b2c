use std::path::PathBuf;
use thiserror::Error;

/// Error type for configuration loading and resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A supplied field does not match its expected shape.
    ///
    /// `field` is the path of the offending value (`server.host`,
    /// `build.entry_points[2]`, ...). Resolution fails closed: a malformed
    /// explicit value is never replaced with a default.
    #[error("Invalid config value at `{field}`: {message}")]
    Shape { field: String, message: String },

    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },
}

impl ConfigError {
    #[must_use]
    pub fn shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            field: field.into(),
            message: message.into(),
        }
    }
}
