//! # Presentation Error Types
//!
//! Everything fallible here happens at startup: reading and validating
//! configuration, parsing probe arguments. The per-frame path is infallible.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up presentation.
#[derive(Error, Debug)]
pub enum PresentationError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A config value cannot be clamped into range (NaN, infinity).
    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Command-line argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for presentation setup.
pub type PresentationResult<T> = Result<T, PresentationError>;
