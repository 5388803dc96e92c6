//! Configuration loading errors.

use std::path::PathBuf;

use crate::error::MapError;

/// Failure to turn a config file into a runtime configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigLoadError {
    /// File could not be read
    #[error("Failed to read {}: {message}", path.display())]
    Io {
        /// File that was attempted
        path: PathBuf,
        /// Underlying I/O error
        message: String,
    },

    /// YAML is malformed or has the wrong shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// YAML parsed but describes an unusable grid or thresholds
    #[error(transparent)]
    Invalid(#[from] MapError),
}
