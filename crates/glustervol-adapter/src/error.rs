//! Error types for the volume adapter.

use glustervol_xattr::AttrError;
use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, VolumeError>;

/// Error variants surfaced to callers of the adapter.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// The path does not exist. Every operation reports a missing path this way.
    #[error("File {path} does not exist")]
    NotFound {
        /// The path as the caller named it.
        path: String,
    },

    /// Unexpected OS failure, passed through unchanged.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The native path being accessed.
        path: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Unexpected attribute source failure, passed through unchanged.
    #[error("Attribute source error: {0}")]
    Attribute(AttrError),

    /// Configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// What is wrong with the configuration.
        reason: String,
    },
}

impl VolumeError {
    /// Wraps an OS error on `path`, keeping a missing path distinguishable.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VolumeError::NotFound {
                path: path.to_string(),
            }
        } else {
            VolumeError::Io {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// Returns true for the distinguished not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VolumeError::NotFound { .. })
    }
}

impl From<AttrError> for VolumeError {
    fn from(err: AttrError) -> Self {
        match err {
            AttrError::NotFound { path } => VolumeError::NotFound { path },
            other => VolumeError::Attribute(other),
        }
    }
}
