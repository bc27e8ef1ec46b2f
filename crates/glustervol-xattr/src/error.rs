//! Error types for attribute sources.

use thiserror::Error;

/// Result type alias for attribute source operations.
pub type Result<T> = std::result::Result<T, AttrError>;

/// Error variants raised while fetching or interpreting extended attributes.
#[derive(Debug, Error)]
pub enum AttrError {
    /// The native path does not exist.
    #[error("No such file: {path}")]
    NotFound {
        /// The native path that was queried.
        path: String,
    },

    /// Wraps OS-level failures other than a missing path or missing attribute.
    #[error("I/O error reading attributes of {path}: {source}")]
    Io {
        /// The native path that was queried.
        path: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The native path cannot be handed to the OS (interior NUL byte).
    #[error("Invalid native path: {path:?}")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// The attribute name cannot be handed to the OS.
    #[error("Invalid attribute name: {name:?}")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// An in-memory source could not take its lock.
    #[error("Attribute source internal error: {0}")]
    Internal(String),

    /// The pathinfo attribute was present but could not be parsed.
    #[error("Malformed pathinfo at byte {position}: {reason}")]
    Malformed {
        /// Byte offset in the attribute value where parsing stopped.
        position: usize,
        /// Description of what was expected.
        reason: String,
    },
}

impl AttrError {
    /// Classifies an OS error for `path`, mapping `ENOENT` to [`AttrError::NotFound`].
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            AttrError::NotFound {
                path: path.to_string(),
            }
        } else {
            AttrError::Io {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// Returns true for the distinguished not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AttrError::NotFound { .. })
    }
}
