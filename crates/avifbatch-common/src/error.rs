//! Error types shared across avifbatch.
//!
//! Only failures that abort a whole run live here. Per-file conversion
//! failures are recorded in the run report and never surface as [`Error`].

use std::path::PathBuf;

/// Fatal error type for avifbatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input directory is missing or cannot be listed.
    #[error("Input directory not found: {}: {source}", path.display())]
    DirectoryNotFound {
        /// The directory that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O operation outside a conversion task failed.
    #[error("IO error: {context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new DirectoryNotFound error.
    pub fn directory_not_found<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::DirectoryNotFound {
            path: path.into(),
            source,
        }
    }

    /// Create a new InvalidConfig error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new Io error with a description of the failed operation.
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
