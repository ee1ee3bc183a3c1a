//! Error types for two-hop link discovery.
//!
//! All host and configuration failures are represented by the [`Error`] enum.
//! The aggregation engine and the preview extractor never surface these to
//! their callers; they degrade the affected entity instead.

use std::io;
use thiserror::Error as ThisError;

/// The core error type for vault host operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Document not found in the vault
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Invalid vault-relative path
    #[error("Invalid file path: {reason}")]
    InvalidPath { reason: String },

    /// File too large for processing
    #[error("File too large ({size} bytes, max {max} bytes): {path}")]
    FileTooLarge { path: String, size: u64, max: u64 },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create an invalid path error
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Create a file too large error
    pub fn file_too_large(path: impl Into<String>, size: u64, max: u64) -> Self {
        Error::FileTooLarge {
            path: path.into(),
            size,
            max,
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::file_not_found("notes/missing.md");
        assert!(err.to_string().contains("File not found"));
        assert!(err.to_string().contains("notes/missing.md"));

        let err = Error::file_too_large("big.md", 2_000_000, 1_000_000);
        assert!(err.to_string().contains("2000000 bytes"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
