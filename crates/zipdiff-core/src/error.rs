//! Unified error handling for zipdiff
//!
//! This module provides the error type shared by the comparison engine and
//! the command line tool. Format-level failures stay in the parser crate and
//! are folded into [`Error::LoadFailure`] at archive granularity.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error carried across crate boundaries
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for all zipdiff operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Load Errors ====================

    /// An archive could not be opened, parsed, or one of its members
    /// could not be read. The archive contributes no entries.
    #[error("Failed to load archive {archive}: {source}")]
    LoadFailure {
        archive: PathBuf,
        #[source]
        source: BoxedSource,
    },

    /// Every supplied archive failed to load
    #[error("No archive could be loaded ({failed} failed)")]
    NothingLoaded {
        failed: usize,
    },

    // ==================== Data Errors ====================

    /// Invalid data structure
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wrap any error as a load failure for `archive`
    pub fn load_failure<E>(archive: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        Error::LoadFailure {
            archive: archive.into(),
            source: source.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Check if this is a load failure, looking through context wrappers
    pub fn is_load_failure(&self) -> bool {
        match self {
            Error::LoadFailure { .. } => true,
            Error::WithContext { source, .. } => source.is_load_failure(),
            _ => false,
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileNotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
