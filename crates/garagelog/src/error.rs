//! Error types for garagelog.
//!
//! This module defines all error types used throughout the garagelog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for garagelog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to open or create the store database.
    #[error("failed to open store at {path}: {source}")]
    StoreOpen {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A store operation failed.
    #[error("store operation failed: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Failed to run store migrations.
    #[error("store migration failed: {message}")]
    Migration {
        /// Description of what went wrong.
        message: String,
    },

    /// The store's backing file cannot be read.
    #[error("store file unavailable: {message}")]
    StoreUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Backup Errors ===
    /// The archive is unreadable, not a ZIP container, or lacks the
    /// `backup.json` entry.
    #[error("invalid backup archive {path}: {reason}")]
    InvalidArchive {
        /// Path to the rejected archive.
        path: PathBuf,
        /// Why the archive was rejected.
        reason: String,
    },

    /// The `backup.json` entry is present but not a valid backup document.
    #[error("malformed backup document: {message}")]
    MalformedDocument {
        /// Description of what went wrong.
        message: String,
    },

    /// Writing the backup archive failed.
    #[error("backup archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for garagelog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid-archive error.
    #[must_use]
    pub fn invalid_archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-document error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Create a migration error.
    #[must_use]
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Check if this error rejected an archive as not a valid backup.
    #[must_use]
    pub fn is_invalid_archive(&self) -> bool {
        matches!(self, Self::InvalidArchive { .. })
    }

    /// Check if this error rejected a backup document as malformed.
    #[must_use]
    pub fn is_malformed_document(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}
