//! Error types for ragrank operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all ragrank crates. Uses `thiserror` for derive macros.
//!
//! Operations that the retrieval path is allowed to degrade from (an
//! uninitialized lexical index, a failing vector provider) get their own
//! variants so callers can branch on them instead of string-matching.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in ragrank operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {message}")]
    IoWithPath {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named resource does not exist.
    #[error("{resource_type} not found: {id}")]
    NotFound {
        /// Kind of resource (e.g. "Document", "Corpus file").
        resource_type: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A component was used before it was initialized.
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    /// A vector search or embedding provider failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a not-initialized error for the named component.
    pub fn not_initialized(component: impl Into<String>) -> Self {
        Self::NotInitialized(component.into())
    }

    /// Create a provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a generic operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(err: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Whether this error means a component has not been initialized yet.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized(_))
    }

    /// Whether this error came from an upstream provider.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// Result type alias using ragrank's Error type.
pub type Result<T> = std::result::Result<T, Error>;
