//! Error types and exit codes for symweave

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for symweave operations
#[derive(Error, Debug)]
pub enum SymweaveError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Malformed symbol document: {message}")]
    Xml { message: String },

    #[error("Cannot derive key: {message}")]
    Signature { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Id space exhausted: {message}")]
    IdExhausted { message: String },

    #[error("Invalid request file: {message}")]
    Request { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymweaveError {
    /// Convert error to the CLI exit code:
    /// - 0: Success
    /// - 1: File not found / IO error
    /// - 2: Malformed symbol document / no ids left to generate
    /// - 3: Invalid request or element signature
    /// - 4: Configuration error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::Xml { .. } => ExitCode::from(2),
            Self::IdExhausted { .. } => ExitCode::from(2),
            Self::Signature { .. } => ExitCode::from(3),
            Self::Request { .. } => ExitCode::from(3),
            Self::Config { .. } => ExitCode::from(4),
            Self::Io(_) => ExitCode::from(1),
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}

/// Result type alias for symweave operations
pub type Result<T> = std::result::Result<T, SymweaveError>;
