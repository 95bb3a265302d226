//! Error types shared by the tooling
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Errors reading or writing colon-delimited credential and seed files
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CredentialError {
    #[error("Credential file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Missing header row in {path}")]
    MissingHeader { path: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

impl CredentialError {
    /// Path of the file the error refers to
    pub fn path(&self) -> &str {
        match self {
            CredentialError::NotFound { path }
            | CredentialError::Read { path, .. }
            | CredentialError::MissingHeader { path }
            | CredentialError::Write { path, .. } => path,
        }
    }
}
