//! Application layer errors.
//!
//! These are failures of the machinery around synthesis: the parameter
//! store, the manifest sink and secret generation. Input and contract
//! problems are [`DomainError`](crate::domain::DomainError)s.

use thiserror::Error;

use crate::error::ErrorCategory;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The parameter store rejected or failed an operation.
    #[error("parameter store {operation} failed for '{parameter}': {reason}")]
    StoreError {
        operation: &'static str,
        parameter: String,
        reason: String,
    },

    /// Store access failed (lock poisoned).
    #[error("parameter store lock is poisoned")]
    StoreLockError,

    /// The rendered manifest could not be handed over.
    #[error("failed to write manifest for stack '{stack}': {reason}")]
    ManifestWriteFailed { stack: String, reason: String },

    /// No secret satisfying the policy could be produced.
    #[error("secret generation failed: {reason}")]
    SecretGenerationFailed { reason: String },
}

impl ApplicationError {
    pub fn store(operation: &'static str, parameter: impl Into<String>, reason: impl ToString) -> Self {
        Self::StoreError {
            operation,
            parameter: parameter.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StoreError { parameter, .. } => vec![
                format!("Failed to access parameter: {parameter}"),
                "Check the [store] path in your configuration and its permissions".into(),
            ],
            Self::StoreLockError => vec![
                "Another operation panicked while holding the store".into(),
                "Try again".into(),
            ],
            Self::ManifestWriteFailed { .. } => vec![
                "Check that the manifest directory is writable".into(),
                "Set [output] manifest_dir to another location".into(),
            ],
            Self::SecretGenerationFailed { .. } => {
                vec!["The password policy may exclude every available character".into()]
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StoreError { .. }
            | Self::StoreLockError
            | Self::ManifestWriteFailed { .. }
            | Self::SecretGenerationFailed { .. } => ErrorCategory::Internal,
        }
    }
}
