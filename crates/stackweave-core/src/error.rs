//! Unified error handling for Stackweave Core.
//!
//! Wraps domain and application errors behind one type so the entry point
//! can report suggestions and pick an exit code from a single category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stackweave Core operations.
#[derive(Debug, Error, Clone)]
pub enum StackweaveError {
    /// Errors from the domain layer (bad inputs, broken contracts).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (adapters, orchestration).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StackweaveError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Run `stackweave config list` to inspect the effective settings".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Stackweave".into()],
        }
    }

    /// Get error category for display and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::Contract => ErrorCategory::Contract,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether running the same command again could succeed unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StoreLockError))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Contract,
    Internal,
}

/// Convenient result type alias.
pub type StackweaveResult<T> = Result<T, StackweaveError>;

/// Extension trait for adding context to foreign errors.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> StackweaveResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> StackweaveResult<T> {
        self.map_err(|e| StackweaveError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_carry_through() {
        let err: StackweaveError = DomainError::MissingContract {
            parameter: "dev-network-vpcId".into(),
            family: "network".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Contract);
        assert!(err.to_string().contains("dev-network-vpcId"));

        let err: StackweaveError = DomainError::missing_input("stage").into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn only_lock_contention_is_retryable() {
        assert!(StackweaveError::from(ApplicationError::StoreLockError).is_retryable());
        assert!(!StackweaveError::from(DomainError::missing_input("stage")).is_retryable());
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let parsed: Result<u32, _> = "x".parse::<u32>();
        let err = parsed.context("reading port").unwrap_err();
        assert!(matches!(err, StackweaveError::Internal { ref message } if message.starts_with("reading port")));
    }
}
