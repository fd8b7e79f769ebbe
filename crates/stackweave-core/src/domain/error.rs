// ============================================================================
// domain/error.rs - SYNTHESIS ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (results are compared in tests and re-reported by the CLI)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
///
/// None of them is retryable: every failure here means the inputs or the
/// deploy order must be corrected before synthesis is run again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("required input '{variable}' is missing or blank")]
    MissingInput { variable: String },

    #[error("input '{variable}' is invalid: {reason}")]
    InvalidInput { variable: String, reason: String },

    #[error("unknown deployment stage: {0}")]
    UnknownStage(String),

    #[error(
        "rolling update bounds rejected: min healthy {min_healthy}% and max {max_percent}% \
         must satisfy 0 <= min <= 100 <= max"
    )]
    InvalidRollingBounds { min_healthy: u32, max_percent: u32 },

    // ========================================================================
    // Contract Errors
    // ========================================================================
    #[error("missing contract: parameter '{parameter}' was never published by the {family} stack")]
    MissingContract { parameter: String, family: String },

    #[error("parameter '{parameter}' holds the wrong shape (expected {expected})")]
    ContractShapeMismatch {
        parameter: String,
        expected: &'static str,
    },

    // ========================================================================
    // Topology Errors
    // ========================================================================
    #[error("stack dependency cycle detected involving: {}", stacks.join(", "))]
    DependencyCycle { stacks: Vec<String> },
}

impl DomainError {
    /// Shorthand for [`DomainError::MissingInput`].
    pub fn missing_input(variable: impl Into<String>) -> Self {
        Self::MissingInput {
            variable: variable.into(),
        }
    }

    /// Shorthand for [`DomainError::InvalidInput`].
    pub fn invalid_input(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            variable: variable.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingInput { variable } => vec![
                format!("Provide '{variable}' before synthesizing"),
                format!("Try: stackweave deploy <stack> --input {variable}=<value>"),
                "Or set it under [inputs] in the configuration file".into(),
            ],
            Self::UnknownStage(stage) => vec![
                format!("'{stage}' is not a deployment stage"),
                "Supported stages: dev, staging, prod".into(),
            ],
            Self::InvalidRollingBounds { .. } => vec![
                "min_healthy_percent must be between 0 and 100".into(),
                "max_percent must be at least 100".into(),
            ],
            Self::MissingContract { family, .. } => vec![
                format!("Deploy the {family} stack before this one"),
                "Try: stackweave plan to see the deployment order".into(),
                "Check the parameter key scheme matches the producer's".into(),
            ],
            Self::DependencyCycle { .. } => vec![
                "Stack reads must form a directed acyclic graph".into(),
                "This is a bug in the stack topology, please report it".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingInput { .. }
            | Self::UnknownStage(_)
            | Self::InvalidRollingBounds { .. } => ErrorCategory::Configuration,
            Self::InvalidInput { .. } => ErrorCategory::Validation,
            Self::MissingContract { .. } | Self::ContractShapeMismatch { .. } => {
                ErrorCategory::Contract
            }
            Self::DependencyCycle { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Contract,
    Internal,
}
