//! Error handling for the Stackweave CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;
use std::path::Path;

use owo_colors::OwoColorize;
use thiserror::Error;

use stackweave_core::error::StackweaveError;

pub use stackweave_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An `--input` or `[inputs]` key that names no deployment input.
    #[error("Unknown input '{name}'")]
    UnknownInput { name: String },

    /// `params get` on a name the store has never seen.
    #[error("Parameter '{name}' has not been published")]
    ParameterNotFound { name: String },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// Wrapped so the CLI can lean on the core error's own suggestions and
    /// category.
    #[error("{0}")]
    Core(#[from] StackweaveError),

    // ── System errors ──────────────────────────────────────────────────────
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// `deploy-all` was declined at the prompt.
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownInput { name } => vec![
                format!("'{name}' is not a deployment input"),
                "Known inputs include: stage, application_name, account_id, region, image_tag"
                    .into(),
                "Example: stackweave deploy network -i stage=dev".into(),
            ],

            Self::ParameterNotFound { name } => vec![
                format!("Nothing has published '{name}' yet"),
                "List expected parameters: stackweave params list".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                format!("Check your config file at {}", crate::config::AppConfig::config_path().display()),
                "Use 'stackweave init' to create a default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],

            Self::Cancelled => vec!["No stacks were deployed".into()],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownInput { .. } => ErrorCategory::UserError,
            Self::ParameterNotFound { .. } => ErrorCategory::Contract,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::Contract => ErrorCategory::Contract,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Cancelled => ErrorCategory::UserError,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Contract      |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::Contract => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::Contract => tracing::warn!("Contract error: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments or inputs.
    UserError,
    /// A stack read a contract nobody published.
    Contract,
    Configuration,
    Internal,
}

/// Attach a context message to foreign errors at call-sites.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, serde_json::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}

/// Where a file-producing command tried to write.
pub fn write_failed(path: &Path, source: std::io::Error) -> CliError {
    CliError::IoError {
        message: format!("failed to write '{}'", path.display()),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackweave_core::domain::DomainError;
    use std::io;

    fn missing_contract() -> CliError {
        CliError::Core(
            DomainError::MissingContract {
                parameter: "dev-network-vpcId".into(),
                family: "network".into(),
            }
            .into(),
        )
    }

    #[test]
    fn missing_contract_exits_with_three() {
        assert_eq!(missing_contract().exit_code(), 3);
        assert!(missing_contract().suggestions().iter().any(|s| s.contains("network")));
    }

    #[test]
    fn missing_input_is_a_configuration_error() {
        let err = CliError::Core(DomainError::MissingInput { variable: "stage".into() }.into());
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn unknown_input_is_a_user_error() {
        let err = CliError::UnknownInput { name: "colour".into() };
        assert_eq!(err.exit_code(), 2);
        assert!(err.suggestions().iter().any(|s| s.contains("stage")));
    }

    #[test]
    fn io_failures_are_internal() {
        let err = CliError::IoError {
            message: "x".into(),
            source: io::Error::new(io::ErrorKind::Other, "e"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn format_plain_lists_suggestions() {
        let s = missing_contract().format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        assert!(!CliError::Cancelled.format_plain(true).contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading manifest");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
