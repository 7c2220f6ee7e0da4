//! Error handling for depgather
//!
//! The gather core reports failures through [`GatherError`]. The variants map one-to-one
//! onto the ways a gather run can end without a result:
//!
//! - [`GatherError::PackageNotFound`] - a primary target was not found on any primary source
//! - [`GatherError::Cancelled`] - the caller's cancellation token fired
//! - [`GatherError::Query`] - a source's dependency query failed; the upstream error is
//!   carried through untouched (`Display` and `source()` are the upstream error's own)
//!
//! Configuration and feed loading add [`GatherError::Config`] and
//! [`GatherError::InvalidTarget`]. These are never raised by the gather algorithm itself.
//!
//! # User-Facing Errors
//!
//! The binary converts failures into an [`ErrorContext`] through [`user_friendly_error`],
//! which adds details and a suggestion where one applies:
//!
//! ```rust,no_run
//! use depgather::core::{GatherError, user_friendly_error};
//!
//! let error = GatherError::PackageNotFound {
//!     target: "Contoso.Utils".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Prints colored error, details and suggestion to stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The error type for gather runs and their supporting layers.
#[derive(Error, Debug)]
pub enum GatherError {
    /// A primary target was absent from every primary source.
    ///
    /// Only the first missing target, in the caller's enumeration order, is reported.
    #[error("Package '{target}' was not found on any primary source")]
    PackageNotFound {
        /// The target as the caller supplied it (`id` or `id@version`)
        target: String,
    },

    /// The run observed its cancellation token at a checkpoint.
    #[error("Dependency gathering was cancelled")]
    Cancelled,

    /// A dependency query raised an error. The upstream error is passed through unmodified.
    #[error(transparent)]
    Query(#[from] anyhow::Error),

    /// A target string could not be parsed.
    #[error("Invalid target '{input}': {reason}")]
    InvalidTarget {
        /// The raw input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration or feed file problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl GatherError {
    /// Whether this error is [`GatherError::Cancelled`].
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Error wrapper carrying user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any displayable error.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            message: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`GatherError`] variants and TOML parse failures get tailored details and
/// suggestions. Anything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(gather_error) = error.downcast_ref::<GatherError>() {
        return create_error_context(gather_error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("Invalid TOML: {toml_error}"))
            .with_suggestion("Check the syntax of depgather.toml and the feed files it references");
    }

    let mut message = error.to_string();
    for cause in error.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {cause}"));
    }
    ErrorContext::new(message)
}

fn create_error_context(error: &GatherError) -> ErrorContext {
    match error {
        GatherError::PackageNotFound {
            target,
        } => ErrorContext::new(error)
            .with_details(format!(
                "None of the primary feeds returned metadata for '{target}'"
            ))
            .with_suggestion(
                "Check the package id and version, or mark the feed that hosts it as primary",
            ),
        GatherError::Cancelled => ErrorContext::new(error)
            .with_details("No partial result is produced for a cancelled run"),
        GatherError::Query(inner) => {
            let mut ctx = ErrorContext::new(inner);
            let causes: Vec<String> = inner.chain().skip(1).map(ToString::to_string).collect();
            if !causes.is_empty() {
                ctx = ctx.with_details(causes.join(": "));
            }
            ctx.with_suggestion("Check that every configured feed is reachable and well-formed")
        }
        GatherError::InvalidTarget {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Use 'id' for any version or 'id@version' for an exact version, and do not mix the two",
        ),
        GatherError::Config {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check depgather.toml, or point DEPGATHER_CONFIG at the configuration file to use",
        ),
    }
}
