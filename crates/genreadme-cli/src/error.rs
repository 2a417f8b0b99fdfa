//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments or configuration |
//! | 3 | `NotFound` | Addons directory or config file not found |
//! | 4 | `MissingFragments` | Pre-commit check found addons without `readme/` |
//! | 5 | `Render` | README or preview generation failed |
//!
//! ```bash
//! gen-readme $(git diff --name-only --cached)
//! case $? in
//!     0) echo "ok" ;;
//!     4) echo "add readme/ fragments first" ;;
//!     *) echo "other error" ;;
//! esac
//! ```

use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    ///
    /// Includes repository coordinates missing after flags, environment and
    /// config file have all been consulted.
    Usage = 2,

    /// Requested resource not found (exit code 3).
    NotFound = 3,

    /// Changed addons without a `readme/` directory (exit code 4).
    MissingFragments = 4,

    /// An addon's README or preview could not be generated (exit code 5).
    Render = 5,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::MissingFragments => "missing readme fragments",
            Self::Render => "generation failed",
        }
    }

    /// Map a library error category (see [`genreadme_core::Error::category`]).
    #[must_use]
    pub fn from_core_category(category: &str) -> Self {
        match category {
            "not_found" => Self::NotFound,
            "config" | "invalid_url" => Self::Usage,
            "render" | "decode" | "manifest" => Self::Render,
            _ => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Fallback for errors that were not categorized where they were raised.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found")
            || msg_lower.contains("no such")
            || msg_lower.contains("does not exist")
        {
            return Self::NotFound;
        }

        if msg_lower.contains("without a readme") {
            return Self::MissingFragments;
        }

        if msg_lower.contains("failed to render")
            || msg_lower.contains("not valid utf-8")
            || msg_lower.contains("invalid manifest")
        {
            return Self::Render;
        }

        if msg_lower.contains("configuration")
            || msg_lower.contains("invalid argument")
            || msg_lower.contains("missing required")
            || msg_lower.contains("invalid value")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// ```rust,ignore
/// use genreadme_cli::error::CliError;
///
/// let err = CliError::usage(anyhow::anyhow!("missing --org-name"));
/// assert_eq!(err.exit_code(), 2);
/// ```
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a missing-fragments error.
    pub fn missing_fragments(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::MissingFragments, source)
    }

    /// Create a render error.
    pub fn render(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Render, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}

impl From<genreadme_core::Error> for CliError {
    fn from(err: genreadme_core::Error) -> Self {
        Self::new(ErrorCategory::from_core_category(err.category()), err)
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// A `CliError` anywhere in the chain decides; otherwise the category is
/// inferred from the message.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<genreadme_core::Error>() {
        return ErrorCategory::from_core_category(core_err.category()).exit_code();
    }
    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}
