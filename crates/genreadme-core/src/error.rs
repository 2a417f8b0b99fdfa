//! Error types for genreadme-core operations.
//!
//! Errors are grouped by what failed:
//!
//! - **I/O**: reading fragments and manifests, writing README and preview files
//! - **Decode**: a fragment that is not valid UTF-8
//! - **Manifest**: a manifest that is not a Python dict literal
//! - **Render**: the markup renderer rejected the generated README
//! - **Configuration**: unreadable or malformed config files
//!
//! Missing fragments, unknown development statuses and unknown licenses are
//! deliberately absent from this list: they are normal input.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for genreadme-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed without a more specific context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading a file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing a file or creating its parent directory failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A fragment file is not valid UTF-8.
    ///
    /// Fatal for the addon; the fragment is never skipped silently.
    #[error("Fragment {} is not valid UTF-8", path.display())]
    Decode {
        /// The offending fragment.
        path: PathBuf,
    },

    /// Python-literal syntax error, without file context.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A manifest file could not be parsed.
    #[error("Invalid manifest {}: {message}", path.display())]
    Manifest {
        /// Manifest file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The markup renderer rejected a README.
    #[error("Failed to render {}: {source}", path.display())]
    Render {
        /// README that was rendered.
        path: PathBuf,
        /// Renderer diagnostic.
        #[source]
        source: genreadme_rst::Error,
    },

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A URL could not be built from repository coordinates.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Short category name, used in log fields and CLI exit code mapping.
    ///
    /// ```rust
    /// use genreadme_core::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::Decode { path: PathBuf::from("readme/USAGE.rst") };
    /// assert_eq!(err.category(), "decode");
    /// assert_eq!(Error::NotFound("addons".into()).category(), "not_found");
    /// ```
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Read { .. } | Self::Write { .. } => "io",
            Self::Decode { .. } => "decode",
            Self::Parse(_) | Self::Manifest { .. } => "manifest",
            Self::Render { .. } => "render",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Convenience type alias for Results with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_paths() {
        let err = Error::Decode {
            path: PathBuf::from("sale/readme/USAGE.rst"),
        };
        assert_eq!(err.to_string(), "Fragment sale/readme/USAGE.rst is not valid UTF-8");

        let err = Error::Manifest {
            path: PathBuf::from("sale/__manifest__.py"),
            message: "expected '}'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid manifest sale/__manifest__.py: expected '}'"
        );
    }

    #[test]
    fn render_error_keeps_source() {
        use std::error::Error as _;

        let source = genreadme_rst::render_html(".. raw:: html\n\n   x\n", &genreadme_rst::Settings::default())
            .unwrap_err();
        let err = Error::Render {
            path: PathBuf::from("README.rst"),
            source,
        };
        assert_eq!(err.category(), "render");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("\"raw\" directive disabled."));
    }

    #[test]
    fn toml_errors_are_config_errors() {
        let err: Error = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert_eq!(err.category(), "config");
    }
}
