//! # genreadme-rst
//!
//! A small reStructuredText to XHTML renderer covering the subset of the
//! markup that addon README files are written in.
//!
//! The renderer follows the docutils `html4css1` writer closely enough that
//! generated previews look like the ones produced by the reference toolchain,
//! and it keeps the same safety knobs:
//!
//! - **File insertion** (`include` directive) is disabled by default
//! - **Raw passthrough** (`raw` directive) is disabled by default
//! - **Halt level** turns any diagnostic at or above the level into an error,
//!   so no HTML is produced for invalid input
//!
//! ## Quick Start
//!
//! ```rust
//! use genreadme_rst::{Settings, render_html};
//!
//! let html = render_html("Title\n=====\n\nSome *text*.\n", &Settings::default())?;
//! assert!(html.contains("<h1 class=\"title\">Title</h1>"));
//! assert!(html.contains("<em>text</em>"));
//! # Ok::<(), genreadme_rst::Error>(())
//! ```
//!
//! ## Diagnostics
//!
//! Problems are reported with docutils severities. With the default
//! [`Settings`] anything at [`Level::Warning`] or above aborts rendering:
//!
//! ```rust
//! use genreadme_rst::{Error, Level, Settings, render_html};
//!
//! let err = render_html(".. raw:: html\n\n   <script></script>\n", &Settings::default())
//!     .unwrap_err();
//! let Error::Halted(diagnostic) = err else { panic!("unexpected error") };
//! assert_eq!(diagnostic.level, Level::Warning);
//! ```

use std::path::PathBuf;

mod diagnostic;
mod inline;
mod model;
mod parser;
mod writer;

pub use diagnostic::{Diagnostic, Level};
pub use model::{Block, Document, Image, Inline, Substitution};

/// Name written into the `<meta name="generator">` tag, followed by the version.
pub const GENERATOR_NAME: &str = "genreadme-rst";

/// Errors produced while rendering a document.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A diagnostic reached the configured halt level.
    #[error("{0}")]
    Halted(Diagnostic),

    /// A file referenced by an `include` directive could not be read.
    #[error("failed to read included file {path}: {source}")]
    Include {
        /// Path of the included file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for renderer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Renderer configuration.
///
/// The defaults match the hardened settings used for README previews:
/// no file insertion, no raw passthrough, halt on warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Allow the `include` directive to read files from disk.
    pub file_insertion_enabled: bool,
    /// Allow the `raw` directive to pass markup through unescaped.
    pub raw_enabled: bool,
    /// Diagnostics at or above this level abort rendering.
    pub halt_level: Level,
    /// Version string written after [`GENERATOR_NAME`] in the generator tag.
    pub generator_version: String,
    /// Directory `include` paths are resolved against.
    pub base_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_insertion_enabled: false,
            raw_enabled: false,
            halt_level: Level::Warning,
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            base_dir: None,
        }
    }
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The complete XHTML page.
    pub html: String,
    /// Diagnostics below the halt level, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

/// Render `source` and keep the non-fatal diagnostics.
///
/// # Errors
///
/// Returns [`Error::Halted`] with the first diagnostic at or above
/// `settings.halt_level`, or [`Error::Include`] when an enabled `include`
/// directive points at an unreadable file.
pub fn render(source: &str, settings: &Settings) -> Result<Rendered> {
    let mut reporter = diagnostic::Reporter::new(settings.halt_level);
    let document = parser::parse(source, settings, &mut reporter)?;
    let html = writer::write(&document, settings, &mut reporter)?;
    Ok(Rendered {
        html,
        diagnostics: reporter.into_diagnostics(),
    })
}

/// Render `source` to a standalone XHTML page.
///
/// # Errors
///
/// See [`render`].
pub fn render_html(source: &str, settings: &Settings) -> Result<String> {
    render(source, settings).map(|rendered| rendered.html)
}
