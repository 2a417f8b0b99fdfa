//! # genreadme-core
//!
//! Core functionality for gen-readme: assembling one `README.rst` per addon
//! from the small reStructuredText fragments kept in the addon's `readme/`
//! directory, and rendering it to a static HTML preview.
//!
//! ## Architecture
//!
//! The crate is organized leaf-first:
//!
//! - **Manifest**: the addon's `__manifest__.py`, a Python dict literal
//! - **Discovery**: finds installable addons under a directory
//! - **Fragments**: reads the fixed, ordered set of `readme/*.rst` files and
//!   rewrites relative image paths to absolute URLs
//! - **Badges**: maturity, license and source badges derived from the manifest
//! - **Document**: fills the README template and writes `README.rst`
//! - **Preview**: renders the README to `static/description/index.html`
//! - **Generator**: per-addon orchestration and the batch report
//! - **Changeset**: the pre-commit check for missing fragment directories
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use genreadme_core::{GenerateOptions, Generator, Repository, RstRenderer, find_addons};
//! use std::path::Path;
//!
//! let repo = Repository::new("ingadhoc", "account-financial-tools", "16.0");
//! let addons = find_addons(Path::new("."), None)?;
//! let generator = Generator::new(repo, GenerateOptions::default());
//! let report = generator.generate_all(&addons, &RstRenderer::default());
//!
//! for outcome in &report.succeeded {
//!     println!("{}: {}", outcome.addon, outcome.readme.display());
//! }
//! # Ok::<(), genreadme_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]. Missing fragments,
//! unknown development statuses and unknown licenses are not errors; they
//! simply produce less output.

/// Badge resolution from manifest metadata
pub mod badge;
/// Pre-commit changeset checks
pub mod changeset;
/// Configuration file loading
pub mod config;
/// Addon discovery
pub mod discovery;
/// README template filling and writing
pub mod document;
/// Error types and result aliases
pub mod error;
/// Fragment reading and image path rewriting
pub mod fragment;
/// Per-addon orchestration
pub mod generator;
/// Python-literal manifest parsing
pub mod manifest;
/// HTML preview generation
pub mod preview;
/// Repository coordinates and derived URLs
pub mod repository;

pub use badge::{Badge, resolve_badges};
pub use changeset::{addons_from_paths, check_fragment_dirs};
pub use config::{Config, LoadedConfig, OutputConfig, RepositoryConfig};
pub use discovery::{Addon, find_addons};
pub use document::{ReadmeFields, filter_authors, render_readme, write_readme};
pub use error::{Error, Result};
pub use fragment::{Fragment, Fragments, init_fragments, read_fragments};
pub use generator::{
    AddonFailure, AddonOutcome, GenerateOptions, GenerateReport, Generator, PreviewOutcome,
};
pub use manifest::Manifest;
pub use preview::{MARKER, Renderer, RstRenderer, generate_preview, strip_generator_version};
pub use repository::Repository;
