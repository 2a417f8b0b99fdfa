//! HTML preview generation.
//!
//! The preview lives at `<addon>/static/description/index.html`, where the
//! Odoo app store picks it up. A preview is only (re)written when it does not
//! exist yet or when it carries [`MARKER`], so hand-written pages survive.

use crate::{Error, Result};
use genreadme_rst::{GENERATOR_NAME, Settings};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

/// Text identifying a generated preview.
pub const MARKER: &str = "gen-readme";

/// SAFETY: Pattern is built from a constant name and is known to be valid.
#[allow(clippy::unwrap_used)]
static GENERATOR_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(<meta[^>]*generator[^>]*{})\s+[0-9][0-9A-Za-z.+-]*",
        regex::escape(GENERATOR_NAME)
    ))
    .unwrap()
});

/// Turns README markup into an HTML page.
pub trait Renderer {
    /// Render `source`, read from `source_path`.
    fn render(&self, source: &str, source_path: &Path) -> Result<String>;
}

/// [`Renderer`] backed by `genreadme-rst`.
#[derive(Debug, Clone, Default)]
pub struct RstRenderer {
    settings: Settings,
}

impl RstRenderer {
    /// Renderer with custom settings.
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Renderer for RstRenderer {
    fn render(&self, source: &str, source_path: &Path) -> Result<String> {
        let mut settings = self.settings.clone();
        settings.base_dir = source_path.parent().map(Path::to_path_buf);
        genreadme_rst::render_html(source, &settings).map_err(|source| Error::Render {
            path: source_path.to_path_buf(),
            source,
        })
    }
}

/// `<addon_dir>/static/description/index.html`
#[must_use]
pub fn preview_path(addon_dir: &Path) -> PathBuf {
    addon_dir.join("static").join("description").join("index.html")
}

/// Remove the renderer version from the generator `<meta>` tag.
///
/// ```rust
/// use genreadme_core::strip_generator_version;
///
/// let html = r#"<meta name="generator" content="genreadme-rst 0.3.0" />"#;
/// assert_eq!(
///     strip_generator_version(html),
///     r#"<meta name="generator" content="genreadme-rst" />"#
/// );
/// ```
#[must_use]
pub fn strip_generator_version(html: &str) -> String {
    GENERATOR_VERSION_RE.replace(html, "$1").into_owned()
}

/// Read the README at `readme_path` and render it, without writing anything.
pub fn render_preview(readme_path: &Path, renderer: &dyn Renderer) -> Result<String> {
    let source = fs::read_to_string(readme_path).map_err(|source| Error::Read {
        path: readme_path.to_path_buf(),
        source,
    })?;
    let html = renderer.render(&source, readme_path)?;
    Ok(strip_generator_version(&html))
}

/// Whether an existing preview may be overwritten.
fn is_generated(path: &Path) -> Result<bool> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).contains(MARKER)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(source) => Err(Error::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Render the README next to it into the addon's preview page.
///
/// Returns `Ok(None)` without touching anything when a preview exists that
/// was not generated by this tool. Nothing is written when rendering fails.
pub fn generate_preview(readme_path: &Path, renderer: &dyn Renderer) -> Result<Option<PathBuf>> {
    let addon_dir = readme_path.parent().unwrap_or_else(|| Path::new("."));
    let target = preview_path(addon_dir);
    if !is_generated(&target)? {
        warn!("{} was not generated by gen-readme, left untouched", target.display());
        return Ok(None);
    }

    let html = render_preview(readme_path, renderer)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&target, html).map_err(|source| Error::Write {
        path: target.clone(),
        source,
    })?;
    info!("wrote {}", target.display());
    Ok(Some(target))
}
