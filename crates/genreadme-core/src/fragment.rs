//! README fragments.
//!
//! Each addon keeps its documentation as small reStructuredText files in
//! `<addon>/readme/`, one per [`Fragment`]. They are read in a fixed order,
//! relative image paths are rewritten to absolute raw-file URLs so that the
//! assembled README renders outside the repository, and each fragment is
//! normalised to end with a newline.
//!
//! A missing or zero-length file is an *absent* fragment (`None`), which is
//! different from a present fragment holding only whitespace.

use crate::{Error, Repository, Result};
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

/// Directory inside an addon holding the fragments.
pub const FRAGMENTS_DIR: &str = "readme";

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static IMAGE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\.\..* (?:figure|image)::\s+(?P<path>.*?)\s*$").unwrap());

/// The fragments an addon README is assembled from, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fragment {
    /// What the addon does.
    Description,
    /// Installation notes.
    Install,
    /// Configuration steps.
    Configure,
    /// How to use it.
    Usage,
    /// Known issues and planned work.
    Roadmap,
    /// Notes for developers.
    Develop,
    /// People who contributed.
    Contributors,
    /// Other credits (sponsors, funders).
    Credits,
    /// Changelog.
    History,
}

impl Fragment {
    /// Every fragment, in enumeration order.
    pub const ALL: [Self; 9] = [
        Self::Description,
        Self::Install,
        Self::Configure,
        Self::Usage,
        Self::Roadmap,
        Self::Develop,
        Self::Contributors,
        Self::Credits,
        Self::History,
    ];

    /// File name without extension, e.g. `DESCRIPTION`.
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            Self::Description => "DESCRIPTION",
            Self::Install => "INSTALL",
            Self::Configure => "CONFIGURE",
            Self::Usage => "USAGE",
            Self::Roadmap => "ROADMAP",
            Self::Develop => "DEVELOP",
            Self::Contributors => "CONTRIBUTORS",
            Self::Credits => "CREDITS",
            Self::History => "HISTORY",
        }
    }

    /// `<addon_dir>/readme/<STEM>.rst`
    #[must_use]
    pub fn path(self, addon_dir: &Path) -> PathBuf {
        addon_dir.join(FRAGMENTS_DIR).join(format!("{}.rst", self.stem()))
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// The fragments of one addon. Absent fragments are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    texts: [Option<String>; 9],
}

impl Fragments {
    /// Text of a present fragment.
    #[must_use]
    pub fn get(&self, fragment: Fragment) -> Option<&str> {
        self.texts[fragment.index()].as_deref()
    }

    /// Set a fragment's text.
    pub fn insert(&mut self, fragment: Fragment, text: impl Into<String>) {
        self.texts[fragment.index()] = Some(text.into());
    }

    /// Present fragments in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Fragment, &str)> {
        Fragment::ALL
            .into_iter()
            .filter_map(|fragment| self.get(fragment).map(|text| (fragment, text)))
    }

    /// Total number of characters across present fragments.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.iter().map(|(_, text)| text.chars().count()).sum()
    }

    /// `true` when no fragment is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.iter().all(Option::is_none)
    }
}

/// Rewrite a relative `image`/`figure` target on one line.
///
/// Targets starting with `http` are left alone. Any `../` is dropped from
/// relative targets (fragments live one level below the addon) before they
/// are joined onto `module_url`.
///
/// ```rust
/// use genreadme_core::fragment::rewrite_image_line;
/// use url::Url;
///
/// let base = Url::parse("https://raw.githubusercontent.com/O/R/B/M/")?;
/// assert_eq!(
///     rewrite_image_line(".. image:: ../static/img/a.png", &base),
///     ".. image:: https://raw.githubusercontent.com/O/R/B/M/static/img/a.png"
/// );
/// assert_eq!(rewrite_image_line("Plain text", &base), "Plain text");
/// # Ok::<(), url::ParseError>(())
/// ```
#[must_use]
pub fn rewrite_image_line<'a>(line: &'a str, module_url: &Url) -> Cow<'a, str> {
    let Some(path) = IMAGE_PATH_RE
        .captures(line)
        .and_then(|captures| captures.name("path"))
        .map(|m| m.as_str())
    else {
        return Cow::Borrowed(line);
    };
    if path.is_empty() || path.starts_with("http") {
        return Cow::Borrowed(line);
    }
    match module_url.join(&path.replace("../", "")) {
        Ok(absolute) => Cow::Owned(line.replace(path, absolute.as_str())),
        Err(err) => {
            warn!("cannot make image path '{path}' absolute: {err}");
            Cow::Borrowed(line)
        },
    }
}

/// Rewrite every line of a fragment and make sure it ends with a newline.
#[must_use]
pub fn assemble_fragment(text: &str, module_url: &Url) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for line in text.split_inclusive('\n') {
        let (body, ending) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        out.push_str(&rewrite_image_line(body, module_url));
        out.push_str(ending);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Read one fragment file.
///
/// Returns `Ok(None)` when the file does not exist or is empty.
pub fn read_fragment(path: &Path, module_url: &Url) -> Result<Option<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            });
        },
    };
    if bytes.is_empty() {
        return Ok(None);
    }
    let text = String::from_utf8(bytes).map_err(|_| Error::Decode {
        path: path.to_path_buf(),
    })?;
    let text = if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text.as_str())
    };
    Ok(Some(assemble_fragment(&text, module_url)))
}

/// Read all fragments of an addon, in enumeration order.
pub fn read_fragments(addon_dir: &Path, repo: &Repository, addon_name: &str) -> Result<Fragments> {
    let module_url = repo.module_url(addon_name)?;
    let mut fragments = Fragments::default();
    for fragment in Fragment::ALL {
        let path = fragment.path(addon_dir);
        match read_fragment(&path, &module_url)? {
            Some(text) => {
                debug!("{addon_name}: fragment {} ({} chars)", fragment.stem(), text.len());
                fragments.insert(fragment, text);
            },
            None => debug!("{addon_name}: fragment {} absent", fragment.stem()),
        }
    }
    Ok(fragments)
}

/// Create `readme/` and an empty file for every missing fragment.
///
/// Returns the files that were created. Empty files stay absent fragments.
pub fn init_fragments(addon_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = addon_dir.join(FRAGMENTS_DIR);
    fs::create_dir_all(&dir).map_err(|source| Error::Write {
        path: dir.clone(),
        source,
    })?;
    let mut created = Vec::new();
    for fragment in Fragment::ALL {
        let path = fragment.path(addon_dir);
        if path.exists() {
            continue;
        }
        fs::write(&path, "").map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        created.push(path);
    }
    Ok(created)
}
