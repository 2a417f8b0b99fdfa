//! Pre-commit check: every changed addon must have a `readme/` directory.

use crate::fragment::FRAGMENTS_DIR;
use crate::{Addon, Result, find_addons};
use std::path::{Component, Path};
use tracing::debug;

/// Addon names touched by a list of changed files.
///
/// The addon is the first path component. Files at the top level and paths
/// starting with `.` are ignored. Names keep their first-seen order.
///
/// ```rust
/// use genreadme_core::addons_from_paths;
///
/// let files = ["sale_ux/models/sale.py", "setup.py", ".github/ci.yml", "sale_ux/README.rst", "crm_ux/x.py"];
/// assert_eq!(addons_from_paths(&files), vec!["sale_ux", "crm_ux"]);
/// ```
#[must_use]
pub fn addons_from_paths<P: AsRef<Path>>(files: &[P]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for file in files {
        let mut components = file
            .as_ref()
            .components()
            .filter(|component| !matches!(component, Component::CurDir));
        let (Some(Component::Normal(first)), Some(_)) = (components.next(), components.next()) else {
            continue;
        };
        let first = first.to_string_lossy();
        if first.starts_with('.') || names.iter().any(|name| *name == first) {
            continue;
        }
        names.push(first.into_owned());
    }
    names
}

/// Installable addons among the changed files that lack a `readme/` directory.
pub fn check_fragment_dirs<P: AsRef<Path>>(root: &Path, files: &[P]) -> Result<Vec<Addon>> {
    let names = addons_from_paths(files);
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let missing: Vec<Addon> = find_addons(root, Some(names.as_slice()))?
        .into_iter()
        .filter(|addon| !addon.dir.join(FRAGMENTS_DIR).is_dir())
        .collect();
    debug!("{} of {} changed addons lack {FRAGMENTS_DIR}/", missing.len(), names.len());
    Ok(missing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn addon(root: &Path, name: &str, with_readme: bool) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__manifest__.py"), "{}").unwrap();
        if with_readme {
            fs::create_dir(dir.join(FRAGMENTS_DIR)).unwrap();
        }
    }

    #[test]
    fn top_level_and_hidden_paths_are_ignored() {
        assert!(addons_from_paths(&["README.md", ".pre-commit-config.yaml", ".github/workflows/ci.yml"]).is_empty());
    }

    #[test]
    fn leading_current_dir_is_ignored() {
        assert_eq!(addons_from_paths(&["./sale_ux/__init__.py"]), vec!["sale_ux"]);
    }

    #[test]
    fn deduplicates_in_first_seen_order() {
        let files = ["b/x.py", "a/y.py", "b/z.py"];
        assert_eq!(addons_from_paths(&files), vec!["b", "a"]);
    }

    #[test]
    fn reports_only_changed_addons_without_readme() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "has_readme", true);
        addon(root.path(), "no_readme", false);
        addon(root.path(), "untouched", false);

        let files = ["has_readme/models.py", "no_readme/models.py", "not_an_addon/file.txt"];
        let missing = check_fragment_dirs(root.path(), &files).unwrap();
        let names: Vec<_> = missing.iter().map(|addon| addon.name.as_str()).collect();
        assert_eq!(names, ["no_readme"]);
    }

    #[test]
    fn reports_every_offender() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "a", false);
        addon(root.path(), "b", false);
        let missing = check_fragment_dirs(root.path(), &["b/x.py", "a/x.py"]).unwrap();
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn no_relevant_files_is_clean() {
        let root = TempDir::new().unwrap();
        let none: [&str; 0] = [];
        assert!(check_fragment_dirs(root.path(), &none).unwrap().is_empty());
    }
}
