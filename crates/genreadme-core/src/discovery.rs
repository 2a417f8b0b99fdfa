//! Addon discovery.

use crate::{Error, Manifest, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file names, newest first.
pub const MANIFEST_FILES: [&str; 2] = ["__manifest__.py", "__openerp__.py"];

/// An addon directory with its parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Addon {
    /// Technical name (directory name).
    pub name: String,
    /// Addon directory.
    pub dir: PathBuf,
    /// Parsed manifest.
    pub manifest: Manifest,
}

impl Addon {
    /// Load the addon in `dir`, or `None` when it has no manifest.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let Some(manifest_path) = manifest_path(dir) else {
            return Ok(None);
        };
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(Self {
            name,
            dir: dir.to_path_buf(),
            manifest: Manifest::from_file(&manifest_path)?,
        }))
    }
}

/// Path of the manifest in `dir`, if there is one.
#[must_use]
pub fn manifest_path(dir: &Path) -> Option<PathBuf> {
    MANIFEST_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Installable addons directly under `root`, sorted by name.
///
/// Hidden directories and directories without a manifest are ignored. When
/// `only` is given, addons with other names are skipped without reading their
/// manifest.
pub fn find_addons(root: &Path, only: Option<&[String]>) -> Result<Vec<Addon>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("addons directory {}", root.display())));
    }
    let entries = fs::read_dir(root).map_err(|source| Error::Read {
        path: root.to_path_buf(),
        source,
    })?;

    let mut addons = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        if only.is_some_and(|names| !names.iter().any(|wanted| wanted == name)) {
            continue;
        }
        let Some(addon) = Addon::load(&path)? else {
            continue;
        };
        if !addon.manifest.installable() {
            debug!("{}: not installable, skipped", addon.name);
            continue;
        }
        addons.push(addon);
    }
    addons.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("found {} addons under {}", addons.len(), root.display());
    Ok(addons)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn addon(root: &Path, name: &str, manifest_file: &str, manifest: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(manifest_file), manifest).unwrap();
    }

    #[test]
    fn finds_installable_addons_sorted() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "sale_ux", "__manifest__.py", "{'name': 'Sale UX'}");
        addon(root.path(), "account_ux", "__openerp__.py", "{'name': 'Account UX'}");
        addon(root.path(), "old", "__manifest__.py", "{'installable': False}");
        addon(root.path(), ".hidden", "__manifest__.py", "{}");
        fs::create_dir(root.path().join("docs")).unwrap();
        fs::write(root.path().join("setup.py"), "").unwrap();

        let names: Vec<_> = find_addons(root.path(), None)
            .unwrap()
            .into_iter()
            .map(|addon| addon.name)
            .collect();
        assert_eq!(names, ["account_ux", "sale_ux"]);
    }

    #[test]
    fn manifest_is_preferred_over_openerp() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "m", "__openerp__.py", "{'name': 'Old'}");
        addon(root.path(), "m", "__manifest__.py", "{'name': 'New'}");
        let addons = find_addons(root.path(), None).unwrap();
        assert_eq!(addons[0].manifest.name(), Some("New"));
    }

    #[test]
    fn restricted_to_names() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "a", "__manifest__.py", "{}");
        addon(root.path(), "b", "__manifest__.py", "{}");
        // Not parsed because it is filtered out first.
        addon(root.path(), "broken", "__manifest__.py", "{");
        let only = vec!["b".to_string(), "missing".to_string()];
        let addons = find_addons(root.path(), Some(only.as_slice())).unwrap();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].name, "b");
    }

    #[test]
    fn broken_manifest_is_an_error() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "broken", "__manifest__.py", "{'name': ");
        let err = find_addons(root.path(), None).unwrap_err();
        assert_eq!(err.category(), "manifest");
    }

    #[test]
    fn missing_root_is_not_found() {
        let root = TempDir::new().unwrap();
        let err = find_addons(&root.path().join("nope"), None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
