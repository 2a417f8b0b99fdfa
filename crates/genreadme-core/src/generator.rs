//! Per-addon orchestration: fragments, badges, README, then the preview.

use crate::config::DEFAULT_TOC_THRESHOLD;
use crate::preview::render_preview;
use crate::{
    Addon, Error, ReadmeFields, Renderer, Repository, Result, generate_preview, init_fragments, read_fragments,
    render_readme, resolve_badges, write_readme,
};
use std::path::PathBuf;
use tracing::{debug, error};

/// What a run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Write `static/description/index.html`.
    pub gen_html: bool,
    /// Render the README without writing HTML, to validate it.
    pub check: bool,
    /// Create `readme/` and empty fragment files when missing.
    pub init_fragments: bool,
    /// Fragment size above which a table of contents is added.
    pub toc_threshold: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            gen_html: false,
            check: false,
            init_fragments: false,
            toc_threshold: DEFAULT_TOC_THRESHOLD,
        }
    }
}

/// What happened to an addon's preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The preview was written.
    Written(PathBuf),
    /// A hand-written preview exists and was left alone.
    SkippedManual,
    /// HTML output is off.
    Disabled,
    /// The README was rendered to validate it; nothing was written.
    Checked,
}

/// A successfully processed addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonOutcome {
    /// Addon name.
    pub addon: String,
    /// The written README.
    pub readme: PathBuf,
    /// Preview result.
    pub preview: PreviewOutcome,
    /// Fragment files created by `init_fragments`.
    pub created_fragments: Vec<PathBuf>,
}

/// An addon that could not be processed.
#[derive(Debug)]
pub struct AddonFailure {
    /// Addon name.
    pub addon: String,
    /// Why it failed.
    pub error: Error,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Addons processed without error, in processing order.
    pub succeeded: Vec<AddonOutcome>,
    /// Addons that failed, in processing order.
    pub failed: Vec<AddonFailure>,
}

impl GenerateReport {
    /// `true` when no addon failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generates READMEs for addons of one repository.
#[derive(Debug, Clone)]
pub struct Generator {
    repo: Repository,
    options: GenerateOptions,
}

impl Generator {
    /// Create a generator.
    #[must_use]
    pub const fn new(repo: Repository, options: GenerateOptions) -> Self {
        Self { repo, options }
    }

    /// Generate the README (and preview, if enabled) of one addon.
    pub fn generate(&self, addon: &Addon, renderer: &dyn Renderer) -> Result<AddonOutcome> {
        let created_fragments = if self.options.init_fragments {
            init_fragments(&addon.dir)?
        } else {
            Vec::new()
        };

        let fragments = read_fragments(&addon.dir, &self.repo, &addon.name)?;
        let toc = fragments.total_chars() > self.options.toc_threshold;
        debug!(
            "{}: {} fragment chars, table of contents {}",
            addon.name,
            fragments.total_chars(),
            if toc { "on" } else { "off" }
        );

        let badges = resolve_badges(&addon.manifest, &self.repo, &addon.name);
        let fields = ReadmeFields::new(&addon.name, &addon.manifest, fragments, badges, self.repo.clone(), toc);
        let readme = write_readme(&addon.dir, &render_readme(&fields))?;

        let preview = if self.options.gen_html {
            generate_preview(&readme, renderer)?.map_or(PreviewOutcome::SkippedManual, PreviewOutcome::Written)
        } else if self.options.check {
            render_preview(&readme, renderer)?;
            PreviewOutcome::Checked
        } else {
            PreviewOutcome::Disabled
        };

        Ok(AddonOutcome {
            addon: addon.name.clone(),
            readme,
            preview,
            created_fragments,
        })
    }

    /// Process every addon; a failing addon does not stop the others.
    pub fn generate_all(&self, addons: &[Addon], renderer: &dyn Renderer) -> GenerateReport {
        let mut report = GenerateReport::default();
        for addon in addons {
            match self.generate(addon, renderer) {
                Ok(outcome) => report.succeeded.push(outcome),
                Err(err) => {
                    error!(addon = %addon.name, category = err.category(), "{err}");
                    report.failed.push(AddonFailure {
                        addon: addon.name.clone(),
                        error: err,
                    });
                },
            }
        }
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::preview::preview_path;
    use crate::{Fragment, RstRenderer, find_addons};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn addon(root: &Path, name: &str, fragments: &[(Fragment, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("readme")).unwrap();
        fs::write(dir.join("__manifest__.py"), format!("{{'name': '{name}', 'license': 'AGPL-3'}}")).unwrap();
        for (fragment, text) in fragments {
            fs::write(fragment.path(&dir), text).unwrap();
        }
    }

    fn generator(options: GenerateOptions) -> Generator {
        Generator::new(Repository::new("ingadhoc", "sale", "16.0"), options)
    }

    #[test]
    fn readme_only_by_default() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "sale_ux", &[(Fragment::Description, "Hello.\n")]);
        let addons = find_addons(root.path(), None).unwrap();

        let outcome = generator(GenerateOptions::default())
            .generate(&addons[0], &RstRenderer::default())
            .unwrap();
        assert_eq!(outcome.preview, PreviewOutcome::Disabled);
        let text = fs::read_to_string(&outcome.readme).unwrap();
        assert!(text.contains("Hello."));
        assert!(!preview_path(&addons[0].dir).exists());
    }

    #[test]
    fn unknown_development_status_only_drops_the_maturity_badge() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "sale_ux", &[]);
        fs::write(
            root.path().join("sale_ux/__manifest__.py"),
            "{'development_status': 'unknown-value', 'license': 'AGPL-3'}",
        )
        .unwrap();
        let addons = find_addons(root.path(), None).unwrap();

        let outcome = generator(GenerateOptions::default())
            .generate(&addons[0], &RstRenderer::default())
            .unwrap();
        let text = fs::read_to_string(&outcome.readme).unwrap();
        assert!(text.contains("\n|badge1| |badge2|\n"));
        assert!(!text.contains("|badge3|"));
        assert!(!text.contains("img.shields.io/badge/maturity"));
        assert!(text.contains("licence-AGPL--3"));
    }

    #[test]
    fn gen_html_writes_preview() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "sale_ux", &[(Fragment::Usage, "Use it.\n")]);
        let addons = find_addons(root.path(), None).unwrap();
        let options = GenerateOptions {
            gen_html: true,
            ..GenerateOptions::default()
        };

        let outcome = generator(options).generate(&addons[0], &RstRenderer::default()).unwrap();
        assert_eq!(outcome.preview, PreviewOutcome::Written(preview_path(&addons[0].dir)));
    }

    #[test]
    fn check_renders_without_writing() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "sale_ux", &[]);
        let addons = find_addons(root.path(), None).unwrap();
        let options = GenerateOptions {
            check: true,
            ..GenerateOptions::default()
        };

        let outcome = generator(options).generate(&addons[0], &RstRenderer::default()).unwrap();
        assert_eq!(outcome.preview, PreviewOutcome::Checked);
        assert!(!preview_path(&addons[0].dir).exists());
    }

    #[test]
    fn toc_follows_threshold() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "big", &[(Fragment::Usage, &"word ".repeat(30))]);
        let addons = find_addons(root.path(), None).unwrap();

        let small_threshold = GenerateOptions {
            toc_threshold: 100,
            ..GenerateOptions::default()
        };
        let outcome = generator(small_threshold).generate(&addons[0], &RstRenderer::default()).unwrap();
        assert!(fs::read_to_string(outcome.readme).unwrap().contains(".. contents::"));

        let outcome = generator(GenerateOptions::default())
            .generate(&addons[0], &RstRenderer::default())
            .unwrap();
        assert!(!fs::read_to_string(outcome.readme).unwrap().contains(".. contents::"));
    }

    #[test]
    fn init_creates_missing_fragments() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "m", &[(Fragment::Description, "Kept.\n")]);
        let addons = find_addons(root.path(), None).unwrap();
        let options = GenerateOptions {
            init_fragments: true,
            ..GenerateOptions::default()
        };

        let outcome = generator(options).generate(&addons[0], &RstRenderer::default()).unwrap();
        assert_eq!(outcome.created_fragments.len(), Fragment::ALL.len() - 1);
        assert_eq!(fs::read_to_string(Fragment::Description.path(&addons[0].dir)).unwrap(), "Kept.\n");
        assert!(!fs::read_to_string(outcome.readme).unwrap().contains("Installation"));
    }

    #[test]
    fn failure_is_recorded_and_others_continue() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "a_broken", &[(Fragment::Usage, ".. unknown-directive::\n")]);
        addon(root.path(), "b_fine", &[(Fragment::Usage, "Fine.\n")]);
        let addons = find_addons(root.path(), None).unwrap();
        let options = GenerateOptions {
            gen_html: true,
            ..GenerateOptions::default()
        };

        let report = generator(options).generate_all(&addons, &RstRenderer::default());
        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].addon, "a_broken");
        assert_eq!(report.failed[0].error.category(), "render");
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.succeeded[0].addon, "b_fine");
        // The README is still written before the preview fails.
        assert!(root.path().join("a_broken/README.rst").exists());
    }

    #[test]
    fn undecodable_fragment_fails_the_addon() {
        let root = TempDir::new().unwrap();
        addon(root.path(), "m", &[]);
        fs::write(Fragment::Usage.path(&root.path().join("m")), [0xff, 0xfe, b'\n']).unwrap();
        let addons = find_addons(root.path(), None).unwrap();

        let err = generator(GenerateOptions::default())
            .generate(&addons[0], &RstRenderer::default())
            .unwrap_err();
        assert_eq!(err.category(), "decode");
        assert!(!root.path().join("m/README.rst").exists());
    }
}
