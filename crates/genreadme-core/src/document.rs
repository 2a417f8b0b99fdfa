//! README assembly.
//!
//! The README is produced from a fixed template (`templates/README.rst.tmpl`,
//! embedded at compile time) whose `${name}` placeholders are filled from
//! [`ReadmeFields`]. Optional sections render to nothing when their fragment
//! is absent. Template lines holding only an empty placeholder are dropped and
//! blank template lines are collapsed before any text is inserted, so fragment
//! text reaches the README unchanged.

use crate::{Badge, Error, Fragment, Fragments, Manifest, Repository, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// File name of the generated README inside the addon directory.
pub const README_FILE: &str = "README.rst";

/// Author entries containing this marker credit the hosting collective and
/// are not listed as authors.
pub const ORGANISATION_MARKER: &str = "(OCA)";

const TEMPLATE: &str = include_str!("../templates/README.rst.tmpl");

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([a-z_]+)\}").unwrap());


/// Everything the template needs for one addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeFields {
    /// Technical addon name (directory name).
    pub addon_name: String,
    /// Title shown at the top of the README.
    pub display_name: String,
    /// Authors, already filtered.
    pub authors: Vec<String>,
    /// Badges in display order.
    pub badges: Vec<Badge>,
    /// Fragment texts.
    pub fragments: Fragments,
    /// Where the addon is published.
    pub repo: Repository,
    /// Manifest `website`, if any.
    pub website: Option<String>,
    /// GitHub logins of the maintainers.
    pub maintainers: Vec<String>,
    /// Manifest `preloadable`.
    pub preloadable: bool,
    /// Whether to include a table of contents.
    pub toc: bool,
}

impl ReadmeFields {
    /// Collect the fields from an addon's manifest and fragments.
    #[must_use]
    pub fn new(
        addon_name: &str,
        manifest: &Manifest,
        fragments: Fragments,
        badges: Vec<Badge>,
        repo: Repository,
        toc: bool,
    ) -> Self {
        Self {
            addon_name: addon_name.to_string(),
            display_name: display_name(manifest, addon_name),
            authors: filter_authors(manifest.author().unwrap_or_default()),
            badges,
            fragments,
            repo,
            website: manifest.website().map(str::to_string),
            maintainers: manifest.maintainers(),
            preloadable: manifest.preloadable(),
            toc,
        }
    }
}

/// Manifest `name`, falling back to the addon directory name.
#[must_use]
pub fn display_name(manifest: &Manifest, addon_name: &str) -> String {
    manifest
        .name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(addon_name)
        .to_string()
}

/// Split the manifest `author` field and drop organisational credits.
///
/// ```rust
/// use genreadme_core::filter_authors;
///
/// assert_eq!(
///     filter_authors("Jane Doe, Odoo Community Association (OCA)"),
///     vec!["Jane Doe"]
/// );
/// ```
#[must_use]
pub fn filter_authors(author: &str) -> Vec<String> {
    author
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty() && !entry.contains(ORGANISATION_MARKER))
        .map(str::to_string)
        .collect()
}

/// A section with its title underlined by `rule`, or nothing when `body` is absent.
fn section(title: &str, rule: char, body: Option<&str>) -> String {
    body.map_or_else(String::new, |body| {
        let underline: String = std::iter::repeat_n(rule, title.chars().count()).collect();
        format!("{title}\n{underline}\n\n{body}")
    })
}

fn badge_line(badges: &[Badge]) -> String {
    (1..=badges.len())
        .map(|n| format!("|badge{n}|"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn badge_definitions(badges: &[Badge]) -> String {
    badges
        .iter()
        .enumerate()
        .map(|(i, badge)| {
            format!(
                ".. |badge{}| image:: {}\n    :target: {}\n    :alt: {}\n",
                i + 1,
                badge.image,
                badge.link,
                badge.alt
            )
        })
        .collect()
}

fn bug_tracker(repo: &Repository) -> String {
    format!(
        "Bugs are tracked on `GitHub Issues <{}>`__.\n\
         In case of trouble, please check there if your issue has already been reported.\n",
        repo.issues_url()
    )
}

fn authors(authors: &[String]) -> String {
    if authors.is_empty() {
        return String::new();
    }
    let list: String = authors.iter().map(|author| format!("* {author}\n")).collect();
    section("Authors", '~', Some(&list))
}

fn maintainers(fields: &ReadmeFields) -> String {
    let mut body = format!(
        "This module is part of the `{} <{}>`__ project on GitHub.\n",
        fields.repo.slug(),
        fields.repo.source_url(&fields.addon_name)
    );
    if let Some(website) = &fields.website {
        body.push_str(&format!("\nProject website: {website}\n"));
    }
    if !fields.maintainers.is_empty() {
        body.push_str("\nCurrent maintainers:\n\n");
        for login in &fields.maintainers {
            body.push_str(&format!("* `{login} <https://github.com/{login}>`__\n"));
        }
    }
    section("Maintainers", '~', Some(&body))
}

fn placeholder(fields: &ReadmeFields, name: &str) -> Option<String> {
    let fragment = |f: Fragment| fields.fragments.get(f);
    let value = match name {
        "title" => fields.display_name.clone(),
        "title_rule" => "=".repeat(fields.display_name.chars().count()),
        "badge_line" => badge_line(&fields.badges),
        "badge_definitions" => badge_definitions(&fields.badges),
        "description" => fragment(Fragment::Description).unwrap_or_default().to_string(),
        "preload_notice" if fields.preloadable => String::new(),
        "preload_notice" => ".. important::\n   This module is not preloadable. \
                             It must be installed explicitly in every database that uses it.\n"
            .to_string(),
        "toc" if fields.toc => "**Table of contents**\n\n.. contents::\n   :local:\n".to_string(),
        "toc" => String::new(),
        "install" => section("Installation", '=', fragment(Fragment::Install)),
        "configure" => section("Configuration", '=', fragment(Fragment::Configure)),
        "usage" => section("Usage", '=', fragment(Fragment::Usage)),
        "roadmap" => section("Known issues / Roadmap", '=', fragment(Fragment::Roadmap)),
        "develop" => section("Development", '=', fragment(Fragment::Develop)),
        "bug_tracker" => bug_tracker(&fields.repo),
        "authors" => authors(&fields.authors),
        "contributors" => section("Contributors", '~', fragment(Fragment::Contributors)),
        "other_credits" => section("Other credits", '~', fragment(Fragment::Credits)),
        "maintainers" => maintainers(fields),
        "history" => section("Changelog", '=', fragment(Fragment::History)),
        _ => return None,
    };
    Some(value)
}

fn fill(fields: &ReadmeFields, name: &str) -> String {
    placeholder(fields, name).unwrap_or_else(|| {
        debug!("unknown template placeholder '{name}'");
        String::new()
    })
}

/// The placeholder name when `line` consists of a single placeholder.
fn whole_line_placeholder(line: &str) -> Option<&str> {
    let captures = PLACEHOLDER_RE.captures(line)?;
    let whole = captures.get(0)?;
    if whole.start() != 0 || whole.end() != line.len() {
        return None;
    }
    captures.get(1).map(|name| name.as_str())
}

/// Fill the README template.
///
/// Blank lines of the template itself never repeat, and a line holding only a
/// placeholder disappears when that placeholder is empty. Inserted values are
/// copied verbatim. The result ends with exactly one newline.
#[must_use]
pub fn render_readme(fields: &ReadmeFields) -> String {
    let mut text = String::with_capacity(TEMPLATE.len() * 2);
    let mut pending_blank = false;

    for line in TEMPLATE.lines() {
        let filled = if let Some(name) = whole_line_placeholder(line) {
            let value = fill(fields, name);
            if value.is_empty() {
                continue;
            }
            value
        } else if line.trim().is_empty() {
            pending_blank = !text.is_empty();
            continue;
        } else {
            PLACEHOLDER_RE
                .replace_all(line, |captures: &Captures<'_>| fill(fields, &captures[1]))
                .into_owned()
        };

        if pending_blank {
            text.push('\n');
            pending_blank = false;
        }
        text.push_str(filled.strip_suffix('\n').unwrap_or(&filled));
        text.push('\n');
    }

    let end = text.trim_end_matches('\n').len();
    text.truncate(end);
    text.push('\n');
    text
}

/// Write `<addon_dir>/README.rst`, replacing any previous content.
pub fn write_readme(addon_dir: &Path, text: &str) -> Result<PathBuf> {
    let path = addon_dir.join(README_FILE);
    fs::write(&path, text).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolve_badges;

    fn fields(manifest: &str, fragments: &[(Fragment, &str)], toc: bool) -> ReadmeFields {
        let manifest = Manifest::parse(manifest).unwrap();
        let repo = Repository::new("ingadhoc", "sale", "16.0");
        let mut texts = Fragments::default();
        for (fragment, text) in fragments {
            texts.insert(*fragment, *text);
        }
        let badges = resolve_badges(&manifest, &repo, "sale_ux");
        ReadmeFields::new("sale_ux", &manifest, texts, badges, repo, toc)
    }

    #[test]
    fn authors_drop_organisation_credits() {
        assert_eq!(
            filter_authors("Jane Doe, Odoo Community Association (OCA)"),
            vec!["Jane Doe"]
        );
        assert_eq!(filter_authors(" A ,, B "), vec!["A", "B"]);
        assert!(filter_authors("").is_empty());
    }

    #[test]
    fn display_name_falls_back_to_directory() {
        assert_eq!(display_name(&Manifest::default(), "sale_ux"), "sale_ux");
        let manifest = Manifest::parse("{'name': 'Sale UX'}").unwrap();
        assert_eq!(display_name(&manifest, "sale_ux"), "Sale UX");
    }

    #[test]
    fn title_and_badges() {
        let text = render_readme(&fields("{'name': 'Sale UX', 'license': 'AGPL-3'}", &[], false));
        assert!(text.starts_with(".. !! This file is generated by gen-readme !!\n"));
        assert!(text.contains("\n=======\nSale UX\n=======\n"));
        assert!(text.contains("\n|badge1| |badge2| |badge3|\n"));
        assert!(text.contains(
            ".. |badge2| image:: https://img.shields.io/badge/licence-AGPL--3-blue.png\n    :target: http://www.gnu.org/licenses/agpl-3.0-standalone.html\n    :alt: License: AGPL-3\n"
        ));
    }

    #[test]
    fn sections_follow_fragment_order_and_skip_absent_ones() {
        let text = render_readme(&fields(
            "{'name': 'Sale UX'}",
            &[
                (Fragment::History, "16.0.1.0.0\n~~~~~~~~~~\n\n* first release\n"),
                (Fragment::Usage, "Open a quotation.\n"),
                (Fragment::Description, "Improves sales.\n"),
            ],
            false,
        ));
        let description = text.find("Improves sales.").unwrap();
        let usage = text.find("Usage\n=====\n\nOpen a quotation.").unwrap();
        let credits = text.find("Credits\n=======").unwrap();
        let history = text.find("Changelog\n=========\n\n16.0.1.0.0").unwrap();
        assert!(description < usage && usage < credits && credits < history);
        assert!(!text.contains("Installation"));
        assert!(!text.contains("Contributors"));
    }

    #[test]
    fn blank_lines_collapse_and_one_trailing_newline() {
        let text = render_readme(&fields("{}", &[], false));
        assert!(!text.contains("\n\n\n"));
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn literal_block_keeps_its_blank_lines() {
        let usage = "Example::\n\n    line one\n\n\n    line two\n";
        let text = render_readme(&fields("{}", &[(Fragment::Usage, usage)], false));
        assert!(text.contains(&format!("Usage\n=====\n\n{usage}")));
    }

    #[test]
    fn whitespace_only_fragment_keeps_its_section() {
        let text = render_readme(&fields("{}", &[(Fragment::Usage, "   \n")], false));
        assert!(text.contains("Usage\n=====\n\n   \n"));
    }

    #[test]
    fn trailing_spaces_in_last_fragment_survive() {
        let text = render_readme(&fields("{}", &[(Fragment::History, "* first release  \n")], false));
        assert!(text.ends_with("* first release  \n"));
    }

    #[test]
    fn toc_and_preload_notice() {
        let text = render_readme(&fields("{'preloadable': False}", &[], true));
        assert!(text.contains("**Table of contents**\n\n.. contents::\n   :local:\n"));
        assert!(text.contains(".. important::\n   This module is not preloadable."));

        let text = render_readme(&fields("{}", &[], false));
        assert!(!text.contains(".. contents::"));
        assert!(!text.contains(".. important::"));
    }

    #[test]
    fn credits_list_authors_and_maintainers() {
        let text = render_readme(&fields(
            "{'author': 'ADHOC SA, Odoo Community Association (OCA)', 'maintainers': ['jjscarafia'], 'website': 'www.adhoc.com.ar'}",
            &[(Fragment::Contributors, "* Someone\n")],
            false,
        ));
        assert!(text.contains("Authors\n~~~~~~~\n\n* ADHOC SA\n"));
        assert!(!text.contains("(OCA)"));
        assert!(text.contains("Contributors\n~~~~~~~~~~~~\n\n* Someone\n"));
        assert!(text.contains("Project website: www.adhoc.com.ar\n"));
        assert!(text.contains("* `jjscarafia <https://github.com/jjscarafia>`__\n"));
    }

    #[test]
    fn fragment_text_is_not_treated_as_template() {
        let text = render_readme(&fields("{}", &[(Fragment::Usage, "Use ${title} literally.\n")], false));
        assert!(text.contains("Use ${title} literally."));
    }

    #[test]
    fn generated_readme_renders_cleanly() {
        let text = render_readme(&fields(
            "{'name': 'Sale UX', 'license': 'AGPL-3', 'author': 'ADHOC SA', 'maintainers': ['jjscarafia'], 'preloadable': False}",
            &[
                (Fragment::Description, "Improves *sales*.\n"),
                (Fragment::Install, "Nothing special.\n"),
                (Fragment::Roadmap, "* more\n"),
                (Fragment::Contributors, "* Someone\n"),
                (Fragment::Credits, "Funded by ACME.\n"),
                (Fragment::History, "16.0.1.0.0\n~~~~~~~~~~\n\n* first release\n"),
            ],
            true,
        ));
        let html = genreadme_rst::render_html(&text, &genreadme_rst::Settings::default()).unwrap();
        assert!(html.contains("<h1 class=\"title\">Sale UX</h1>"));
        assert!(html.contains("gen-readme"));
        assert!(html.contains("href=\"#known-issues-roadmap\""));
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(README_FILE), "old content that is longer\n").unwrap();
        let path = write_readme(dir.path(), "new\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
    }
}
