//! Status badges shown under the README title.

use crate::{Manifest, Repository};
use tracing::debug;

const DEVELOPMENT_STATUS_URL: &str = "https://odoo-community.org/page/development-status";

/// `(status, image, alt)`, keyed by lower-cased development status.
const DEVELOPMENT_STATUS_BADGES: &[(&str, &str, &str)] = &[
    (
        "mature",
        "https://img.shields.io/badge/maturity-Mature-brightgreen.png",
        "Mature",
    ),
    (
        "production/stable",
        "https://img.shields.io/badge/maturity-Production%2FStable-green.png",
        "Production/Stable",
    ),
    (
        "beta",
        "https://img.shields.io/badge/maturity-Beta-yellow.png",
        "Beta",
    ),
    (
        "alpha",
        "https://img.shields.io/badge/maturity-Alpha-red.png",
        "Alpha",
    ),
];

/// `(license, image, link, alt)`
const LICENSE_BADGES: &[(&str, &str, &str, &str)] = &[
    (
        "AGPL-3",
        "https://img.shields.io/badge/licence-AGPL--3-blue.png",
        "http://www.gnu.org/licenses/agpl-3.0-standalone.html",
        "License: AGPL-3",
    ),
    (
        "LGPL-3",
        "https://img.shields.io/badge/licence-LGPL--3-blue.png",
        "http://www.gnu.org/licenses/lgpl-3.0-standalone.html",
        "License: LGPL-3",
    ),
    (
        "GPL-3",
        "https://img.shields.io/badge/licence-GPL--3-blue.png",
        "http://www.gnu.org/licenses/gpl-3.0-standalone.html",
        "License: GPL-3",
    ),
    (
        "OPL-1",
        "https://img.shields.io/badge/licence-OPL--1-blue.png",
        "https://www.tldrlegal.com/license/open-public-license-v1-0-opl-1-0",
        "License: OPL-1",
    ),
    (
        "OEEL-1",
        "https://img.shields.io/badge/licence-OEEL--1-blue.png",
        "https://www.tldrlegal.com/license/open-public-license-v1-0-opl-1-0",
        "License: OEEL-1",
    ),
];

/// An image link shown under the README title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Badge image URL.
    pub image: String,
    /// Where clicking the badge leads.
    pub link: String,
    /// Alternative text.
    pub alt: String,
}

impl Badge {
    fn new(image: impl Into<String>, link: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            link: link.into(),
            alt: alt.into(),
        }
    }
}

/// Badges for one addon: maturity, license, then source.
///
/// The development status defaults to `Beta`. Unknown statuses and licenses
/// produce no badge; the source badge is always present.
///
/// ```rust
/// use genreadme_core::{Manifest, Repository, resolve_badges};
///
/// let manifest = Manifest::parse("{'development_status': 'Beta', 'license': 'AGPL-3'}")?;
/// let badges = resolve_badges(&manifest, &Repository::new("O", "R", "B"), "M");
/// let alts: Vec<_> = badges.iter().map(|b| b.alt.as_str()).collect();
/// assert_eq!(alts, ["Beta", "License: AGPL-3", "O/R"]);
/// # Ok::<(), genreadme_core::Error>(())
/// ```
#[must_use]
pub fn resolve_badges(manifest: &Manifest, repo: &Repository, addon_name: &str) -> Vec<Badge> {
    let mut badges = Vec::with_capacity(3);

    let status = manifest.development_status().unwrap_or("Beta").to_lowercase();
    match DEVELOPMENT_STATUS_BADGES.iter().find(|(key, ..)| *key == status) {
        Some((_, image, alt)) => badges.push(Badge::new(*image, DEVELOPMENT_STATUS_URL, *alt)),
        None => debug!("{addon_name}: no maturity badge for status '{status}'"),
    }

    match manifest
        .license()
        .and_then(|license| LICENSE_BADGES.iter().find(|(key, ..)| *key == license))
    {
        Some((_, image, link, alt)) => badges.push(Badge::new(*image, *link, *alt)),
        None => debug!("{addon_name}: no license badge for {:?}", manifest.license()),
    }

    badges.push(source_badge(repo, addon_name));
    badges
}

/// GitHub badge linking to the addon's source tree.
#[must_use]
pub fn source_badge(repo: &Repository, addon_name: &str) -> Badge {
    // shields.io uses `--` for a literal dash inside a badge segment.
    let label = format!("{}%2F{}", repo.org_name, repo.repo_name).replace('-', "--");
    Badge::new(
        format!("https://img.shields.io/badge/github-{label}-lightgray.png?logo=github"),
        repo.source_url(addon_name),
        repo.slug(),
    )
}
