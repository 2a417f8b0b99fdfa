//! GitHub coordinates of the repository holding the addons.

use crate::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Organisation, repository and branch the addons are published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// GitHub organisation, e.g. `ingadhoc`.
    pub org_name: String,
    /// Repository name, e.g. `account-financial-tools`.
    pub repo_name: String,
    /// Branch, usually the Odoo series, e.g. `16.0`.
    pub branch: String,
}

impl Repository {
    /// Create repository coordinates.
    pub fn new(org_name: impl Into<String>, repo_name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            repo_name: repo_name.into(),
            branch: branch.into(),
        }
    }

    /// `org/repo`
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.org_name, self.repo_name)
    }

    /// Base URL for raw files of one addon, with a trailing slash so that
    /// relative paths join underneath it.
    ///
    /// ```rust
    /// use genreadme_core::Repository;
    ///
    /// let repo = Repository::new("O", "R", "B");
    /// let url = repo.module_url("M")?;
    /// assert_eq!(url.as_str(), "https://raw.githubusercontent.com/O/R/B/M/");
    /// assert_eq!(url.join("foo.png")?.as_str(), "https://raw.githubusercontent.com/O/R/B/M/foo.png");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn module_url(&self, addon: &str) -> Result<Url> {
        let url = Url::parse(&format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}/",
            self.org_name, self.repo_name, self.branch, addon
        ))?;
        Ok(url)
    }

    /// Browsable source tree of one addon.
    #[must_use]
    pub fn source_url(&self, addon: &str) -> String {
        format!(
            "https://github.com/{}/{}/tree/{}/{}",
            self.org_name, self.repo_name, self.branch, addon
        )
    }

    /// Issue tracker of the repository.
    #[must_use]
    pub fn issues_url(&self) -> String {
        format!("https://github.com/{}/{}/issues", self.org_name, self.repo_name)
    }
}
