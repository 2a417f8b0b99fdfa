//! # CLI Structure and Argument Parsing
//!
//! `gen-readme` has no subcommands. The mode is picked from the arguments:
//!
//! - **Pre-commit mode**: changed files are given as positional arguments.
//!   Every addon they touch must have a `readme/` directory; nothing is written.
//! - **Batch mode**: `--addons-dir` names a directory of addons. A `README.rst`
//!   is generated for each installable addon, plus an HTML preview with
//!   `--gen-html`.
//! - Neither: the help text is printed.
//!
//! ```bash
//! # Regenerate every README and preview
//! gen-readme --addons-dir . --org-name ingadhoc --repo-name sale --branch 16.0 --gen-html
//!
//! # As a pre-commit hook
//! gen-readme sale_ux/models/sale_order.py sale_ux/__manifest__.py
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments of `gen-readme`.
#[derive(Parser, Clone, Debug)]
#[command(name = "gen-readme")]
#[command(version)]
#[command(about = "Generate README.rst and HTML previews for Odoo addons", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Changed files; checks that each touched addon has a readme/ directory
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Directory containing the addons to generate READMEs for
    #[arg(long, value_name = "DIR")]
    pub addons_dir: Option<PathBuf>,

    /// GitHub organisation the addons are published under
    #[arg(long, env = "GEN_README_ORG", value_name = "ORG")]
    pub org_name: Option<String>,

    /// GitHub repository name
    #[arg(long, env = "GEN_README_REPO", value_name = "REPO")]
    pub repo_name: Option<String>,

    /// Branch the addons live on
    #[arg(long, env = "GEN_README_BRANCH", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Also write static/description/index.html
    #[arg(long)]
    pub gen_html: bool,

    /// Render each README to validate it, without writing HTML
    #[arg(long)]
    pub check: bool,

    /// Create readme/ and empty fragment files where missing
    #[arg(long)]
    pub init_fragments: bool,

    /// Configuration file (default: .gen-readme.toml, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
