#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// A `gen-readme` command isolated from the user's configuration and environment.
#[allow(dead_code)]
pub fn gen_readme_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gen-readme"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.current_dir(workdir);
    cmd.env("GEN_README_CONFIG_DIR", workdir.join(".no-user-config"));
    cmd.env_remove("GEN_README_ORG");
    cmd.env_remove("GEN_README_REPO");
    cmd.env_remove("GEN_README_BRANCH");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Batch-mode command with repository coordinates set.
#[allow(dead_code)]
pub fn batch_cmd(workdir: &Path) -> Command {
    let mut cmd = gen_readme_cmd(workdir);
    cmd.args([
        "--addons-dir",
        ".",
        "--org-name",
        "ingadhoc",
        "--repo-name",
        "sale",
        "--branch",
        "16.0",
    ]);
    cmd
}

/// Create an addon with a manifest and no `readme/` directory.
#[allow(dead_code)]
pub fn create_bare_addon(root: &Path, name: &str, manifest: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create addon dir");
    fs::write(dir.join("__manifest__.py"), manifest).expect("write manifest");
    dir
}

/// Create an addon with a `readme/` directory holding the given `(FRAGMENT, text)` files.
#[allow(dead_code)]
pub fn create_addon(root: &Path, name: &str, manifest: &str, fragments: &[(&str, &str)]) -> PathBuf {
    let dir = create_bare_addon(root, name, manifest);
    fs::create_dir_all(dir.join("readme")).expect("create readme dir");
    for (stem, text) in fragments {
        fs::write(dir.join("readme").join(format!("{stem}.rst")), text).expect("write fragment");
    }
    dir
}

#[allow(dead_code)]
pub fn preview(addon_dir: &Path) -> PathBuf {
    addon_dir.join("static").join("description").join("index.html")
}
