//! Batch mode: generate a README (and preview) for every addon in a directory.

use anyhow::{Result, anyhow};
use colored::Colorize;
use genreadme_core::{GenerateReport, Generator, PreviewOutcome, RstRenderer, find_addons};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::resolve_settings;

/// Generate READMEs for the installable addons under `addons_dir`.
///
/// Failing addons do not stop the run; the command fails at the end when
/// any addon failed.
pub fn execute(cli: &Cli, addons_dir: &Path) -> Result<()> {
    let settings = resolve_settings(cli, Some(addons_dir))?;
    if let Some(source) = &settings.config_source {
        info!("configuration from {}", source.display());
    }

    let addons = find_addons(addons_dir, None).map_err(CliError::from)?;
    if addons.is_empty() {
        warn!("no installable addons under {}", addons_dir.display());
        return Ok(());
    }

    let generator = Generator::new(settings.repo, settings.options);
    let report = generator.generate_all(&addons, &RstRenderer::default());
    print_report(&report, cli.quiet);

    if report.is_success() {
        return Ok(());
    }
    Err(CliError::render(anyhow!(
        "{} of {} addons failed",
        report.failed.len(),
        addons.len()
    ))
    .into())
}

fn print_report(report: &GenerateReport, quiet: bool) {
    if !quiet {
        for outcome in &report.succeeded {
            println!("{} {}", "✓".green(), outcome.readme.display());
            for created in &outcome.created_fragments {
                println!("  {} {}", "+".cyan(), created.display());
            }
            match &outcome.preview {
                PreviewOutcome::Written(path) => println!("  {} {}", "✓".green(), path.display()),
                PreviewOutcome::SkippedManual => {
                    println!("  {} preview kept (not generated by gen-readme)", "-".yellow());
                },
                PreviewOutcome::Checked => println!("  {} renders cleanly", "✓".green()),
                PreviewOutcome::Disabled => {},
            }
        }
    }
    for failure in &report.failed {
        eprintln!("{} {}: {}", "✗".red(), failure.addon.bold(), failure.error);
    }
}
