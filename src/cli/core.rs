
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};

use crate::cli::process::ProcessSettings;
use crate::cli::reference::ReferenceSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}     runqc contributors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// runqc, reference provisioning and benchmarking for sequencing runs.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Runs the requested benchmark and reformat stages for one sample and run
    Process(Box<ProcessSettings>),
    /// Reports on or provisions the reference files of a sample
    Reference(Box<ReferenceSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if an optional file exists and will otherwise exit
/// # Arguments
/// * `opt_filename` - the file path to check for, if any
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

/// Returns the absolute form of the project root.
/// Child processes are started from inside the root, so relative script paths would resolve twice.
/// # Arguments
/// * `project_root` - the user provided root folder
/// # Errors
/// * if the folder does not exist or cannot be resolved
pub fn resolve_project_root(project_root: &Path) -> anyhow::Result<PathBuf> {
    check_required_filename(project_root, "Project root")?;
    std::fs::canonicalize(project_root)
        .with_context(|| format!("Error while resolving project root {project_root:?}:"))
}

/// Sample and run identifiers become path components, so they must be plain names
/// # Arguments
/// * `value` - the identifier to check
/// * `label` - the label to use for error messages
pub fn check_identifier(value: &str, label: &str) -> anyhow::Result<()> {
    if value.is_empty() {
        bail!("{label} must not be empty");
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        bail!("{label} must not contain path separators: {value:?}");
    }
    Ok(())
}
