
use clap::{Args, ValueEnum};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_identifier, resolve_project_root, AFTER_HELP, FULL_VERSION};

/// What to do with the references of a sample
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceAction {
    /// Per-file existence and paths
    #[default]
    Status,
    /// Availability summary only
    Check,
    /// Fetch missing catalog references with the setup script
    Setup
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ReferenceSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    runqc_version: String,

    /// Sample identifier; aliases resolve to their catalog base sample
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "sample")]
    #[clap(value_name = "SAMPLE")]
    pub sample: String,

    /// Reference action to perform
    #[clap(short = 'a')]
    #[clap(long = "action")]
    #[clap(value_enum)]
    #[clap(default_value_t = ReferenceAction::Status)]
    pub action: ReferenceAction,

    /// Project root containing data/, pipeline/, and script/
    #[clap(long = "project-root")]
    #[clap(value_name = "DIR")]
    #[clap(default_value = ".")]
    pub project_root: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_reference_settings(mut settings: ReferenceSettings) -> anyhow::Result<ReferenceSettings> {
    // hard code the version in
    settings.runqc_version = FULL_VERSION.clone();
    info!("runqc version: {:?}", &settings.runqc_version);
    info!("Sub-command: reference");
    info!("Inputs:");

    check_identifier(&settings.sample, "Sample")?;
    settings.project_root = resolve_project_root(&settings.project_root)?;

    info!("\tSample: {:?}", &settings.sample);
    info!("\tAction: {}", settings.action);
    info!("\tProject root: {:?}", &settings.project_root);

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(ReferenceAction::Status.to_string(), "status");
        assert_eq!(ReferenceAction::from_str("setup", true), Ok(ReferenceAction::Setup));
        assert!(ReferenceAction::from_str("download", true).is_err());
    }

    #[test]
    fn test_check_reference_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ReferenceSettings {
            sample: "HG002".to_string(),
            project_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        let checked = check_reference_settings(settings).unwrap();
        assert_eq!(checked.action, ReferenceAction::Status);
        assert_eq!(checked.runqc_version, *FULL_VERSION);
    }
}
