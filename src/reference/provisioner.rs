
use log::{error, info, warn};
use serde::Serialize;

use crate::reference::checker::ReferenceChecker;
use crate::toolkit::runner::{ToolInvocation, ToolRunner};

/// Exit code the setup script uses for samples it cannot fetch
pub const UNKNOWN_SAMPLE_EXIT_CODE: i32 = 2;

/// Result of one setup script invocation
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SetupOutcome {
    /// The script exited 0; holds its stdout
    Success(String),
    /// The script does not know how to fetch this sample
    UnknownSample(String),
    /// Missing script, launch failure, or any other exit code
    Failed(String)
}

/// Final answer of `ensure_references`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProvisionOutcome {
    /// True iff the references are complete now
    pub ready: bool,
    pub message: String
}

impl ProvisionOutcome {
    fn ready(message: impl Into<String>) -> Self {
        Self { ready: true, message: message.into() }
    }

    fn not_ready(message: impl Into<String>) -> Self {
        Self { ready: false, message: message.into() }
    }
}

/// Makes the references of a sample available, downloading catalog samples on request
pub struct ReferenceProvisioner<'a> {
    checker: ReferenceChecker<'a>,
    runner: &'a dyn ToolRunner
}

impl<'a> ReferenceProvisioner<'a> {
    pub fn new(checker: ReferenceChecker<'a>, runner: &'a dyn ToolRunner) -> Self {
        Self { checker, runner }
    }

    /// Runs the external setup script for the base sample, from the project root.
    /// # Arguments
    /// * `sample` - raw sample label
    /// * `check_only` - passes `--check-only` so the script does not download
    pub fn setup_reference(&self, sample: &str, check_only: bool) -> SetupOutcome {
        let layout = self.checker.layout();
        let script = layout.setup_script();
        if !script.is_file() {
            let message = format!("Setup script not found: {}", script.display());
            error!("{message}");
            return SetupOutcome::Failed(message);
        }

        let base_sample = self.checker.catalog().resolve_base_sample(sample);
        let mut invocation = ToolInvocation::new(script.to_string_lossy())
            .arg(base_sample)
            .current_dir(layout.project_root());
        if check_only {
            invocation = invocation.arg("--check-only");
        }

        let output = match self.runner.run(&invocation) {
            Ok(o) => o,
            Err(e) => {
                let message = format!("Error running setup script: {:#}", anyhow::Error::from(e));
                error!("{message}");
                return SetupOutcome::Failed(message);
            }
        };

        match output.status {
            Some(0) => {
                info!("Reference setup successful for {sample}");
                SetupOutcome::Success(output.stdout)
            },
            Some(UNKNOWN_SAMPLE_EXIT_CODE) => {
                let message = format!("Unknown sample {sample}. Manual reference setup required.");
                warn!("{message}");
                SetupOutcome::UnknownSample(message)
            },
            _ => {
                let message = format!("Reference setup failed: {}", output.stderr.trim());
                error!("{message}");
                SetupOutcome::Failed(message)
            }
        }
    }

    /// Checks the references and, if allowed, downloads missing catalog data then re-checks.
    /// Never downloads when the references are already complete.
    /// # Arguments
    /// * `sample` - raw sample label
    /// * `auto_download` - if false, a missing file is reported without side effects
    pub fn ensure_references(&self, sample: &str, auto_download: bool) -> ProvisionOutcome {
        info!("Checking references for {sample}...");
        let availability = self.checker.check_references(sample);
        if availability.ready_for_processing {
            info!("All reference files present for {sample}");
            return ProvisionOutcome::ready("All reference files present");
        }

        let missing_summary = availability.missing_summary();
        warn!("Missing reference files: {missing_summary}");
        if !auto_download {
            return ProvisionOutcome::not_ready(format!("Missing reference files: {missing_summary}"));
        }

        if !availability.is_giab {
            let sample_dir = self.checker.layout().sample_reference_dir(&availability.base_sample);
            let message = format!(
                "Sample {sample} is not a known GIAB sample. Please manually provide reference files in: {}/",
                sample_dir.display()
            );
            error!("{message}");
            return ProvisionOutcome::not_ready(message);
        }

        info!("Attempting to download GIAB references for {sample}...");
        match self.setup_reference(sample, false) {
            SetupOutcome::Success(_stdout) => {
                if self.checker.check_references(sample).ready_for_processing {
                    ProvisionOutcome::ready("Reference files downloaded successfully")
                } else {
                    ProvisionOutcome::not_ready("Download completed but some files still missing")
                }
            },
            SetupOutcome::UnknownSample(message) => {
                // the catalog and the setup script disagree about this sample
                error!("Setup script rejected {sample} although it is catalogued as {:?}", availability.giab_id);
                ProvisionOutcome::not_ready(message)
            },
            SetupOutcome::Failed(message) => ProvisionOutcome::not_ready(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::catalog::GIAB_CATALOG;
    use crate::data_types::layout::ProjectLayout;
    use crate::reference::checker::tests::{write_reference_tree, write_sample_tree};
    use crate::toolkit::mock::MockRunner;

    const SCRIPT: &str = "setup_reference.sh";

    fn write_script(layout: &ProjectLayout) {
        std::fs::create_dir_all(layout.setup_script().parent().unwrap()).unwrap();
        std::fs::write(layout.setup_script(), "#!/bin/bash\n").unwrap();
    }

    #[test]
    fn test_present_references_skip_download() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_reference_tree(&layout, "HG004");
        write_script(&layout);

        let runner = MockRunner::default();
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);
        let outcome = provisioner.ensure_references("HG004_run1", true);
        assert_eq!(outcome, ProvisionOutcome::ready("All reference files present"));
        assert_eq!(runner.count(SCRIPT), 0);
    }

    #[test]
    fn test_unknown_sample_is_manual() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_reference_tree(&layout, "HG004");
        write_script(&layout);

        let runner = MockRunner::default();
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);
        let outcome = provisioner.ensure_references("UNKNOWN123", true);
        assert!(!outcome.ready);
        assert!(outcome.message.contains("not a known GIAB sample"));
        assert!(outcome.message.contains("manually provide reference files"));
        assert!(outcome.message.ends_with("UNKNOWN123/"));
        assert_eq!(runner.count(SCRIPT), 0);
    }

    #[test]
    fn test_no_download() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_script(&layout);

        let runner = MockRunner::default();
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);
        let outcome = provisioner.ensure_references("HG002", false);
        assert!(!outcome.ready);
        assert_eq!(outcome.message, "Missing reference files: Genome: FASTA, FAI, SDF; Sample: Sample directory");
        assert_eq!(runner.count(SCRIPT), 0);
    }

    #[test]
    fn test_download_then_recheck() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_reference_tree(&layout, "HG004");
        write_script(&layout);

        // the fake script fetches the NA24143 truth files
        let hook_layout = layout.clone();
        let runner = MockRunner::default()
            .with_hook(SCRIPT, move |_inv| write_sample_tree(&hook_layout, "NA24143"));
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);

        let outcome = provisioner.ensure_references("NA24143_Lib3_Rep1", true);
        assert_eq!(outcome, ProvisionOutcome::ready("Reference files downloaded successfully"));
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["NA24143".to_string()]);
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));

        // monotonic: the second call finds everything in place
        let outcome = provisioner.ensure_references("NA24143_Lib3_Rep1", true);
        assert_eq!(outcome.message, "All reference files present");
        assert_eq!(runner.count(SCRIPT), 1);
    }

    #[test]
    fn test_download_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_script(&layout);

        let runner = MockRunner::default();
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);
        let outcome = provisioner.ensure_references("HG002", true);
        assert_eq!(outcome, ProvisionOutcome::not_ready("Download completed but some files still missing"));
    }

    #[test]
    fn test_setup_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let runner = MockRunner::default().with_exit_code(SCRIPT, UNKNOWN_SAMPLE_EXIT_CODE);
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);

        // missing script
        assert!(matches!(provisioner.setup_reference("HG002", true), SetupOutcome::Failed(_)));
        assert_eq!(runner.count(SCRIPT), 0);

        write_script(&layout);
        assert!(matches!(provisioner.setup_reference("HG002", true), SetupOutcome::UnknownSample(_)));
        assert_eq!(runner.calls()[0].args, vec!["HG002".to_string(), "--check-only".to_string()]);

        let outcome = provisioner.ensure_references("HG002", true);
        assert!(!outcome.ready);
        assert!(outcome.message.starts_with("Unknown sample HG002"));

        let runner = MockRunner::default().with_exit_code(SCRIPT, 1);
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(&layout, &GIAB_CATALOG), &runner);
        match provisioner.setup_reference("HG002", false) {
            SetupOutcome::Failed(message) => assert!(message.starts_with("Reference setup failed")),
            other => panic!("unexpected outcome {other:?}")
        }
    }
}
