
use anyhow::{bail, Context};
use log::{debug, info};
use std::path::Path;

use crate::data_types::benchmark::{BenchmarkInvocation, BenchmarkTool, HappyPaths, TruvariPaths};
use crate::data_types::layout::ProjectLayout;
use crate::toolkit::runner::{ToolInvocation, ToolRunner};
use crate::util::progress_bar::start_spinner;

pub const STRATIFICATION_FLAG: &str = "--stratification";

/// Launches the containerized benchmark wrapper scripts for one sample and run.
/// Every path handed to a script is rebound onto the container mount point.
pub struct BenchmarkInvoker<'a> {
    layout: &'a ProjectLayout,
    runner: &'a dyn ToolRunner,
    sample: String,
    run: String
}

impl<'a> BenchmarkInvoker<'a> {
    pub fn new(layout: &'a ProjectLayout, runner: &'a dyn ToolRunner, sample: &str, run: &str) -> Self {
        Self {
            layout,
            runner,
            sample: sample.to_string(),
            run: run.to_string()
        }
    }

    /// Runs `pipeline/happy.sh truth sdf query bed fasta prefix log [--stratification tsv]`
    /// # Arguments
    /// * `paths` - host paths, translated here
    /// * `stratified` - adds the stratification flag; requires `paths.stratification`
    /// # Errors
    /// * if a path is outside the project root
    /// * if the script cannot launch or exits non-zero
    pub fn run_happy(&self, paths: &HappyPaths, stratified: bool) -> anyhow::Result<BenchmarkInvocation> {
        let mut args = vec![
            self.container_path(&paths.truth_vcf)?,
            self.container_path(&paths.sdf)?,
            self.container_path(&paths.query_gvcf)?,
            self.container_path(&paths.truth_bed)?,
            self.container_path(&paths.fasta)?,
            self.container_path(&paths.output_prefix)?,
            self.container_path(&paths.log_file)?
        ];
        if stratified {
            let Some(tsv) = paths.stratification.as_deref() else {
                bail!("Stratified hap.py requested for {}_{} without a stratification file", self.sample, self.run);
            };
            args.push(STRATIFICATION_FLAG.to_string());
            args.push(self.container_path(tsv)?);
        }

        let mut invocation = self.invoke(BenchmarkTool::Happy, &self.layout.happy_script(), args)?;
        invocation.log_location = Some(paths.log_file.clone());
        Ok(invocation)
    }

    /// Runs `pipeline/truvari.sh truth query bed output_dir`
    /// # Errors
    /// * if a path is outside the project root
    /// * if the script cannot launch or exits non-zero
    pub fn run_truvari(&self, paths: &TruvariPaths) -> anyhow::Result<BenchmarkInvocation> {
        let args = vec![
            self.container_path(&paths.truth_vcf)?,
            self.container_path(&paths.query_vcf)?,
            self.container_path(&paths.truth_bed)?,
            self.container_path(&paths.output_dir)?
        ];
        let mut invocation = self.invoke(BenchmarkTool::Truvari, &self.layout.truvari_script(), args)?;
        invocation.log_location = Some(paths.output_dir.join("log.txt"));
        Ok(invocation)
    }

    fn container_path(&self, host_path: &Path) -> anyhow::Result<String> {
        self.layout.to_container(host_path)
    }

    /// Single blocking attempt of a wrapper script from the project root
    fn invoke(&self, tool: BenchmarkTool, script: &Path, args: Vec<String>) -> anyhow::Result<BenchmarkInvocation> {
        let program = script.to_string_lossy().into_owned();
        let tool_invocation = args.iter()
            .fold(ToolInvocation::new(program.clone()), |inv, a| inv.arg(a.as_str()))
            .current_dir(self.layout.project_root());
        info!("Running {tool} for {}_{}: {}", self.sample, self.run, tool_invocation.command_line());

        let spinner = start_spinner(format!("Running {tool} for {}_{}...", self.sample, self.run));
        let run_result = self.runner.run(&tool_invocation);
        spinner.finish_and_clear();

        let output = run_result
            .with_context(|| format!("{tool} failed to start for sample {}, run {}", self.sample, self.run))?;
        let exit_status = output.status;
        let output = output.into_checked(&program)
            .with_context(|| format!("{tool} failed for sample {}, run {}", self.sample, self.run))?;
        if !output.stdout.trim().is_empty() {
            debug!("{tool} stdout: {}", output.stdout.trim());
        }
        info!("{tool} finished for {}_{}", self.sample, self.run);

        let arguments = std::iter::once(program)
            .chain(args)
            .collect();
        Ok(BenchmarkInvocation {
            tool,
            arguments,
            exit_status,
            log_location: None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::mock::MockRunner;
    use std::path::PathBuf;

    fn happy_paths(root: &Path, stratification: Option<PathBuf>) -> HappyPaths {
        let reference = root.join("data/reference");
        HappyPaths {
            truth_vcf: reference.join("HG004/truth.vcf.gz"),
            sdf: reference.join("GRCh38.sdf"),
            query_gvcf: root.join("data/lab_runs/HG004_run1/x.filtered.gvcf.gz"),
            truth_bed: reference.join("HG004/truth.bed"),
            fasta: reference.join("ref.fasta"),
            output_prefix: root.join("data/processed/20230102_HG004_run1/HG004_run1"),
            log_file: root.join("data/processed/20230102_HG004_run1/happy.HG004.run1.log"),
            stratification
        }
    }

    #[test]
    fn test_happy_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let runner = MockRunner::default();
        let invoker = BenchmarkInvoker::new(&layout, &runner, "HG004", "run1");

        let strat = layout.stratification_tsv("HG004");
        let invocation = invoker.run_happy(&happy_paths(dir.path(), Some(strat)), false).unwrap();
        assert_eq!(invocation.tool, BenchmarkTool::Happy);
        assert_eq!(invocation.exit_status, Some(0));
        assert_eq!(&invocation.arguments[1..], &[
            "/wgs/data/reference/HG004/truth.vcf.gz",
            "/wgs/data/reference/GRCh38.sdf",
            "/wgs/data/lab_runs/HG004_run1/x.filtered.gvcf.gz",
            "/wgs/data/reference/HG004/truth.bed",
            "/wgs/data/reference/ref.fasta",
            "/wgs/data/processed/20230102_HG004_run1/HG004_run1",
            "/wgs/data/processed/20230102_HG004_run1/happy.HG004.run1.log"
        ]);
        assert!(!invocation.arguments.iter().any(|a| a == STRATIFICATION_FLAG));

        let calls = runner.calls();
        assert!(calls[0].program.ends_with("pipeline/happy.sh"));
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_happy_stratified() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let runner = MockRunner::default();
        let invoker = BenchmarkInvoker::new(&layout, &runner, "HG004", "run1");

        let strat = layout.stratification_tsv("HG004");
        let invocation = invoker.run_happy(&happy_paths(dir.path(), Some(strat)), true).unwrap();
        let n = invocation.arguments.len();
        assert_eq!(invocation.arguments[n - 2], STRATIFICATION_FLAG);
        assert_eq!(invocation.arguments[n - 1], "/wgs/data/reference/HG004/GRCh38_strat/GRCh38-all-stratifications.tsv");

        assert!(invoker.run_happy(&happy_paths(dir.path(), None), true).is_err());
    }

    #[test]
    fn test_failure_context() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let runner = MockRunner::default().with_exit_code("truvari.sh", 1);
        let invoker = BenchmarkInvoker::new(&layout, &runner, "HG002", "runA");

        let paths = TruvariPaths {
            truth_vcf: dir.path().join("data/reference/HG002/stvar/sv.normalized.vcf.gz"),
            query_vcf: dir.path().join("data/lab_runs/HG002_runA/x.sv.filtered.vcf.gz"),
            truth_bed: dir.path().join("data/reference/HG002/stvar/sv.normalized.bed"),
            output_dir: dir.path().join("data/processed/HG002_runA/truvari")
        };
        let err = invoker.run_truvari(&paths).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("truvari failed for sample HG002, run runA"));
        assert_eq!(runner.count("truvari.sh"), 1);

        // outside of the project root
        let mut outside = paths.clone();
        outside.query_vcf = PathBuf::from("/elsewhere/x.vcf.gz");
        assert!(invoker.run_truvari(&outside).is_err());
        assert_eq!(runner.count("truvari.sh"), 1);
    }
}
