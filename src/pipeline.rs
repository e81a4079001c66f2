
use anyhow::{bail, Context};
use itertools::Itertools;
use log::{error, info, warn};
use std::path::PathBuf;

use crate::benchmark_invoker::BenchmarkInvoker;
use crate::data_types::benchmark::{HappyPaths, TruvariPaths};
use crate::data_types::catalog::ReferenceCatalog;
use crate::data_types::layout::ProjectLayout;
use crate::data_types::pipeline_report::{PipelineReport, PipelineRequest, Stage, StageDetails, StageOutcome, StageStatus};
use crate::data_types::run_location::file_name;
use crate::output_resolver::OutputResolver;
use crate::parsing::csv_layouts::CsvLayoutTable;
use crate::parsing::happy_summary::{find_happy_summary, parse_happy_summary};
use crate::parsing::truvari_summary::parse_truvari_summary;
use crate::preparer::VariantPreparer;
use crate::reference::checker::ReferenceChecker;
use crate::reference::provisioner::ReferenceProvisioner;
use crate::run_files::RunFileLocator;
use crate::toolkit::runner::ToolRunner;
use crate::toolkit::variant_tools::VariantToolkit;
use crate::util::checksum::verify_md5_sidecar;
use crate::util::run_lock::RunLock;
use crate::writers::csv_reformat::reformat_csv;
use crate::writers::summary::{BenchmarkSummaryWriter, BENCHMARK_SUMMARY_NAME};

/// hap.py summary row kept for a run
pub const HAPPY_SUMMARY_TYPE: &str = "SNP";
pub const HAPPY_SUMMARY_FILTER: &str = "ALL";
/// Sub-folder of the output folder that truvari writes into
pub const TRUVARI_SUBDIR: &str = "truvari";
pub const TRUVARI_SUMMARY_NAME: &str = "summary.json";

/// Sequences the benchmark and reformat stages for one sample and run.
/// Stages are independent: a failure is recorded and the next stage is still attempted.
pub struct Pipeline<'a> {
    layout: &'a ProjectLayout,
    catalog: &'a ReferenceCatalog,
    runner: &'a dyn ToolRunner,
    csv_layouts: &'a CsvLayoutTable
}

impl<'a> Pipeline<'a> {
    pub fn new(layout: &'a ProjectLayout, catalog: &'a ReferenceCatalog, runner: &'a dyn ToolRunner, csv_layouts: &'a CsvLayoutTable) -> Self {
        Self {
            layout,
            catalog,
            runner,
            csv_layouts
        }
    }

    fn toolkit(&self) -> VariantToolkit<'a> {
        VariantToolkit::new(self.runner)
    }

    fn locator(&self) -> RunFileLocator<'a> {
        RunFileLocator::new(self.layout, self.catalog)
    }

    /// Runs every requested stage while holding the run lease
    /// # Errors
    /// * if another invocation holds the lease for this sample and run
    /// Stage failures are reported in the returned `PipelineReport` instead.
    pub fn run_pipeline(&self, request: &PipelineRequest) -> anyhow::Result<PipelineReport> {
        let lock = RunLock::acquire(&self.layout.run_lock_file(&request.sample, &request.run))?;
        info!("Processing sample {} run {}", request.sample, request.run);

        let mut summary_writer = BenchmarkSummaryWriter::new(&request.sample, &request.run);
        let stages = vec![
            self.run_stage(Stage::Happy, request, request.happy, || self.happy_stage(request)),
            self.run_stage(Stage::Truvari, request, request.truvari, || self.truvari_stage(request)),
            self.run_stage(Stage::CsvReformat, request, request.csv_reformat, || self.csv_stage(request))
        ];

        // the summary goes next to every benchmark output
        let mut summary_dirs: Vec<PathBuf> = vec![];
        for outcome in stages.iter() {
            let StageStatus::Succeeded { details } = &outcome.status else {
                continue;
            };
            match details.as_ref() {
                StageDetails::Happy { output_dir, metrics, .. } => {
                    if let Some(m) = metrics {
                        summary_writer.add_happy(m);
                    }
                    summary_dirs.push(output_dir.clone());
                },
                StageDetails::Truvari { output_dir, metrics, .. } => {
                    if let Some(m) = metrics {
                        summary_writer.add_truvari(m);
                    }
                    summary_dirs.push(output_dir.clone());
                },
                StageDetails::CsvReformat { .. } => {}
            }
        }
        if !summary_writer.is_empty() {
            for output_dir in summary_dirs.into_iter().unique() {
                let summary_fn = output_dir.join(BENCHMARK_SUMMARY_NAME);
                match summary_writer.write_summary(&summary_fn) {
                    Ok(()) => info!("Benchmark summary written to {summary_fn:?}"),
                    Err(e) => warn!("Failed to write benchmark summary {summary_fn:?}: {e}")
                }
            }
        }

        let report = PipelineReport {
            request: request.clone(),
            stages
        };
        if report.is_success() {
            info!("Finished sample {} run {}", request.sample, request.run);
        } else {
            error!("Failed stages for sample {} run {}: {}", request.sample, request.run, report.failed_stages().iter().join(", "));
        }
        drop(lock);
        Ok(report)
    }

    /// Runs one stage if selected; a failure is recorded with the sample and run attached
    fn run_stage<F>(&self, stage: Stage, request: &PipelineRequest, selected: bool, stage_fn: F) -> StageOutcome
    where
        F: FnOnce() -> anyhow::Result<StageDetails>
    {
        let status = if !selected {
            StageStatus::Skipped
        } else {
            info!("Starting {stage} stage");
            let result = stage_fn()
                .with_context(|| format!("{stage} failed for sample {}, run {}", request.sample, request.run));
            match result {
                Ok(details) => {
                    info!("{stage} stage finished");
                    StageStatus::Succeeded { details: Box::new(details) }
                },
                Err(e) => {
                    let message = format!("{e:#}");
                    error!("{stage} stage failed: {message}");
                    StageStatus::Failed { message }
                }
            }
        };
        StageOutcome { stage, status }
    }

    /// Converts a not-ready provisioning answer into a stage failure
    fn require_references(&self, sample: &str, auto_download: bool) -> anyhow::Result<()> {
        let provisioner = ReferenceProvisioner::new(ReferenceChecker::new(self.layout, self.catalog), self.runner);
        let outcome = provisioner.ensure_references(sample, auto_download);
        if !outcome.ready {
            bail!("Reference files not ready for {sample}: {}", outcome.message);
        }
        info!("Reference files verified for {sample}");
        Ok(())
    }

    fn happy_stage(&self, request: &PipelineRequest) -> anyhow::Result<StageDetails> {
        let (sample, run) = (request.sample.as_str(), request.run.as_str());
        self.require_references(sample, request.auto_download)?;

        let locator = self.locator();
        let location = locator.locate_run_files(sample, run)?;
        let inputs = locator.happy_inputs(&location, request.stratified)?;

        verify_md5_sidecar(&inputs.gvcf.path)?;
        let toolkit = self.toolkit();
        let output_dir = OutputResolver::new(self.layout)
            .dated_output_dir(sample, run, &inputs.gvcf.path, &toolkit)?;

        let truth_sample = toolkit.sample_names(&inputs.truth_vcf)
            .with_context(|| format!("Error while reading sample names from {:?}:", inputs.truth_vcf))?
            .join(",");
        let query_sample = toolkit.sample_names(&inputs.gvcf.path)
            .with_context(|| format!("Error while reading sample names from {:?}:", inputs.gvcf.path))?
            .join(",");
        info!("Comparing query sample {query_sample:?} against truth sample {truth_sample:?}");

        let prepared_gvcf = VariantPreparer::new(toolkit).prepare_for_happy(&inputs)?;
        let paths = HappyPaths {
            truth_vcf: inputs.truth_vcf.clone(),
            sdf: inputs.sdf.clone(),
            query_gvcf: prepared_gvcf.clone(),
            truth_bed: inputs.truth_bed.clone(),
            fasta: inputs.fasta.clone(),
            output_prefix: output_dir.join(ProjectLayout::run_token(sample, run)),
            log_file: output_dir.join(format!("happy.{sample}.{run}.log")),
            stratification: inputs.stratification.clone()
        };
        let invocation = BenchmarkInvoker::new(self.layout, self.runner, sample, run)
            .run_happy(&paths, request.stratified)?;

        let metrics = find_happy_summary(&output_dir)
            .and_then(|summary_fn| parse_happy_summary(&summary_fn, HAPPY_SUMMARY_TYPE, HAPPY_SUMMARY_FILTER))
            .unwrap_or_else(|e| {
                warn!("hap.py metrics unavailable: {e:#}");
                None
            });

        Ok(StageDetails::Happy {
            output_dir,
            prepared_gvcf,
            truth_sample,
            query_sample,
            invocation,
            metrics
        })
    }

    fn truvari_stage(&self, request: &PipelineRequest) -> anyhow::Result<StageDetails> {
        let (sample, run) = (request.sample.as_str(), request.run.as_str());
        self.require_references(sample, request.auto_download)?;

        let locator = self.locator();
        let location = locator.locate_run_files(sample, run)?;
        let inputs = locator.truvari_inputs(&location)?;
        let output_dir = OutputResolver::new(self.layout)
            .resolve_output_dir(&ProjectLayout::run_token(sample, run))?;

        let prepared = VariantPreparer::new(self.toolkit()).prepare_for_truvari(&inputs)?;
        let paths = TruvariPaths {
            truth_vcf: prepared.ref_vcf,
            query_vcf: prepared.run_vcf,
            truth_bed: prepared.bed,
            output_dir: output_dir.join(TRUVARI_SUBDIR)
        };
        let invocation = BenchmarkInvoker::new(self.layout, self.runner, sample, run)
            .run_truvari(&paths)?;

        let metrics = match parse_truvari_summary(&paths.output_dir.join(TRUVARI_SUMMARY_NAME)) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("truvari metrics unavailable: {e:#}");
                None
            }
        };

        Ok(StageDetails::Truvari {
            output_dir,
            invocation,
            metrics
        })
    }

    fn csv_stage(&self, request: &PipelineRequest) -> anyhow::Result<StageDetails> {
        let (sample, run) = (request.sample.as_str(), request.run.as_str());
        let location = self.locator().locate_run_files(sample, run)?;
        let output_dir = OutputResolver::new(self.layout)
            .resolve_output_dir(&ProjectLayout::run_token(sample, run))?;

        if location.csv_files.is_empty() {
            info!("No CSV files found in {:?}", location.input_dir);
        }
        let mut reformatted = vec![];
        let mut skipped = vec![];
        for csv_fn in location.csv_files.iter() {
            let name = file_name(csv_fn);
            match self.csv_layouts.find(&name) {
                Some(layout) => {
                    let output_fn = output_dir.join(&name);
                    let rows = reformat_csv(csv_fn, &output_fn, layout)?;
                    info!("Reformatted {name} ({rows} rows)");
                    reformatted.push(output_fn);
                },
                None => {
                    info!("No layout registered for {name}, skipping");
                    skipped.push(csv_fn.clone());
                }
            }
        }

        Ok(StageDetails::CsvReformat {
            output_dir,
            reformatted,
            skipped
        })
    }
}
