
use clap::Args;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_identifier, check_optional_filename, resolve_project_root, AFTER_HELP, FULL_VERSION};
use crate::data_types::pipeline_report::PipelineRequest;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ProcessSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    runqc_version: String,

    /// Sample identifier, as used in the lab run folder name
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "sample")]
    #[clap(value_name = "SAMPLE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub sample: String,

    /// Run identifier, as used in the lab run folder name
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "run")]
    #[clap(value_name = "RUN")]
    #[clap(help_heading = Some("Input/Output"))]
    pub run: String,

    /// Project root containing data/, pipeline/, and script/
    #[clap(long = "project-root")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = ".")]
    pub project_root: PathBuf,

    /// Optional layout table for --csv-reformat [default: built-in DRAGEN table]
    #[clap(long = "csv-layouts")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub csv_layouts: Option<PathBuf>,

    /// Optional JSON report of every stage outcome (gzipped if it ends in .gz)
    #[clap(long = "report")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report: Option<PathBuf>,

    /// Runs small-variant benchmarking with hap.py
    #[clap(long = "happy")]
    #[clap(help_heading = Some("Stages"))]
    pub happy: bool,

    /// Adds the stratification TSV to the hap.py run
    #[clap(long = "stratified")]
    #[clap(help_heading = Some("Stages"))]
    pub stratified: bool,

    /// Runs structural-variant benchmarking with truvari
    #[clap(long = "truvari")]
    #[clap(help_heading = Some("Stages"))]
    pub truvari: bool,

    /// Reformats the raw metric CSVs into the processed folder
    #[clap(long = "csv-reformat")]
    #[clap(help_heading = Some("Stages"))]
    pub csv_reformat: bool,

    /// Disables fetching missing catalog references with the setup script
    #[clap(long = "no-auto-download")]
    #[clap(help_heading = Some("Stages"))]
    pub no_auto_download: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl ProcessSettings {
    /// True if hap.py or truvari was requested, both of which need bcftools and tabix
    pub fn needs_variant_tools(&self) -> bool {
        self.happy || self.truvari
    }

    pub fn pipeline_request(&self) -> PipelineRequest {
        PipelineRequest {
            sample: self.sample.clone(),
            run: self.run.clone(),
            happy: self.happy,
            stratified: self.stratified,
            truvari: self.truvari,
            csv_reformat: self.csv_reformat,
            auto_download: !self.no_auto_download
        }
    }
}

pub fn check_process_settings(mut settings: ProcessSettings) -> anyhow::Result<ProcessSettings> {
    // hard code the version in
    settings.runqc_version = FULL_VERSION.clone();
    info!("runqc version: {:?}", &settings.runqc_version);
    info!("Sub-command: process");
    info!("Inputs:");

    check_identifier(&settings.sample, "Sample")?;
    check_identifier(&settings.run, "Run")?;
    settings.project_root = resolve_project_root(&settings.project_root)?;
    check_optional_filename(settings.csv_layouts.as_deref(), "CSV layouts")?;

    info!("\tSample: {:?}", &settings.sample);
    info!("\tRun: {:?}", &settings.run);
    info!("\tProject root: {:?}", &settings.project_root);
    if let Some(filename) = settings.csv_layouts.as_deref() {
        info!("\tCSV layouts: {filename:?}");
    } else {
        info!("\tCSV layouts: built-in");
    }

    info!("Stages:");
    info!("\thap.py: {}", if settings.happy { "ENABLED" } else { "DISABLED" });
    if settings.happy {
        info!("\tStratified: {}", if settings.stratified { "ENABLED" } else { "DISABLED" });
    } else if settings.stratified {
        warn!("--stratified has no effect without --happy");
    }
    info!("\ttruvari: {}", if settings.truvari { "ENABLED" } else { "DISABLED" });
    info!("\tCSV reformat: {}", if settings.csv_reformat { "ENABLED" } else { "DISABLED" });
    if settings.needs_variant_tools() {
        info!("\tReference auto-download: {}", if settings.no_auto_download { "DISABLED" } else { "ENABLED" });
    }
    if !settings.needs_variant_tools() && !settings.csv_reformat {
        warn!("No stages selected, nothing will be processed");
    }

    if let Some(report_fn) = settings.report.as_deref() {
        info!("Outputs:");
        info!("\tReport: {report_fn:?}");
    }

    Ok(settings)
}
