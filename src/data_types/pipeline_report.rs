
use serde::Serialize;
use std::path::PathBuf;

use crate::data_types::benchmark::BenchmarkInvocation;
use crate::parsing::happy_summary::HappyMetrics;
use crate::parsing::truvari_summary::TruvariMetrics;

/// Which stages of the pipeline to run for one sample and run
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PipelineRequest {
    pub sample: String,
    pub run: String,
    /// Small-variant benchmarking
    pub happy: bool,
    /// Adds the stratification TSV to the hap.py run
    pub stratified: bool,
    /// Structural-variant benchmarking
    pub truvari: bool,
    /// Reformat the raw CSV metric files
    pub csv_reformat: bool,
    /// Allow the reference provisioner to fetch missing catalog references
    pub auto_download: bool
}

/// The pipeline stages, in execution order
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display)]
pub enum Stage {
    #[strum(serialize = "hap.py")]
    Happy,
    #[strum(serialize = "truvari")]
    Truvari,
    #[strum(serialize = "csv-reformat")]
    CsvReformat
}

/// What a successful stage produced
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "stage")]
pub enum StageDetails {
    Happy {
        output_dir: PathBuf,
        prepared_gvcf: PathBuf,
        truth_sample: String,
        query_sample: String,
        invocation: BenchmarkInvocation,
        /// None when the summary could not be found or parsed
        metrics: Option<HappyMetrics>
    },
    Truvari {
        output_dir: PathBuf,
        invocation: BenchmarkInvocation,
        metrics: Option<TruvariMetrics>
    },
    CsvReformat {
        output_dir: PathBuf,
        reformatted: Vec<PathBuf>,
        skipped: Vec<PathBuf>
    }
}

/// Final state of a single stage
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum StageStatus {
    /// The stage was not requested
    Skipped,
    Succeeded { details: Box<StageDetails> },
    /// Error chain of the failure, outermost context first
    Failed { message: String }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus
}

/// Everything that happened during one pipeline invocation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineReport {
    pub request: PipelineRequest,
    pub stages: Vec<StageOutcome>
}

impl PipelineReport {
    /// True if no requested stage failed
    pub fn is_success(&self) -> bool {
        self.failed_stages().is_empty()
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages.iter()
            .filter(|o| matches!(o.status, StageStatus::Failed { .. }))
            .map(|o| o.stage)
            .collect()
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|o| o.stage == stage)
    }
}
