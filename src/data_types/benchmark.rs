
use serde::Serialize;
use std::path::PathBuf;

/// The two supported benchmarking tools
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display, strum_macros::AsRefStr)]
pub enum BenchmarkTool {
    /// Small-variant comparison
    #[strum(serialize = "hap.py")]
    Happy,
    /// Structural-variant comparison
    #[strum(serialize = "truvari")]
    Truvari
}

/// Host paths for a single hap.py invocation
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HappyPaths {
    pub truth_vcf: PathBuf,
    pub sdf: PathBuf,
    /// The prepared (filtered + indexed) run GVCF
    pub query_gvcf: PathBuf,
    pub truth_bed: PathBuf,
    pub fasta: PathBuf,
    /// Output prefix; hap.py appends `.summary.csv` etc.
    pub output_prefix: PathBuf,
    pub log_file: PathBuf,
    pub stratification: Option<PathBuf>
}

/// Host paths for a single truvari invocation
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TruvariPaths {
    pub truth_vcf: PathBuf,
    pub query_vcf: PathBuf,
    pub truth_bed: PathBuf,
    /// truvari output folder, must not pre-exist for truvari itself
    pub output_dir: PathBuf
}

/// Record of one benchmarking child process
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BenchmarkInvocation {
    pub tool: BenchmarkTool,
    /// Full argument list after container path translation, script first
    pub arguments: Vec<String>,
    /// Process exit code; None if terminated by a signal
    pub exit_status: Option<i32>,
    /// Where the tool writes its log, if it has one
    pub log_location: Option<PathBuf>
}
