
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name marker for GVCFs that were already quality filtered by the instrument pipeline
pub const HARD_FILTERED_MARKER: &str = "hard-filtered";
/// File name marker for region/type filtered derived files
pub const FILTERED_MARKER: &str = ".filtered.";
/// File name marker for chromosome-renamed derived files
pub const NORMALIZED_MARKER: &str = ".normalized.";

/// Returns true if the file name carries one of the derived-artifact markers
pub fn is_derived_artifact(path: &Path) -> bool {
    let name = file_name(path);
    name.contains(FILTERED_MARKER) || name.contains(NORMALIZED_MARKER)
}

/// File name as a lossy string, empty if there is none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The run GVCF and whether it needs region filtering
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GvcfInput {
    /// Path to the GVCF
    pub path: PathBuf,
    /// True if the file name carries the hard-filtered marker
    pub hard_filtered: bool
}

impl GvcfInput {
    pub fn new(path: PathBuf) -> Self {
        let hard_filtered = file_name(&path).contains(HARD_FILTERED_MARKER);
        Self { path, hard_filtered }
    }
}

/// The raw inputs discovered for one sample and run
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RunLocation {
    /// Sample label as provided by the caller
    pub sample: String,
    /// Run label as provided by the caller
    pub run: String,
    /// Resolved base sample used for reference lookups
    pub base_sample: String,
    /// Folder holding the raw run files
    pub input_dir: PathBuf,
    /// The primary run GVCF, if found
    pub gvcf: Option<GvcfInput>,
    /// The structural variant VCF, if found
    pub sv_vcf: Option<PathBuf>,
    /// Any raw CSV metric files, sorted
    pub csv_files: Vec<PathBuf>
}

/// Everything hap.py needs, all verified to exist
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HappyInputs {
    pub gvcf: GvcfInput,
    pub truth_vcf: PathBuf,
    pub truth_bed: PathBuf,
    pub fasta: PathBuf,
    pub fasta_index: PathBuf,
    pub sdf: PathBuf,
    /// Only present when a stratified run was requested
    pub stratification: Option<PathBuf>
}

/// Everything truvari needs before preparation, all verified to exist
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TruvariInputs {
    /// Base SV truth VCF (never a derived file)
    pub truth_vcf: PathBuf,
    /// Base SV truth BED
    pub truth_bed: PathBuf,
    /// Run SV VCF (never a derived file)
    pub run_sv_vcf: PathBuf,
    pub fasta: PathBuf
}

/// The normalized files handed to truvari
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TruvariPrepared {
    pub ref_vcf: PathBuf,
    pub run_vcf: PathBuf,
    pub bed: PathBuf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(GvcfInput::new(PathBuf::from("/x/S_r.dragen.hard-filtered.gvcf.gz")).hard_filtered);
        assert!(!GvcfInput::new(PathBuf::from("/x/S_r.dragen.gvcf.gz")).hard_filtered);
        assert!(is_derived_artifact(Path::new("/x/truth.filtered.vcf.gz")));
        assert!(is_derived_artifact(Path::new("truth.filtered.normalized.vcf.gz")));
        assert!(!is_derived_artifact(Path::new("/x.filtered.d/truth.vcf.gz")));
    }
}
