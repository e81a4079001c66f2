
use itertools::Itertools;
use serde::{Serialize, Serializer};

/// Every class of file the pipeline can require, used for missing-file reporting
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum_macros::Display, strum_macros::AsRefStr)]
pub enum ArtifactKind {
    /// Shared reference genome FASTA
    #[strum(serialize = "FASTA")]
    GenomeFasta,
    /// Index of the shared reference FASTA
    #[strum(serialize = "FAI")]
    GenomeFastaIndex,
    /// Sequence-data-format index used by hap.py
    #[strum(serialize = "SDF")]
    GenomeSdf,
    /// The per-sample reference folder itself
    #[strum(serialize = "Sample directory")]
    SampleDirectory,
    /// Small-variant truth set
    #[strum(serialize = "Truth VCF")]
    TruthVcf,
    /// Confident regions for the small-variant truth set
    #[strum(serialize = "Confident regions BED")]
    ConfidentBed,
    /// The structural variant sub-folder is absent entirely
    #[strum(serialize = "SV directory")]
    SvDirectory,
    /// The structural variant sub-folder exists but is incomplete
    #[strum(serialize = "SV reference files")]
    SvReferenceFiles,
    /// Structural variant truth set
    #[strum(serialize = "SV truth VCF")]
    SvTruthVcf,
    /// Confident regions for the structural variant truth set
    #[strum(serialize = "SV truth BED")]
    SvTruthBed,
    /// Stratification file-of-filenames for hap.py
    #[strum(serialize = "Stratification TSV")]
    StratificationTsv,
    /// The raw lab run folder
    #[strum(serialize = "Run directory")]
    RunDirectory,
    /// The run GVCF
    #[strum(serialize = "Run GVCF")]
    RunGvcf,
    /// The run structural variant VCF
    #[strum(serialize = "Run SV VCF")]
    RunSvVcf,
}

// reports use the human readable label rather than the variant name
impl Serialize for ArtifactKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

/// Result of checking a group of artifacts for existence
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ArtifactCheck {
    /// True if nothing is missing
    pub complete: bool,
    /// Every missing kind, in check order
    pub missing: Vec<ArtifactKind>,
}

impl ArtifactCheck {
    /// Builds the check result from the list of missing kinds
    pub fn from_missing(missing: Vec<ArtifactKind>) -> Self {
        Self {
            complete: missing.is_empty(),
            missing
        }
    }

    /// Comma separated labels of the missing kinds
    pub fn missing_labels(&self) -> String {
        self.missing.iter().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ArtifactKind::GenomeFasta.to_string(), "FASTA");
        assert_eq!(ArtifactKind::ConfidentBed.as_ref(), "Confident regions BED");

        let check = ArtifactCheck::from_missing(vec![ArtifactKind::TruthVcf, ArtifactKind::SvDirectory]);
        assert!(!check.complete);
        assert_eq!(check.missing_labels(), "Truth VCF, SV directory");

        let check = ArtifactCheck::from_missing(vec![]);
        assert!(check.complete);
        assert_eq!(check.missing_labels(), "");
    }

    #[test]
    fn test_serialize_label() {
        let check = ArtifactCheck::from_missing(vec![ArtifactKind::GenomeSdf, ArtifactKind::SampleDirectory]);
        let json = serde_json::to_string(&check).unwrap();
        assert_eq!(json, r#"{"complete":false,"missing":["SDF","Sample directory"]}"#);
    }
}
