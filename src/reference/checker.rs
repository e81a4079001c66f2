
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::data_types::artifacts::{ArtifactCheck, ArtifactKind};
use crate::data_types::catalog::ReferenceCatalog;
use crate::data_types::layout::ProjectLayout;
use crate::util::file_search::find_with_suffix;

pub const VCF_SUFFIX: &str = ".vcf.gz";
pub const BED_SUFFIX: &str = ".bed";

/// Snapshot of everything known about the references of one sample
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReferenceAvailability {
    /// Sample label as provided
    pub sample_name: String,
    /// Key used for the sample reference folder
    pub base_sample: String,
    /// True if the sample is in the catalog and can be downloaded
    pub is_giab: bool,
    /// Canonical catalog id, e.g. HG004
    pub giab_id: Option<String>,
    pub genome_reference: ArtifactCheck,
    pub sample_reference: ArtifactCheck,
    /// True iff both groups are complete
    pub ready_for_processing: bool
}

impl ReferenceAvailability {
    /// `Genome: ..; Sample: ..` description of the missing groups
    pub fn missing_summary(&self) -> String {
        let mut groups = vec![];
        if !self.genome_reference.complete {
            groups.push(format!("Genome: {}", self.genome_reference.missing_labels()));
        }
        if !self.sample_reference.complete {
            groups.push(format!("Sample: {}", self.sample_reference.missing_labels()));
        }
        groups.join("; ")
    }
}

/// Existence and location of a single reference file
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileStatus {
    pub exists: bool,
    /// Only set when the file exists
    pub path: Option<PathBuf>
}

impl FileStatus {
    fn from_path(path: PathBuf) -> Self {
        let exists = path.exists();
        Self {
            exists,
            path: exists.then_some(path)
        }
    }

    fn from_first(mut candidates: Vec<PathBuf>) -> Self {
        if candidates.is_empty() {
            Self { exists: false, path: None }
        } else {
            Self { exists: true, path: Some(candidates.swap_remove(0)) }
        }
    }
}

/// Per file details grouped by genome, sample, and SV references
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ReferenceFiles {
    pub genome: IndexMap<String, FileStatus>,
    pub sample: IndexMap<String, FileStatus>,
    pub sv: IndexMap<String, FileStatus>
}

/// Availability snapshot plus the per file details
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReferenceStatus {
    #[serde(flatten)]
    pub availability: ReferenceAvailability,
    pub files: ReferenceFiles
}

/// Read-only existence checks against the reference tree; nothing is cached
#[derive(Clone, Copy)]
pub struct ReferenceChecker<'a> {
    layout: &'a ProjectLayout,
    catalog: &'a ReferenceCatalog
}

impl<'a> ReferenceChecker<'a> {
    pub fn new(layout: &'a ProjectLayout, catalog: &'a ReferenceCatalog) -> Self {
        Self { layout, catalog }
    }

    pub fn layout(&self) -> &'a ProjectLayout {
        self.layout
    }

    pub fn catalog(&self) -> &'a ReferenceCatalog {
        self.catalog
    }

    /// Checks the shared genome FASTA, its index, and the SDF
    pub fn check_genome(&self) -> ArtifactCheck {
        let required = [
            (ArtifactKind::GenomeFasta, self.layout.genome_fasta()),
            (ArtifactKind::GenomeFastaIndex, self.layout.genome_fasta_index()),
            (ArtifactKind::GenomeSdf, self.layout.genome_sdf())
        ];
        let missing = required.into_iter()
            .filter(|(_kind, path)| !path.exists())
            .map(|(kind, _path)| kind)
            .collect();
        ArtifactCheck::from_missing(missing)
    }

    /// Checks the truth files of a sample.
    /// A missing sample folder is reported alone since nothing below it can exist.
    /// # Arguments
    /// * `sample` - the raw sample label, resolved to its base sample here
    pub fn check_sample(&self, sample: &str) -> ArtifactCheck {
        let base_sample = self.catalog.resolve_base_sample(sample);
        let sample_dir = self.layout.sample_reference_dir(&base_sample);
        if !sample_dir.is_dir() {
            return ArtifactCheck::from_missing(vec![ArtifactKind::SampleDirectory]);
        }

        let mut missing = vec![];
        if !has_suffix_file(&sample_dir, VCF_SUFFIX) {
            missing.push(ArtifactKind::TruthVcf);
        }
        if !has_suffix_file(&sample_dir, BED_SUFFIX) {
            missing.push(ArtifactKind::ConfidentBed);
        }

        let sv_dir = self.layout.sv_reference_dir(&base_sample);
        if !sv_dir.is_dir() {
            missing.push(ArtifactKind::SvDirectory);
        } else if !has_suffix_file(&sv_dir, VCF_SUFFIX) || !has_suffix_file(&sv_dir, BED_SUFFIX) {
            missing.push(ArtifactKind::SvReferenceFiles);
        }
        ArtifactCheck::from_missing(missing)
    }

    /// Combines the genome and sample checks with the catalog lookups
    pub fn check_references(&self, sample: &str) -> ReferenceAvailability {
        let genome_reference = self.check_genome();
        let sample_reference = self.check_sample(sample);
        let ready_for_processing = genome_reference.complete && sample_reference.complete;
        let availability = ReferenceAvailability {
            sample_name: sample.to_string(),
            base_sample: self.catalog.resolve_base_sample(sample),
            is_giab: self.catalog.is_catalog_sample(sample),
            giab_id: self.catalog.catalog_id(sample).map(String::from),
            genome_reference,
            sample_reference,
            ready_for_processing
        };
        debug!("Reference availability for {sample}: {availability:?}");
        availability
    }

    /// Availability snapshot plus the first matching file of each kind
    pub fn reference_status(&self, sample: &str) -> ReferenceStatus {
        let availability = self.check_references(sample);
        let mut files = ReferenceFiles::default();

        files.genome.insert("fasta".to_string(), FileStatus::from_path(self.layout.genome_fasta()));
        files.genome.insert("fai".to_string(), FileStatus::from_path(self.layout.genome_fasta_index()));
        files.genome.insert("sdf".to_string(), FileStatus::from_path(self.layout.genome_sdf()));

        let sample_dir = self.layout.sample_reference_dir(&availability.base_sample);
        if sample_dir.is_dir() {
            files.sample.insert("vcf".to_string(), FileStatus::from_first(list_or_empty(&sample_dir, VCF_SUFFIX)));
            files.sample.insert("bed".to_string(), FileStatus::from_first(list_or_empty(&sample_dir, BED_SUFFIX)));

            let sv_dir = self.layout.sv_reference_dir(&availability.base_sample);
            if sv_dir.is_dir() {
                files.sv.insert("vcf".to_string(), FileStatus::from_first(list_or_empty(&sv_dir, VCF_SUFFIX)));
                files.sv.insert("bed".to_string(), FileStatus::from_first(list_or_empty(&sv_dir, BED_SUFFIX)));
            }
        }

        ReferenceStatus {
            availability,
            files
        }
    }
}

/// Unreadable folders count as empty for existence checks
fn list_or_empty(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    find_with_suffix(dir, suffix).unwrap_or_else(|e| {
        debug!("Treating {dir:?} as empty: {e:#}");
        vec![]
    })
}

fn has_suffix_file(dir: &Path, suffix: &str) -> bool {
    !list_or_empty(dir, suffix).is_empty()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data_types::catalog::GIAB_CATALOG;

    /// Writes the genome files plus a complete HG004 sample tree
    pub(crate) fn write_reference_tree(layout: &ProjectLayout, base_sample: &str) {
        std::fs::create_dir_all(layout.reference_dir()).unwrap();
        std::fs::write(layout.genome_fasta(), ">chr1\nACGT\n").unwrap();
        std::fs::write(layout.genome_fasta_index(), "chr1\t4\t6\t4\t5\nchr2\t4\t20\t4\t5\n").unwrap();
        std::fs::create_dir_all(layout.genome_sdf()).unwrap();
        write_sample_tree(layout, base_sample);
    }

    pub(crate) fn write_sample_tree(layout: &ProjectLayout, base_sample: &str) {
        let sample_dir = layout.sample_reference_dir(base_sample);
        let sv_dir = layout.sv_reference_dir(base_sample);
        std::fs::create_dir_all(&sv_dir).unwrap();
        std::fs::write(sample_dir.join(format!("{base_sample}_benchmark.vcf.gz")), "vcf").unwrap();
        std::fs::write(sample_dir.join(format!("{base_sample}_benchmark.bed")), "chr1\t0\t4\n").unwrap();
        std::fs::write(sv_dir.join(format!("{base_sample}_sv.vcf.gz")), "vcf").unwrap();
        std::fs::write(sv_dir.join(format!("{base_sample}_sv.bed")), "1\t0\t4\n").unwrap();
    }

    #[test]
    fn test_complete_tree() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        write_reference_tree(&layout, "HG004");

        let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);
        let availability = checker.check_references("HG004_run1");
        assert!(availability.ready_for_processing);
        assert_eq!(availability.base_sample, "HG004");
        assert!(availability.is_giab);
        assert_eq!(availability.giab_id.as_deref(), Some("HG004"));
        assert_eq!(availability.missing_summary(), "");
    }

    #[test]
    fn test_missing_sample_directory() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);

        let availability = checker.check_references("UNKNOWN123");
        assert!(!availability.ready_for_processing);
        assert!(!availability.is_giab);
        assert_eq!(availability.giab_id, None);
        assert_eq!(availability.genome_reference.missing, vec![
            ArtifactKind::GenomeFasta, ArtifactKind::GenomeFastaIndex, ArtifactKind::GenomeSdf
        ]);
        assert_eq!(availability.sample_reference.missing, vec![ArtifactKind::SampleDirectory]);
        assert_eq!(availability.missing_summary(), "Genome: FASTA, FAI, SDF; Sample: Sample directory");
    }

    #[test]
    fn test_single_missing_genome_artifact() {
        let removals: [(ArtifactKind, fn(&ProjectLayout) -> PathBuf); 3] = [
            (ArtifactKind::GenomeFasta, ProjectLayout::genome_fasta),
            (ArtifactKind::GenomeFastaIndex, ProjectLayout::genome_fasta_index),
            (ArtifactKind::GenomeSdf, ProjectLayout::genome_sdf)
        ];
        for (kind, artifact_path) in removals {
            let dir = tempfile::tempdir().unwrap();
            let layout = ProjectLayout::new(dir.path());
            write_reference_tree(&layout, "HG004");
            let path = artifact_path(&layout);
            if path.is_dir() {
                std::fs::remove_dir_all(&path).unwrap();
            } else {
                std::fs::remove_file(&path).unwrap();
            }

            let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);
            let genome = checker.check_genome();
            assert!(!genome.complete);
            assert_eq!(genome.missing, vec![kind]);

            let availability = checker.check_references("HG004");
            assert!(!availability.ready_for_processing);
            assert!(availability.sample_reference.complete);
            assert_eq!(availability.missing_summary(), format!("Genome: {kind}"));
        }
    }

    #[test]
    fn test_partial_sample() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);

        // only the BED and an incomplete SV folder
        let sample_dir = layout.sample_reference_dir("NA24143");
        std::fs::create_dir_all(layout.sv_reference_dir("NA24143")).unwrap();
        std::fs::write(sample_dir.join("truth.bed"), "").unwrap();
        std::fs::write(layout.sv_reference_dir("NA24143").join("sv.vcf.gz"), "").unwrap();
        let check = checker.check_sample("NA24143_Lib3_Rep1");
        assert_eq!(check.missing, vec![ArtifactKind::TruthVcf, ArtifactKind::SvReferenceFiles]);

        std::fs::remove_dir_all(layout.sv_reference_dir("NA24143")).unwrap();
        let check = checker.check_sample("NA24143_Lib3_Rep1");
        assert_eq!(check.missing, vec![ArtifactKind::TruthVcf, ArtifactKind::SvDirectory]);
    }

    #[test]
    fn test_reference_status() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);

        let status = checker.reference_status("HG002");
        assert!(!status.files.genome["fasta"].exists);
        assert_eq!(status.files.genome["fasta"].path, None);
        assert!(status.files.sample.is_empty());
        assert!(status.files.sv.is_empty());

        write_reference_tree(&layout, "HG002");
        let status = checker.reference_status("HG002");
        assert_eq!(status.files.genome["sdf"].path, Some(layout.genome_sdf()));
        assert_eq!(status.files.sample["vcf"].path, Some(layout.sample_reference_dir("HG002").join("HG002_benchmark.vcf.gz")));
        assert!(status.files.sv["bed"].exists);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["ready_for_processing"], serde_json::Value::Bool(true));
        assert_eq!(json["files"]["genome"]["fai"]["exists"], serde_json::Value::Bool(true));
    }
}
