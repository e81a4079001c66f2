
use itertools::Itertools;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::data_types::artifacts::ArtifactKind;
use crate::data_types::catalog::ReferenceCatalog;
use crate::data_types::layout::ProjectLayout;
use crate::data_types::run_location::{file_name, is_derived_artifact, GvcfInput, HappyInputs, RunLocation, TruvariInputs, HARD_FILTERED_MARKER};
use crate::reference::checker::{BED_SUFFIX, VCF_SUFFIX};
use crate::util::file_search::find_with_suffix_excluding;

pub const GVCF_SUFFIX: &str = ".gvcf.gz";
pub const SV_VCF_SUFFIX: &str = ".sv.vcf.gz";
pub const CSV_SUFFIX: &str = ".csv";

#[derive(thiserror::Error, Debug)]
pub enum RunFileError {
    #[error("required files missing for sample {sample}, run {run}: {}", .missing.iter().join(", "))]
    MissingArtifacts {
        sample: String,
        run: String,
        missing: Vec<ArtifactKind>
    },
}

/// Finds the raw run files and the reference files a benchmark needs
pub struct RunFileLocator<'a> {
    layout: &'a ProjectLayout,
    catalog: &'a ReferenceCatalog
}

impl<'a> RunFileLocator<'a> {
    pub fn new(layout: &'a ProjectLayout, catalog: &'a ReferenceCatalog) -> Self {
        Self { layout, catalog }
    }

    /// Discovers the files in `data/lab_runs/{sample}_{run}/`.
    /// Derived `.filtered.`/`.normalized.` files are never returned as inputs.
    /// # Errors
    /// * if the run folder does not exist
    /// * if the folder cannot be searched
    pub fn locate_run_files(&self, sample: &str, run: &str) -> anyhow::Result<RunLocation> {
        let input_dir = self.layout.run_input_dir(sample, run);
        if !input_dir.is_dir() {
            return Err(missing_error(sample, run, vec![ArtifactKind::RunDirectory]).into());
        }

        let gvcf_files = find_with_suffix_excluding(&input_dir, GVCF_SUFFIX, is_derived_artifact)?;
        // hard-filtered output of the instrument pipeline takes priority
        let gvcf = gvcf_files.iter()
            .find(|p| file_name(p).contains(HARD_FILTERED_MARKER))
            .or(gvcf_files.first())
            .cloned()
            .map(GvcfInput::new);

        let sv_vcf = find_with_suffix_excluding(&input_dir, SV_VCF_SUFFIX, is_derived_artifact)?
            .into_iter()
            .next();
        let csv_files = find_with_suffix_excluding(&input_dir, CSV_SUFFIX, |_p| false)?;

        let location = RunLocation {
            sample: sample.to_string(),
            run: run.to_string(),
            base_sample: self.catalog.resolve_base_sample(sample),
            input_dir,
            gvcf,
            sv_vcf,
            csv_files
        };
        info!("Located run files for {sample}_{run}: gvcf={:?} sv={:?} csv={}",
            location.gvcf.as_ref().map(|g| &g.path), location.sv_vcf, location.csv_files.len());
        Ok(location)
    }

    /// Collects every file hap.py needs, reporting all missing kinds together
    /// # Arguments
    /// * `location` - output of `locate_run_files`
    /// * `stratified` - if true, the stratification TSV is also required
    pub fn happy_inputs(&self, location: &RunLocation, stratified: bool) -> Result<HappyInputs, RunFileError> {
        let mut missing = vec![];
        let sample_dir = self.layout.sample_reference_dir(&location.base_sample);

        let truth_vcf = first_base_file(&sample_dir, VCF_SUFFIX);
        note_missing(&truth_vcf, ArtifactKind::TruthVcf, &mut missing);
        let truth_bed = first_base_file(&sample_dir, BED_SUFFIX);
        note_missing(&truth_bed, ArtifactKind::ConfidentBed, &mut missing);
        note_missing(&location.gvcf, ArtifactKind::RunGvcf, &mut missing);

        let fasta = existing(self.layout.genome_fasta());
        note_missing(&fasta, ArtifactKind::GenomeFasta, &mut missing);
        let fasta_index = existing(self.layout.genome_fasta_index());
        note_missing(&fasta_index, ArtifactKind::GenomeFastaIndex, &mut missing);
        let sdf = existing(self.layout.genome_sdf());
        note_missing(&sdf, ArtifactKind::GenomeSdf, &mut missing);

        let stratification = if stratified {
            let tsv = existing(self.layout.stratification_tsv(&location.base_sample));
            note_missing(&tsv, ArtifactKind::StratificationTsv, &mut missing);
            tsv
        } else {
            None
        };

        match (truth_vcf, truth_bed, location.gvcf.clone(), fasta, fasta_index, sdf) {
            (Some(truth_vcf), Some(truth_bed), Some(gvcf), Some(fasta), Some(fasta_index), Some(sdf)) if missing.is_empty() => {
                debug!("hap.py inputs: truth={truth_vcf:?} bed={truth_bed:?} gvcf={:?}", gvcf.path);
                Ok(HappyInputs {
                    gvcf,
                    truth_vcf,
                    truth_bed,
                    fasta,
                    fasta_index,
                    sdf,
                    stratification
                })
            },
            _ => Err(missing_error(&location.sample, &location.run, missing))
        }
    }

    /// Collects every file truvari needs, reporting all missing kinds together
    pub fn truvari_inputs(&self, location: &RunLocation) -> Result<TruvariInputs, RunFileError> {
        let mut missing = vec![];
        let sv_dir = self.layout.sv_reference_dir(&location.base_sample);

        let truth_vcf = first_base_file(&sv_dir, VCF_SUFFIX);
        note_missing(&truth_vcf, ArtifactKind::SvTruthVcf, &mut missing);
        let truth_bed = first_base_file(&sv_dir, BED_SUFFIX);
        note_missing(&truth_bed, ArtifactKind::SvTruthBed, &mut missing);
        note_missing(&location.sv_vcf, ArtifactKind::RunSvVcf, &mut missing);
        let fasta = existing(self.layout.genome_fasta());
        note_missing(&fasta, ArtifactKind::GenomeFasta, &mut missing);

        match (truth_vcf, truth_bed, location.sv_vcf.clone(), fasta) {
            (Some(truth_vcf), Some(truth_bed), Some(run_sv_vcf), Some(fasta)) => {
                debug!("truvari inputs: truth={truth_vcf:?} bed={truth_bed:?} sv={run_sv_vcf:?}");
                Ok(TruvariInputs {
                    truth_vcf,
                    truth_bed,
                    run_sv_vcf,
                    fasta
                })
            },
            _ => Err(missing_error(&location.sample, &location.run, missing))
        }
    }
}

fn missing_error(sample: &str, run: &str, missing: Vec<ArtifactKind>) -> RunFileError {
    RunFileError::MissingArtifacts {
        sample: sample.to_string(),
        run: run.to_string(),
        missing
    }
}

fn note_missing<T>(value: &Option<T>, kind: ArtifactKind, missing: &mut Vec<ArtifactKind>) {
    if value.is_none() {
        missing.push(kind);
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// First non-derived file with the suffix; search errors count as absent
fn first_base_file(dir: &Path, suffix: &str) -> Option<PathBuf> {
    match find_with_suffix_excluding(dir, suffix, is_derived_artifact) {
        Ok(files) => files.into_iter().next(),
        Err(e) => {
            debug!("Error while searching {dir:?}: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::catalog::GIAB_CATALOG;
    use crate::reference::checker::tests::write_reference_tree;

    fn write_run(layout: &ProjectLayout, sample: &str, run: &str, names: &[&str]) -> PathBuf {
        let run_dir = layout.run_input_dir(sample, run);
        std::fs::create_dir_all(&run_dir).unwrap();
        for name in names {
            std::fs::write(run_dir.join(name), "data").unwrap();
        }
        run_dir
    }

    #[test]
    fn test_missing_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let locator = RunFileLocator::new(&layout, &GIAB_CATALOG);

        let err = locator.locate_run_files("HG004", "run1").unwrap_err();
        match err.downcast_ref::<RunFileError>() {
            Some(RunFileError::MissingArtifacts { missing, .. }) => assert_eq!(missing, &vec![ArtifactKind::RunDirectory]),
            None => panic!("unexpected error {err:#}")
        }
    }

    #[test]
    fn test_gvcf_preference() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let locator = RunFileLocator::new(&layout, &GIAB_CATALOG);
        write_run(&layout, "NA24143_Lib3", "run2", &[
            "a.dragen.gvcf.gz",
            "b.dragen.hard-filtered.gvcf.gz",
            "a.dragen.filtered.gvcf.gz",
            "NA24143.sv.vcf.gz",
            "NA24143.sv.filtered.vcf.gz",
            "x.mapping_metrics.csv"
        ]);

        let location = locator.locate_run_files("NA24143_Lib3", "run2").unwrap();
        assert_eq!(location.base_sample, "NA24143");
        let gvcf = location.gvcf.unwrap();
        assert!(gvcf.hard_filtered);
        assert_eq!(file_name(&gvcf.path), "b.dragen.hard-filtered.gvcf.gz");
        assert_eq!(file_name(location.sv_vcf.as_ref().unwrap()), "NA24143.sv.vcf.gz");
        assert_eq!(location.csv_files.len(), 1);
    }

    #[test]
    fn test_aggregated_missing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let locator = RunFileLocator::new(&layout, &GIAB_CATALOG);
        write_run(&layout, "HG004", "run1", &["notes.txt"]);

        let location = locator.locate_run_files("HG004", "run1").unwrap();
        let err = locator.happy_inputs(&location, true).unwrap_err();
        let RunFileError::MissingArtifacts { missing, .. } = &err;
        assert_eq!(missing, &vec![
            ArtifactKind::TruthVcf, ArtifactKind::ConfidentBed, ArtifactKind::RunGvcf,
            ArtifactKind::GenomeFasta, ArtifactKind::GenomeFastaIndex, ArtifactKind::GenomeSdf,
            ArtifactKind::StratificationTsv
        ]);
        assert!(err.to_string().contains("Truth VCF, Confident regions BED, Run GVCF"));

        let RunFileError::MissingArtifacts { missing, .. } = locator.truvari_inputs(&location).unwrap_err();
        assert_eq!(missing, vec![
            ArtifactKind::SvTruthVcf, ArtifactKind::SvTruthBed, ArtifactKind::RunSvVcf, ArtifactKind::GenomeFasta
        ]);
    }

    #[test]
    fn test_complete_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let locator = RunFileLocator::new(&layout, &GIAB_CATALOG);
        write_reference_tree(&layout, "HG004");
        // derived truth files must not be selected
        let sample_dir = layout.sample_reference_dir("HG004");
        std::fs::write(sample_dir.join("A.filtered.vcf.gz"), "derived").unwrap();
        std::fs::write(layout.sv_reference_dir("HG004").join("A.normalized.bed"), "derived").unwrap();
        write_run(&layout, "HG004", "run1", &["HG004_run1.dragen.gvcf.gz", "HG004_run1.sv.vcf.gz"]);

        let location = locator.locate_run_files("HG004", "run1").unwrap();
        let happy = locator.happy_inputs(&location, false).unwrap();
        assert_eq!(happy.truth_vcf, sample_dir.join("HG004_benchmark.vcf.gz"));
        assert_eq!(happy.stratification, None);
        assert!(!happy.gvcf.hard_filtered);

        // stratified requires the TSV
        assert!(locator.happy_inputs(&location, true).is_err());
        let tsv = layout.stratification_tsv("HG004");
        std::fs::create_dir_all(tsv.parent().unwrap()).unwrap();
        std::fs::write(&tsv, "").unwrap();
        assert_eq!(locator.happy_inputs(&location, true).unwrap().stratification, Some(tsv));

        let truvari = locator.truvari_inputs(&location).unwrap();
        assert_eq!(truvari.truth_bed, layout.sv_reference_dir("HG004").join("HG004_sv.bed"));
        assert_eq!(file_name(&truvari.run_sv_vcf), "HG004_run1.sv.vcf.gz");
    }
}
