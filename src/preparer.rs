
use anyhow::{bail, Context};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data_types::run_location::{file_name, GvcfInput, HappyInputs, TruvariInputs, TruvariPrepared};
use crate::parsing::fasta_index::read_contig_names;
use crate::toolkit::runner::ToolError;
use crate::toolkit::variant_tools::{tabix_index_path, VariantToolkit};

/// Excludes truth records without a called alternate allele
pub const MISSING_ALT_FILTER: &str = r#"ALT=".""#;
/// Excludes the SV call type truvari cannot compare
pub const TANDEM_DUP_FILTER: &str = r#"ALT="<DUP:TANDEM>""#;
/// Two-column map written next to the SV truth set for `--rename-chrs`
pub const CHROM_MAP_NAME: &str = "chr_rename_map.txt";
/// Contig prefix of the GRCh38 analysis set
pub const CHR_PREFIX: &str = "chr";

/// Swaps the final `old_suffix` of a file name for `new_suffix`, keeping the folder
fn derived_name(path: &Path, old_suffix: &str, new_suffix: &str) -> PathBuf {
    let name = file_name(path);
    let stem = name.strip_suffix(old_suffix).unwrap_or(&name);
    path.with_file_name(format!("{stem}{new_suffix}"))
}

/// A derived bgzipped file is usable iff it is non-empty and its tabix index exists
pub fn is_derived_complete(data_fn: &Path) -> bool {
    let non_empty = std::fs::metadata(data_fn)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);
    non_empty && tabix_index_path(data_fn).exists()
}

/// Removes a file if present, ignoring "not found"
fn remove_if_present(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed leftover {path:?}");
            Ok(())
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Error while removing {path:?}:"))
    }
}

/// The 1..22, X, Y -> chr1..chr22, chrX, chrY rename table
pub fn chromosome_rename_pairs() -> Vec<(String, String)> {
    (1..=22).map(|i| i.to_string())
        .chain(["X".to_string(), "Y".to_string()])
        .map(|c| {
            let renamed = format!("{CHR_PREFIX}{c}");
            (c, renamed)
        })
        .collect()
}

/// Builds the filtered / normalized files the benchmark tools consume.
/// Every step checks for a complete derived file first so repeated runs launch nothing.
pub struct VariantPreparer<'a> {
    toolkit: VariantToolkit<'a>
}

impl<'a> VariantPreparer<'a> {
    pub fn new(toolkit: VariantToolkit<'a>) -> Self {
        Self { toolkit }
    }

    /// Makes sure `output` is a complete derived file, regenerating it with `generate` otherwise.
    /// A failed index deletes the data file so a half-built pair is never left looking valid.
    /// # Returns
    /// * true if the file was (re)generated
    fn ensure_derived<F>(&self, output: &Path, generate: F) -> anyhow::Result<bool>
    where
        F: FnOnce(&Path) -> Result<(), ToolError>
    {
        if is_derived_complete(output) {
            debug!("Reusing complete derived file {output:?}");
            return Ok(false);
        }

        let tbi_fn = tabix_index_path(output);
        remove_if_present(output)?;
        remove_if_present(&tbi_fn)?;

        info!("Generating {output:?}");
        if let Err(e) = generate(output) {
            remove_if_present(output)?;
            return Err(e).with_context(|| format!("Error while generating {output:?}:"));
        }
        if let Err(e) = self.toolkit.index_vcf(output) {
            warn!("Indexing failed, removing {output:?}");
            remove_if_present(output)?;
            return Err(e).with_context(|| format!("Error while indexing {output:?}:"));
        }
        Ok(true)
    }

    /// Returns the GVCF to hand to hap.py.
    /// Hard-filtered input is used in place (indexed if needed); other input is restricted
    /// to the contigs of the reference FASTA index.
    /// # Errors
    /// * if the FASTA index cannot be read
    /// * if bcftools or tabix fail
    pub fn prepare_for_happy(&self, inputs: &HappyInputs) -> anyhow::Result<PathBuf> {
        let GvcfInput { path: gvcf_fn, hard_filtered } = &inputs.gvcf;
        if *hard_filtered {
            self.ensure_source_index(gvcf_fn)?;
            return Ok(gvcf_fn.clone());
        }

        let filtered_fn = derived_name(gvcf_fn, ".gvcf.gz", ".filtered.gvcf.gz");
        if filtered_fn == *gvcf_fn {
            bail!("Cannot derive a filtered name for {gvcf_fn:?}");
        }
        if !is_derived_complete(&filtered_fn) {
            // region queries need an index on the source
            self.ensure_source_index(gvcf_fn)?;
            let regions = read_contig_names(&inputs.fasta_index)?;
            debug!("Restricting {gvcf_fn:?} to {} contigs", regions.len());
            self.ensure_derived(&filtered_fn, |out| self.toolkit.view_regions(gvcf_fn, out, &regions))?;
        }
        Ok(filtered_fn)
    }

    /// Indexes a run GVCF in place if it has no `.tbi` yet
    fn ensure_source_index(&self, gvcf_fn: &Path) -> anyhow::Result<()> {
        if !tabix_index_path(gvcf_fn).exists() {
            info!("Indexing GVCF {gvcf_fn:?}");
            self.toolkit.index_vcf(gvcf_fn)
                .with_context(|| format!("Error while indexing {gvcf_fn:?}:"))?;
        }
        Ok(())
    }

    /// Returns the chr-prefixed truth VCF/BED and the filtered run SV VCF for truvari
    /// # Errors
    /// * if bcftools or tabix fail
    /// * if the BED or the rename map cannot be written
    pub fn prepare_for_truvari(&self, inputs: &TruvariInputs) -> anyhow::Result<TruvariPrepared> {
        let ref_vcf = self.normalized_truth_vcf(&inputs.truth_vcf)?;
        let bed = normalize_bed(&inputs.truth_bed)?;

        let run_vcf = derived_name(&inputs.run_sv_vcf, ".vcf.gz", ".filtered.vcf.gz");
        self.ensure_derived(&run_vcf, |out| self.toolkit.view_exclude(&inputs.run_sv_vcf, out, TANDEM_DUP_FILTER))?;

        Ok(TruvariPrepared {
            ref_vcf,
            run_vcf,
            bed
        })
    }

    /// truth.vcf.gz -> truth.filtered.vcf.gz -> truth.normalized.vcf.gz
    fn normalized_truth_vcf(&self, truth_vcf: &Path) -> anyhow::Result<PathBuf> {
        let normalized_fn = derived_name(truth_vcf, ".vcf.gz", ".normalized.vcf.gz");
        if is_derived_complete(&normalized_fn) {
            debug!("Reusing complete derived file {normalized_fn:?}");
            return Ok(normalized_fn);
        }

        let filtered_fn = derived_name(truth_vcf, ".vcf.gz", ".filtered.vcf.gz");
        self.ensure_derived(&filtered_fn, |out| self.toolkit.view_exclude(truth_vcf, out, MISSING_ALT_FILTER))?;

        let map_fn = truth_vcf.with_file_name(CHROM_MAP_NAME);
        write_rename_map(&map_fn)?;
        self.ensure_derived(&normalized_fn, |out| self.toolkit.rename_chromosomes(&filtered_fn, out, &map_fn))?;
        Ok(normalized_fn)
    }
}

/// Writes the two-column rename table used by `bcftools annotate --rename-chrs`
fn write_rename_map(map_fn: &Path) -> anyhow::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(map_fn)
        .with_context(|| format!("Error while creating {map_fn:?}:"))?;
    for (old_name, new_name) in chromosome_rename_pairs() {
        csv_writer.write_record([old_name, new_name])
            .with_context(|| format!("Error while writing {map_fn:?}:"))?;
    }
    csv_writer.flush()
        .with_context(|| format!("Error while flushing {map_fn:?}:"))?;
    Ok(())
}

/// Returns true for BED lines that are not intervals
fn is_bed_metadata(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Writes `<bed>.normalized.bed` with `chr`-prefixed contig names, unless it already exists.
/// The result is plain text, so it has no index; it is written to a temporary name first.
fn normalize_bed(bed_fn: &Path) -> anyhow::Result<PathBuf> {
    let normalized_fn = derived_name(bed_fn, ".bed", ".normalized.bed");
    if normalized_fn.is_file() {
        debug!("Reusing normalized BED {normalized_fn:?}");
        return Ok(normalized_fn);
    }

    let content = std::fs::read_to_string(bed_fn)
        .with_context(|| format!("Error while reading {bed_fn:?}:"))?;
    let partial_fn = normalized_fn.with_extension("bed.partial");
    {
        let file = File::create(&partial_fn)
            .with_context(|| format!("Error while creating {partial_fn:?}:"))?;
        let mut writer = BufWriter::new(file);
        for line in content.lines() {
            if is_bed_metadata(line) || line.starts_with(CHR_PREFIX) {
                writeln!(writer, "{line}")?;
            } else {
                writeln!(writer, "{CHR_PREFIX}{line}")?;
            }
        }
        writer.flush()
            .with_context(|| format!("Error while writing {partial_fn:?}:"))?;
    }
    std::fs::rename(&partial_fn, &normalized_fn)
        .with_context(|| format!("Error while renaming {partial_fn:?} to {normalized_fn:?}:"))?;
    info!("Wrote normalized BED {normalized_fn:?}");
    Ok(normalized_fn)
}
