
use anyhow::{anyhow, Context};
use std::path::Path;

/// Reads the contig names, in order, from a samtools `.fai` index.
/// This is the authoritative region list for filtering run GVCFs.
/// # Arguments
/// * `fai_fn` - path to the FASTA index
/// # Errors
/// * if the file cannot be read or a row has no name column
/// * if the index lists no contigs
pub fn read_contig_names(fai_fn: &Path) -> anyhow::Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(fai_fn)
        .with_context(|| format!("Error while opening {fai_fn:?}:"))?;

    let mut contigs = vec![];
    for result in csv_reader.records() {
        let row = result.with_context(|| format!("Error while reading {fai_fn:?}"))?;
        let name = row.get(0)
            .filter(|n| !n.is_empty())
            .ok_or(anyhow!("Missing contig name on row: {row:?}"))?;
        contigs.push(name.to_string());
    }

    if contigs.is_empty() {
        return Err(anyhow!("No contigs found in {fai_fn:?}"));
    }
    Ok(contigs)
}
