
use anyhow::Context;
use std::path::Path;

use crate::parsing::csv_layouts::CsvLayout;

/// Cell value written when an input row is shorter than the layout
pub const MISSING_CELL: &str = "None";

/// Rewrites a raw metric CSV with the given layout: dropped columns removed,
/// the layout labels as a header, and only the configured rows kept.
/// # Arguments
/// * `input_fn` - raw headerless CSV
/// * `output_fn` - destination, overwritten
/// * `layout` - the registered layout for this file
/// # Returns
/// * the number of data rows written
/// # Errors
/// * if either file cannot be opened or a row cannot be read/written
pub fn reformat_csv(input_fn: &Path, output_fn: &Path, layout: &CsvLayout) -> anyhow::Result<usize> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(input_fn)
        .with_context(|| format!("Error while opening {input_fn:?}:"))?;
    let rows: Vec<csv::StringRecord> = csv_reader.records()
        .collect::<Result<_, _>>()
        .with_context(|| format!("Error while reading {input_fn:?}:"))?;

    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(output_fn)
        .with_context(|| format!("Error while creating {output_fn:?}:"))?;
    csv_writer.write_record(layout.kept_columns())
        .with_context(|| format!("Error while writing {output_fn:?}:"))?;

    let positions = layout.kept_positions();
    let selected = layout.rows.select(&rows);
    for row in selected.iter() {
        let values = positions.iter()
            .map(|&i| row.get(i).unwrap_or(MISSING_CELL));
        csv_writer.write_record(values)
            .with_context(|| format!("Error while writing {output_fn:?}:"))?;
    }
    csv_writer.flush()
        .with_context(|| format!("Error while flushing {output_fn:?}:"))?;
    Ok(selected.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::csv_layouts::RowRange;

    #[test]
    fn test_reformat() {
        let dir = tempfile::tempdir().unwrap();
        let input_fn = dir.path().join("S_r.mapping_metrics.csv");
        let output_fn = dir.path().join("out.csv");
        std::fs::write(&input_fn, "MAPPING,,Total input reads,100,\nMAPPING,,Mapped reads,90,90.0\nMAPPING,x\nCOVERAGE,,Depth,30,\n").unwrap();

        let layout = CsvLayout::new("mapping_metrics.csv", "section,D,metric,value,percentage", RowRange::Lines { begin: 1, end: 3 });
        let written = reformat_csv(&input_fn, &output_fn, &layout).unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            std::fs::read_to_string(&output_fn).unwrap(),
            "section,metric,value,percentage\nMAPPING,Total input reads,100,\nMAPPING,Mapped reads,90,90.0\nMAPPING,None,None,None\n"
        );
    }
}
