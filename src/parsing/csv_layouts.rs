
use anyhow::{bail, Context};
use std::path::Path;

/// Column label marking a column that is dropped on reformat
pub const DROP_COLUMN: &str = "D";

/// Which input rows are copied on reformat
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RowRange {
    All,
    /// 1-based inclusive bounds
    Lines { begin: usize, end: usize }
}

impl std::str::FromStr for RowRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "all" {
            return Ok(Self::All);
        }
        let (begin, end) = s.split_once(':')
            .with_context(|| format!("Row range must be \"all\" or \"begin:end\", found {s:?}"))?;
        let begin: usize = begin.trim().parse()
            .with_context(|| format!("Invalid row range start in {s:?}"))?;
        let end: usize = end.trim().parse()
            .with_context(|| format!("Invalid row range end in {s:?}"))?;
        if begin == 0 || end < begin {
            bail!("Row range must satisfy 1 <= begin <= end, found {s:?}");
        }
        Ok(Self::Lines { begin, end })
    }
}

impl RowRange {
    /// Selects the configured rows, tolerating ranges past the end of the input
    pub fn select<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        match *self {
            Self::All => rows,
            Self::Lines { begin, end } => {
                let start = (begin - 1).min(rows.len());
                let stop = end.min(rows.len());
                &rows[start..stop]
            }
        }
    }
}

/// The column layout registered for one metric file
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CsvLayout {
    /// Matched against the end of the input file name
    pub suffix: String,
    /// One label per input column, `D` for dropped columns
    pub columns: Vec<String>,
    pub rows: RowRange
}

impl CsvLayout {
    pub fn new(suffix: &str, columns: &str, rows: RowRange) -> Self {
        Self {
            suffix: suffix.to_string(),
            columns: columns.split(',').map(|c| c.trim().to_string()).collect(),
            rows
        }
    }

    /// Input column indices that survive the reformat
    pub fn kept_positions(&self) -> Vec<usize> {
        self.columns.iter().enumerate()
            .filter(|(_i, c)| c.as_str() != DROP_COLUMN)
            .map(|(i, _c)| i)
            .collect()
    }

    /// Output header, in input column order
    pub fn kept_columns(&self) -> Vec<&str> {
        self.kept_positions().into_iter()
            .map(|i| self.columns[i].as_str())
            .collect()
    }
}

/// Lookup from file name suffix to column layout; first registered match wins
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CsvLayoutTable {
    layouts: Vec<CsvLayout>
}

impl CsvLayoutTable {
    pub fn new(layouts: Vec<CsvLayout>) -> Self {
        Self { layouts }
    }

    /// Layouts for the metric files a DRAGEN germline run produces
    pub fn dragen_default() -> Self {
        Self::new(vec![
            CsvLayout::new("mapping_metrics.csv", "section,D,metric,value,percentage", RowRange::All),
            CsvLayout::new("vc_metrics.csv", "section,sample,metric,value,percentage", RowRange::All),
            CsvLayout::new("coverage_metrics.csv", "section,D,metric,value,percentage", RowRange::All),
            CsvLayout::new("ploidy_estimation_metrics.csv", "section,D,metric,value", RowRange::All),
            CsvLayout::new("sv_metrics.csv", "section,sample,metric,value,percentage", RowRange::All),
            CsvLayout::new("cnv_metrics.csv", "section,sample,metric,value,percentage", RowRange::All),
            CsvLayout::new("time_metrics.csv", "section,D,step,duration,seconds", RowRange::All),
        ])
    }

    /// Loads a layout file: repeated groups of three non-blank lines,
    /// the file name suffix, the comma separated column labels, and the row range.
    /// # Errors
    /// * if the file cannot be read
    /// * if a group is incomplete or has an invalid row range
    pub fn from_layout_file(filename: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(filename)
            .with_context(|| format!("Error while reading {filename:?}:"))?;
        let lines: Vec<&str> = text.lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() % 3 != 0 {
            bail!("{filename:?} must contain groups of 3 lines (suffix, columns, rows), found {} lines", lines.len());
        }

        let layouts = lines.chunks(3)
            .map(|group| {
                let rows: RowRange = group[2].parse()
                    .with_context(|| format!("Error in layout for {:?}", group[0]))?;
                Ok(CsvLayout::new(group[0], group[1], rows))
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(Self { layouts })
    }

    /// Returns the layout registered for the file name, if any
    pub fn find(&self, file_name: &str) -> Option<&CsvLayout> {
        self.layouts.iter()
            .find(|l| file_name.ends_with(l.suffix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_range() {
        assert_eq!("all".parse::<RowRange>().unwrap(), RowRange::All);
        assert_eq!("2:4".parse::<RowRange>().unwrap(), RowRange::Lines { begin: 2, end: 4 });
        assert!("0:4".parse::<RowRange>().is_err());
        assert!("5:4".parse::<RowRange>().is_err());
        assert!("some".parse::<RowRange>().is_err());

        let rows = [1, 2, 3, 4, 5];
        assert_eq!(RowRange::Lines { begin: 2, end: 4 }.select(&rows), &[2, 3, 4]);
        assert_eq!(RowRange::Lines { begin: 4, end: 9 }.select(&rows), &[4, 5]);
        assert!(RowRange::Lines { begin: 7, end: 9 }.select(&rows).is_empty());
        assert_eq!(RowRange::All.select(&rows).len(), 5);
    }

    #[test]
    fn test_kept_columns() {
        let layout = CsvLayout::new("mapping_metrics.csv", "section,D,metric,value", RowRange::All);
        assert_eq!(layout.kept_positions(), vec![0, 2, 3]);
        assert_eq!(layout.kept_columns(), vec!["section", "metric", "value"]);
    }

    #[test]
    fn test_layout_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout_fn = dir.path().join("layouts.txt");
        std::fs::write(&layout_fn, "mapping_metrics.csv\nsection,D,metric,value\nall\n\nvc_metrics.csv\nsection,sample,metric,value\n1:10\n").unwrap();

        let table = CsvLayoutTable::from_layout_file(&layout_fn).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("S_r.dragen.vc_metrics.csv").unwrap().rows, RowRange::Lines { begin: 1, end: 10 });
        assert!(table.find("S_r.dragen.gc_metrics.csv").is_none());

        std::fs::write(&layout_fn, "mapping_metrics.csv\nsection,D,metric,value\n").unwrap();
        assert!(CsvLayoutTable::from_layout_file(&layout_fn).is_err());
    }

    #[test]
    fn test_default_table() {
        let table = CsvLayoutTable::dragen_default();
        assert!(table.find("HG004_run1.dragen.mapping_metrics.csv").is_some());
        assert!(table.find("HG004_run1.dragen.fastqc_metrics.csv").is_none());
    }
}
