
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data_types::summary_metrics::SummaryMetrics;

/// One row of a hap.py `*.summary.csv`; only the columns we keep
#[derive(Clone, Debug, Deserialize)]
struct HappySummaryRow {
    #[serde(rename = "Type")]
    variant_type: String,
    #[serde(rename = "Filter")]
    filter: String,
    #[serde(rename = "TRUTH.TOTAL", default, deserialize_with = "csv::invalid_option")]
    truth_total: Option<f64>,
    #[serde(rename = "TRUTH.TP", default, deserialize_with = "csv::invalid_option")]
    truth_tp: Option<f64>,
    #[serde(rename = "TRUTH.FN", default, deserialize_with = "csv::invalid_option")]
    truth_fn: Option<f64>,
    #[serde(rename = "QUERY.TOTAL", default, deserialize_with = "csv::invalid_option")]
    query_total: Option<f64>,
    #[serde(rename = "QUERY.TP", default, deserialize_with = "csv::invalid_option")]
    query_tp: Option<f64>,
    #[serde(rename = "QUERY.FP", default, deserialize_with = "csv::invalid_option")]
    query_fp: Option<f64>,
    #[serde(rename = "QUERY.UNK", default, deserialize_with = "csv::invalid_option")]
    query_unk: Option<f64>,
    #[serde(rename = "FP.gt", default, deserialize_with = "csv::invalid_option")]
    fp_gt: Option<f64>,
    #[serde(rename = "FP.al", default, deserialize_with = "csv::invalid_option")]
    fp_al: Option<f64>,
    #[serde(rename = "METRIC.Recall", default, deserialize_with = "csv::invalid_option")]
    metric_recall: Option<f64>,
    #[serde(rename = "METRIC.Precision", default, deserialize_with = "csv::invalid_option")]
    metric_precision: Option<f64>,
    #[serde(rename = "METRIC.Frac_NA", default, deserialize_with = "csv::invalid_option")]
    metric_frac_na: Option<f64>,
    #[serde(rename = "METRIC.F1_Score", default, deserialize_with = "csv::invalid_option")]
    metric_f1_score: Option<f64>,
    #[serde(rename = "TRUTH.TOTAL.TiTv_ratio", default, deserialize_with = "csv::invalid_option")]
    truth_titv_ratio: Option<f64>,
    #[serde(rename = "QUERY.TOTAL.TiTv_ratio", default, deserialize_with = "csv::invalid_option")]
    query_titv_ratio: Option<f64>,
    #[serde(rename = "TRUTH.TOTAL.het_hom_ratio", default, deserialize_with = "csv::invalid_option")]
    truth_het_hom_ratio: Option<f64>,
    #[serde(rename = "QUERY.TOTAL.het_hom_ratio", default, deserialize_with = "csv::invalid_option")]
    query_het_hom_ratio: Option<f64>,
}

/// The hap.py metrics persisted for a run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HappyMetrics {
    pub variant_type: String,
    pub filter: String,
    pub truth_total: Option<u64>,
    pub truth_tp: Option<u64>,
    pub truth_fn: Option<u64>,
    pub query_total: Option<u64>,
    pub query_tp: Option<u64>,
    pub query_fp: Option<u64>,
    pub query_unk: Option<u64>,
    pub fp_gt: Option<u64>,
    pub fp_al: Option<u64>,
    pub metric_recall: Option<f64>,
    pub metric_precision: Option<f64>,
    pub metric_frac_na: Option<f64>,
    pub metric_f1_score: Option<f64>,
    pub truth_titv_ratio: Option<f64>,
    pub query_titv_ratio: Option<f64>,
    pub truth_het_hom_ratio: Option<f64>,
    pub query_het_hom_ratio: Option<f64>,
}

/// hap.py writes counts as floats in some versions ("123.0")
fn as_count(value: Option<f64>) -> Option<u64> {
    value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v as u64)
}

impl From<HappySummaryRow> for HappyMetrics {
    fn from(row: HappySummaryRow) -> Self {
        Self {
            variant_type: row.variant_type,
            filter: row.filter,
            truth_total: as_count(row.truth_total),
            truth_tp: as_count(row.truth_tp),
            truth_fn: as_count(row.truth_fn),
            query_total: as_count(row.query_total),
            query_tp: as_count(row.query_tp),
            query_fp: as_count(row.query_fp),
            query_unk: as_count(row.query_unk),
            fp_gt: as_count(row.fp_gt),
            fp_al: as_count(row.fp_al),
            metric_recall: row.metric_recall,
            metric_precision: row.metric_precision,
            metric_frac_na: row.metric_frac_na,
            metric_f1_score: row.metric_f1_score,
            truth_titv_ratio: row.truth_titv_ratio,
            query_titv_ratio: row.query_titv_ratio,
            truth_het_hom_ratio: row.truth_het_hom_ratio,
            query_het_hom_ratio: row.query_het_hom_ratio,
        }
    }
}

impl HappyMetrics {
    /// Counts in the shared benchmark form; missing values count as 0
    pub fn summary_metrics(&self) -> SummaryMetrics {
        // QUERY.TP is absent from older hap.py outputs, derive it from the total
        let query_tp = self.query_tp.unwrap_or_else(|| {
            self.query_total.unwrap_or(0)
                .saturating_sub(self.query_fp.unwrap_or(0))
                .saturating_sub(self.query_unk.unwrap_or(0))
        });
        SummaryMetrics::new(
            self.truth_tp.unwrap_or(0),
            self.truth_fn.unwrap_or(0),
            query_tp,
            self.query_fp.unwrap_or(0)
        )
    }
}

/// Parses a hap.py summary CSV and returns the requested row
/// # Arguments
/// * `summary_fn` - the `*.summary.csv` path
/// * `variant_type` - the `Type` column value, e.g. "SNP"
/// * `filter` - the `Filter` column value, e.g. "ALL"
/// # Errors
/// * if the file cannot be opened or a row cannot be parsed
pub fn parse_happy_summary(summary_fn: &Path, variant_type: &str, filter: &str) -> anyhow::Result<Option<HappyMetrics>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .from_path(summary_fn)
        .with_context(|| format!("Error while opening {summary_fn:?}:"))?;

    for result in csv_reader.deserialize() {
        let row: HappySummaryRow = result.with_context(|| format!("Error while parsing {summary_fn:?}:"))?;
        if row.variant_type == variant_type && row.filter == filter {
            return Ok(Some(row.into()));
        }
    }
    Ok(None)
}

/// Finds the single `*.summary.csv` written by hap.py into a folder
pub fn find_happy_summary(output_dir: &Path) -> anyhow::Result<std::path::PathBuf> {
    let mut candidates = crate::util::file_search::find_with_suffix(output_dir, ".summary.csv")?;
    if candidates.is_empty() {
        return Err(anyhow!("No hap.py summary file found in {output_dir:?}"));
    }
    Ok(candidates.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    const SUMMARY: &str = "Type,Filter,TRUTH.TOTAL,TRUTH.TP,TRUTH.FN,QUERY.TOTAL,QUERY.FP,QUERY.UNK,FP.gt,FP.al,METRIC.Recall,METRIC.Precision,METRIC.Frac_NA,METRIC.F1_Score,TRUTH.TOTAL.TiTv_ratio,QUERY.TOTAL.TiTv_ratio,TRUTH.TOTAL.het_hom_ratio,QUERY.TOTAL.het_hom_ratio
INDEL,ALL,500,480,20,600,10,90,3,1,0.96,0.98,0.15,0.97,,,1.5,1.6
INDEL,PASS,500,470,30,580,8,92,3,1,0.94,0.98,0.16,0.96,,,1.5,1.6
SNP,ALL,3000.0,2990.0,10.0,3500,5,505,2,0,0.996667,0.998,0.144,0.997,2.1,2.05,1.55,1.58
SNP,PASS,3000,2980,20,3480,4,496,2,0,0.99,0.998,0.14,0.995,2.1,2.05,1.55,1.58
";

    #[test]
    fn test_parse_snp_all() {
        let dir = tempfile::tempdir().unwrap();
        let summary_fn = dir.path().join("HG004_run1.summary.csv");
        std::fs::write(&summary_fn, SUMMARY).unwrap();

        let metrics = parse_happy_summary(&summary_fn, "SNP", "ALL").unwrap().unwrap();
        assert_eq!(metrics.truth_total, Some(3000));
        assert_eq!(metrics.truth_tp, Some(2990));
        assert_eq!(metrics.query_unk, Some(505));
        assert_eq!(metrics.fp_al, Some(0));
        assert_approx_eq!(metrics.metric_f1_score.unwrap(), 0.997);
        assert_approx_eq!(metrics.truth_titv_ratio.unwrap(), 2.1);

        // no QUERY.TP column, so it is derived from the total
        let summary = metrics.summary_metrics();
        assert_eq!(summary, SummaryMetrics::new(2990, 10, 2990, 5));

        let indel = parse_happy_summary(&summary_fn, "INDEL", "ALL").unwrap().unwrap();
        assert_eq!(indel.truth_titv_ratio, None);
        assert!(parse_happy_summary(&summary_fn, "SV", "ALL").unwrap().is_none());

        assert_eq!(find_happy_summary(dir.path()).unwrap(), summary_fn);
    }

    #[test]
    fn test_missing_summary() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_happy_summary(dir.path()).is_err());
        assert!(parse_happy_summary(&dir.path().join("nope.csv"), "SNP", "ALL").is_err());
    }
}
