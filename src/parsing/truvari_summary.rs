
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data_types::summary_metrics::SummaryMetrics;
use crate::util::json_io::load_json;

/// The subset of truvari's `summary.json` that we keep
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TruvariMetrics {
    #[serde(rename = "TP-base", default)]
    pub tp_base: u64,
    #[serde(rename = "TP-comp", default)]
    pub tp_comp: u64,
    #[serde(rename = "FP", default)]
    pub fp: u64,
    #[serde(rename = "FN", default)]
    pub fn_count: u64,
    #[serde(default)]
    pub precision: Option<f64>,
    #[serde(default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub f1: Option<f64>,
    #[serde(rename = "base cnt", default)]
    pub base_count: Option<u64>,
    #[serde(rename = "comp cnt", default)]
    pub comp_count: Option<u64>,
}

impl TruvariMetrics {
    /// Counts in the shared benchmark form
    pub fn summary_metrics(&self) -> SummaryMetrics {
        SummaryMetrics::new(self.tp_base, self.fn_count, self.tp_comp, self.fp)
    }
}

/// Loads truvari's `summary.json`
/// # Errors
/// * if the file is missing or is not a JSON object with the expected count types
pub fn parse_truvari_summary(summary_fn: &Path) -> anyhow::Result<TruvariMetrics> {
    load_json(summary_fn)
        .with_context(|| format!("Error while loading truvari summary {summary_fn:?}:"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_parse_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary_fn = dir.path().join("summary.json");
        std::fs::write(&summary_fn, r#"{
            "TP-base": 9000, "TP-comp": 9010, "FP": 400, "FN": 600,
            "precision": 0.9575, "recall": 0.9375, "f1": 0.9474,
            "base cnt": 9600, "comp cnt": 9410, "gt_concordance": 0.91
        }"#).unwrap();

        let metrics = parse_truvari_summary(&summary_fn).unwrap();
        assert_eq!(metrics.tp_base, 9000);
        assert_eq!(metrics.fn_count, 600);
        assert_eq!(metrics.base_count, Some(9600));
        assert_approx_eq!(metrics.f1.unwrap(), 0.9474);

        let summary = metrics.summary_metrics();
        assert_approx_eq!(summary.recall().unwrap(), 0.9375);
    }

    #[test]
    fn test_null_scores() {
        let dir = tempfile::tempdir().unwrap();
        let summary_fn = dir.path().join("summary.json");
        std::fs::write(&summary_fn, r#"{"TP-base": 0, "TP-comp": 0, "FP": 0, "FN": 0, "precision": null, "recall": null, "f1": null}"#).unwrap();
        let metrics = parse_truvari_summary(&summary_fn).unwrap();
        assert_eq!(metrics.precision, None);
        assert!(metrics.summary_metrics().f1().is_none());

        std::fs::write(&summary_fn, "not json").unwrap();
        assert!(parse_truvari_summary(&summary_fn).is_err());
    }
}
