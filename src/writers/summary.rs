
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::benchmark::BenchmarkTool;
use crate::data_types::summary_metrics::SummaryMetrics;
use crate::parsing::happy_summary::HappyMetrics;
use crate::parsing::truvari_summary::TruvariMetrics;

/// Default file name of the per-run benchmark summary
pub const BENCHMARK_SUMMARY_NAME: &str = "benchmark_summary.tsv";
/// Variant type label used for truvari rows
pub const SV_VARIANT_TYPE: &str = "SV";
/// Filter label used when a tool does not report one
pub const ALL_FILTER: &str = "ALL";

/// Accumulates one row per benchmark result for a sample and run
#[derive(Default)]
pub struct BenchmarkSummaryWriter {
    sample: String,
    run: String,
    rows: Vec<SummaryRow>
}

/// Contains all the data written to each row of our summary file
#[derive(Clone, Debug, Serialize)]
struct SummaryRow {
    sample: String,
    run: String,
    /// Benchmark tool that produced the counts
    tool: String,
    /// Any applied filters
    filter: String,
    /// The type of variant represented by this row
    variant_type: String,
    /// Total number of variants in the truth set
    truth_total: u64,
    /// Total number of true positives in truth
    truth_tp: u64,
    /// Total number of false negatives
    truth_fn: u64,
    /// Total number of true positives in query
    query_tp: u64,
    /// Total number of false positives
    query_fp: u64,
    /// Recall = truth.TP / (truth.TP+truth.FN)
    metric_recall: Option<f64>,
    /// Precision = query.TP / (query.TP + query.FP)
    metric_precision: Option<f64>,
    /// F1 = combination score of recall and precision
    metric_f1: Option<f64>
}

impl BenchmarkSummaryWriter {
    /// Creates a new writer to accumulate rows
    pub fn new(sample: &str, run: &str) -> Self {
        Self {
            sample: sample.to_string(),
            run: run.to_string(),
            rows: vec![]
        }
    }

    /// Adds one row; the scores are recomputed from the counts
    pub fn add_metrics(&mut self, tool: BenchmarkTool, filter: &str, variant_type: &str, metrics: &SummaryMetrics) {
        self.rows.push(SummaryRow {
            sample: self.sample.clone(),
            run: self.run.clone(),
            tool: tool.to_string(),
            filter: filter.to_string(),
            variant_type: variant_type.to_string(),
            truth_total: metrics.truth_total(),
            truth_tp: metrics.truth_tp,
            truth_fn: metrics.truth_fn,
            query_tp: metrics.query_tp,
            query_fp: metrics.query_fp,
            metric_recall: metrics.recall(),
            metric_precision: metrics.precision(),
            metric_f1: metrics.f1()
        });
    }

    pub fn add_happy(&mut self, metrics: &HappyMetrics) {
        self.add_metrics(BenchmarkTool::Happy, &metrics.filter, &metrics.variant_type, &metrics.summary_metrics());
    }

    pub fn add_truvari(&mut self, metrics: &TruvariMetrics) {
        self.add_metrics(BenchmarkTool::Truvari, ALL_FILTER, SV_VARIANT_TYPE, &metrics.summary_metrics());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Will write the summary out to the given file path
    /// # Arguments
    /// * `filename` - the filename for the output (tsv/csv)
    pub fn write_summary(&self, filename: &Path) -> csv::Result<()> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(filename)?;

        for row in self.rows.iter() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
