
use serde::Serialize;

/// Benchmark counts shared by hap.py and truvari, from which the scores are derived
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    /// Truth entries found in the query (hap.py TRUTH.TP, truvari TP-base)
    pub truth_tp: u64,
    /// Truth entries missing from the query (hap.py TRUTH.FN, truvari FN)
    pub truth_fn: u64,
    /// Query entries matching truth (hap.py QUERY.TP, truvari TP-comp)
    pub query_tp: u64,
    /// Query entries absent from truth (hap.py QUERY.FP, truvari FP)
    pub query_fp: u64,
}

impl SummaryMetrics {
    /// Constructor
    pub fn new(truth_tp: u64, truth_fn: u64, query_tp: u64, query_fp: u64) -> Self {
        Self {
            truth_tp, truth_fn, query_tp, query_fp
        }
    }

    pub fn truth_total(&self) -> u64 {
        self.truth_tp + self.truth_fn
    }

    /// Recall = truth.TP / (truth.TP + truth.FN), None when there is no truth
    pub fn recall(&self) -> Option<f64> {
        let denom = self.truth_total();
        (denom > 0).then(|| self.truth_tp as f64 / denom as f64)
    }

    /// Precision = query.TP / (query.TP + query.FP), None when nothing was called
    pub fn precision(&self) -> Option<f64> {
        let denom = self.query_tp + self.query_fp;
        (denom > 0).then(|| self.query_tp as f64 / denom as f64)
    }

    /// Harmonic mean of recall and precision
    pub fn f1(&self) -> Option<f64> {
        match (self.recall(), self.precision()) {
            (Some(recall), Some(precision)) if recall + precision > 0.0 => {
                Some(2.0 * recall * precision / (recall + precision))
            },
            (Some(_), Some(_)) => Some(0.0),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_scores() {
        let summary = SummaryMetrics::new(10, 2, 7, 5);
        assert_eq!(summary.truth_total(), 12);
        assert_approx_eq!(summary.recall().unwrap(), 10.0 / 12.0);
        assert_approx_eq!(summary.precision().unwrap(), 7.0 / 12.0);
        assert_approx_eq!(summary.f1().unwrap(), 2.0 * (10.0 / 12.0) * (7.0 / 12.0) / (17.0 / 12.0));
    }

    #[test]
    fn test_empty_scores() {
        let summary = SummaryMetrics::default();
        assert!(summary.recall().is_none());
        assert!(summary.precision().is_none());
        assert!(summary.f1().is_none());

        // all misses
        let summary = SummaryMetrics::new(0, 4, 0, 3);
        assert_eq!(summary.f1(), Some(0.0));
    }
}
