//! Estimate-versus-exact error tracking.
//!
//! Every scored (query, candidate) pair contributes its LSH estimate and its
//! exact Jaccard similarity. The report summarizes how far the estimates
//! drifted as mean squared error and its root.

use serde::{Deserialize, Serialize};

/// Paired estimate and exact scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreAccumulator {
    lsh: Vec<f64>,
    jaccard: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccuracyReport {
    pub pairs: usize,
    pub mse: f64,
    pub rmse: f64,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lsh_similarity: f64, jaccard_similarity: f64) {
        self.lsh.push(lsh_similarity);
        self.jaccard.push(jaccard_similarity);
    }

    pub fn len(&self) -> usize {
        self.lsh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lsh.is_empty()
    }

    /// Append `other`'s pairs after this accumulator's own.
    pub fn merge(&mut self, other: ScoreAccumulator) {
        self.lsh.extend(other.lsh);
        self.jaccard.extend(other.jaccard);
    }

    /// `None` when nothing was scored.
    pub fn report(&self) -> Option<AccuracyReport> {
        if self.lsh.is_empty() {
            return None;
        }
        let sum: f64 = self
            .lsh
            .iter()
            .zip(&self.jaccard)
            .map(|(estimate, exact)| (estimate - exact).powi(2))
            .sum();
        let mse = sum / self.lsh.len() as f64;
        Some(AccuracyReport {
            pairs: self.lsh.len(),
            mse,
            rmse: mse.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_has_no_report() {
        assert!(ScoreAccumulator::new().report().is_none());
    }

    #[test]
    fn perfect_estimates_have_zero_error() {
        let mut acc = ScoreAccumulator::new();
        acc.record(1.0, 1.0);
        acc.record(0.5, 0.5);
        let report = acc.report().expect("report");
        assert_eq!(report.pairs, 2);
        assert_eq!(report.mse, 0.0);
        assert_eq!(report.rmse, 0.0);
    }

    #[test]
    fn mse_and_rmse() {
        let mut acc = ScoreAccumulator::new();
        acc.record(0.9, 0.5); // 0.16
        acc.record(0.2, 0.5); // 0.09
        let report = acc.report().expect("report");
        assert!((report.mse - 0.125).abs() < 1e-12);
        assert!((report.rmse - 0.125f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn merge_keeps_order_and_pairs() {
        let mut a = ScoreAccumulator::new();
        a.record(1.0, 0.0);
        let mut b = ScoreAccumulator::new();
        b.record(0.0, 0.0);
        b.record(0.0, 0.0);
        a.merge(b);
        assert_eq!(a.len(), 3);
        let report = a.report().expect("report");
        assert!((report.mse - 1.0 / 3.0).abs() < 1e-12);
    }
}
