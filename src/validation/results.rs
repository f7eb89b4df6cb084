//! Cross-validation results

use serde::{Deserialize, Serialize};

/// Per-fold scores with summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold, in fold order
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean: f64,
    /// Population standard deviation of scores
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        let (mean, std) = mean_std(&scores);
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            scores,
            mean,
            std,
            min,
            max,
            n_folds,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "CV scores over {} folds: mean={:.4} (+/- {:.4}), min={:.4}, max={:.4}",
            self.n_folds,
            self.mean,
            self.std * 2.0,
            self.min,
            self.max
        )
    }
}

/// Mean and population standard deviation; `(NaN, NaN)` for no values
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
