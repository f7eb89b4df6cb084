//! Scoring functions for held-out predictions
//!
//! Every scorer follows the "greater is better" convention, which is why
//! squared error is exposed negated.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Maps `(y_true, y_pred)` to a scalar quality measure
pub trait Scorer: Sync {
    fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&Array1<f64>, &Array1<f64>) -> f64 + Sync,
{
    fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        self(y_true, y_pred)
    }
}

/// Built-in scoring metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Fraction of exactly matching labels
    #[default]
    Accuracy,
    /// Coefficient of determination
    R2,
    /// Negated mean squared error
    NegMeanSquaredError,
}

impl Scorer for Scoring {
    fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        match self {
            Scoring::Accuracy => accuracy(y_true, y_pred),
            Scoring::R2 => r2_score(y_true, y_pred),
            Scoring::NegMeanSquaredError => -mean_squared_error(y_true, y_pred),
        }
    }
}

impl std::str::FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(Scoring::Accuracy),
            "r2" => Ok(Scoring::R2),
            "neg_mse" | "neg_mean_squared_error" => Ok(Scoring::NegMeanSquaredError),
            other => Err(format!("unknown scoring '{}'", other)),
        }
    }
}

/// Fraction of predictions equal to the true label; 0 for empty input
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let sse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    sse / y_true.len() as f64
}

/// Coefficient of determination.
///
/// With constant `y_true` the score is 1 for a perfect prediction and 0
/// otherwise, so single-sample folds stay finite.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![0.0, 1.0, 1.0, 2.0];
        let y_pred = array![0.0, 1.0, 2.0, 2.0];
        assert_eq!(accuracy(&y_true, &y_pred), 0.75);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert!(r2_score(&y, &array![2.5, 2.5, 2.5, 2.5]).abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(r2_score(&array![3.0], &array![3.0]), 1.0);
        assert_eq!(r2_score(&array![3.0], &array![4.0]), 0.0);
    }

    #[test]
    fn test_neg_mse_sign() {
        let score = Scoring::NegMeanSquaredError.score(&array![0.0, 0.0], &array![1.0, 3.0]);
        assert_eq!(score, -5.0);
    }

    #[test]
    fn test_closure_scorer() {
        let always_half = |_: &Array1<f64>, _: &Array1<f64>| 0.5;
        assert_eq!(always_half.score(&array![1.0], &array![0.0]), 0.5);
    }

    #[test]
    fn test_parse_scoring() {
        assert_eq!("R2".parse::<Scoring>().unwrap(), Scoring::R2);
        assert_eq!("neg_mse".parse::<Scoring>().unwrap(), Scoring::NegMeanSquaredError);
        assert!("auc".parse::<Scoring>().is_err());
    }
}
