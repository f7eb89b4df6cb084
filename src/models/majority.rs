//! Majority-class baseline

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{check_training_data, Model, ModelError, ModelResult};

/// Predicts the most frequent label seen during training.
///
/// Ties are broken towards the smallest label so results do not depend on
/// training order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorityClassifier {
    majority: Option<f64>,
}

impl MajorityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label learned by the last `fit`
    pub fn majority_label(&self) -> Option<f64> {
        self.majority
    }
}

impl Model for MajorityClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        check_training_data(x, y)?;

        let mut labels: Vec<f64> = y.to_vec();
        labels.sort_by(|a, b| a.total_cmp(b));

        // Runs of equal labels; strict `>` keeps the smallest label on ties
        let mut best = (labels[0], 0usize);
        let mut start = 0;
        for i in 1..=labels.len() {
            if i == labels.len() || labels[i] != labels[start] {
                let count = i - start;
                if count > best.1 {
                    best = (labels[start], count);
                }
                start = i;
            }
        }

        self.majority = Some(best.0);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let label = self.majority.ok_or(ModelError::NotFitted)?;
        Ok(Array1::from_elem(x.nrows(), label))
    }
}
