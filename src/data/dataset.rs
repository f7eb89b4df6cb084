//! In-memory labelled dataset

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{CrossValError, Result};

/// Ordered sequence of `(features, label)` samples.
///
/// Features are stored row-major as an `(n_samples, n_features)` matrix,
/// labels as a vector of the same length. Class labels are encoded as `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    /// Create a dataset, checking that every sample has a label
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(CrossValError::InvalidInput(format!(
                "features have {} rows but {} labels were given",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    /// Build a dataset from per-sample feature rows
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        let n_features = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_features) {
            return Err(CrossValError::InvalidInput(format!(
                "row {} has {} features, expected {}",
                bad,
                rows[bad].len(),
                n_features
            )));
        }

        let n_rows = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let features = Array2::from_shape_vec((n_rows, n_features), flat)?;
        Self::new(features, Array1::from_vec(labels))
    }

    /// Single-feature dataset, as used for 1-D regression problems
    pub fn from_column(x: Vec<f64>, labels: Vec<f64>) -> Result<Self> {
        let n = x.len();
        let features = Array2::from_shape_vec((n, 1), x)?;
        Self::new(features, Array1::from_vec(labels))
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    /// Features and label of sample `index`
    pub fn sample(&self, index: usize) -> Option<(ArrayView1<'_, f64>, f64)> {
        if index >= self.n_samples() {
            return None;
        }
        Some((self.features.row(index), self.labels[index]))
    }

    /// Copy the samples at `indices`, in that order, into a new dataset.
    ///
    /// Panics if an index is out of bounds; callers pass indices produced
    /// by the fold splitter for this dataset.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}
