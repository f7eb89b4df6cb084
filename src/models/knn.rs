//! K-Nearest Neighbors classifier
//!
//! Euclidean distance, uniform-weight majority vote. Neighbour ties at equal
//! distance are resolved by training order and vote ties by the label of the
//! nearest tied neighbour, so predictions are fully deterministic.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{check_training_data, Model, ModelError, ModelResult};

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KNNClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }
}

impl Default for KNNClassifier {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Model for KNNClassifier {
    /// Stores the training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        check_training_data(x, y)?;
        if self.n_neighbors == 0 {
            return Err(ModelError::InvalidParameter {
                name: "n_neighbors".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.n_neighbors > y.len() {
            return Err(ModelError::InvalidParameter {
                name: "n_neighbors".to_string(),
                reason: format!(
                    "{} neighbours requested but only {} training samples",
                    self.n_neighbors,
                    y.len()
                ),
            });
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict class labels (parallelized over test samples)
    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(ModelError::NotFitted),
        };
        if x.ncols() != x_train.ncols() {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.n_neighbors;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let neighbors = find_k_nearest(x.row(i), x_train, y_train, k);
                vote(&neighbors)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

/// Heap entry ordered by distance, then training index
#[derive(PartialEq)]
struct Neighbor {
    dist: f64,
    index: usize,
    label: f64,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.index.cmp(&other.index))
    }
}

/// Find k nearest neighbors using a max-heap, nearest first
fn find_k_nearest(
    point: ArrayView1<'_, f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<Neighbor> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (index, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(point, row);
        let candidate = Neighbor { dist, index, label: y_train[index] };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(top) = heap.peek() {
            if candidate < *top {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_sorted_vec()
}

fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Majority vote over neighbours sorted nearest first
fn vote(neighbors: &[Neighbor]) -> f64 {
    // (label, votes); insertion order follows proximity
    let mut tally: Vec<(f64, usize)> = Vec::new();
    for n in neighbors {
        match tally.iter_mut().find(|(label, _)| *label == n.label) {
            Some(entry) => entry.1 += 1,
            None => tally.push((n.label, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for (label, votes) in tally {
        if best.map_or(true, |(_, v)| votes > v) {
            best = Some((label, votes));
        }
    }
    best.map(|(label, _)| label).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_one_neighbor_memorizes() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [5.0, 5.0], [6.0, 6.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut knn = KNNClassifier::new(1);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_majority_vote() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0];

        let mut knn = KNNClassifier::new(3);
        knn.fit(&x, &y).unwrap();
        let preds = knn.predict(&array![[0.5], [10.5]]).unwrap();
        assert_eq!(preds, array![0.0, 1.0]);
    }

    #[test]
    fn test_vote_tie_prefers_nearest() {
        let x = array![[0.0], [3.0]];
        let y = array![7.0, 4.0];

        let mut knn = KNNClassifier::new(2);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&array![[2.0]]).unwrap(), array![4.0]);
        assert_eq!(knn.predict(&array![[1.0]]).unwrap(), array![7.0]);
    }

    #[test]
    fn test_too_many_neighbors() {
        let mut knn = KNNClassifier::new(3);
        let err = knn.fit(&array![[0.0], [1.0]], &array![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { .. }));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let mut knn = KNNClassifier::new(1);
        knn.fit(&array![[0.0, 1.0]], &array![0.0]).unwrap();
        assert!(knn.predict(&array![[0.0]]).is_err());
    }
}
